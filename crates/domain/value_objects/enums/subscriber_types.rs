use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Kind of tenant that owns a subscription.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriberType {
    Doctor,
    Hospital,
}

impl SubscriberType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriberType::Doctor => "DOCTOR",
            SubscriberType::Hospital => "HOSPITAL",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "DOCTOR" => Some(SubscriberType::Doctor),
            "HOSPITAL" => Some(SubscriberType::Hospital),
            _ => None,
        }
    }
}

impl Display for SubscriberType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
