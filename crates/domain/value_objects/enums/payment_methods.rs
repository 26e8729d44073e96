use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    OrangeMoney,
    Manual,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::OrangeMoney => "ORANGE_MONEY",
            PaymentMethod::Manual => "MANUAL",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "ORANGE_MONEY" => Some(PaymentMethod::OrangeMoney),
            "MANUAL" => Some(PaymentMethod::Manual),
            _ => None,
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
