use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanCode {
    Free,
    Standard,
    Premium,
}

impl PlanCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanCode::Free => "FREE",
            PlanCode::Standard => "STANDARD",
            PlanCode::Premium => "PREMIUM",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "FREE" => Some(PlanCode::Free),
            "STANDARD" => Some(PlanCode::Standard),
            "PREMIUM" => Some(PlanCode::Premium),
            _ => None,
        }
    }
}

impl Display for PlanCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
