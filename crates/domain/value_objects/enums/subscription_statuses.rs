use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    Active,
    Trial,
    Pending,
    Expired,
    #[default]
    Inactive,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "ACTIVE",
            SubscriptionStatus::Trial => "TRIAL",
            SubscriptionStatus::Pending => "PENDING",
            SubscriptionStatus::Expired => "EXPIRED",
            SubscriptionStatus::Inactive => "INACTIVE",
        }
    }

    /// Unknown stored values collapse to `Inactive`.
    pub fn from_str(value: &str) -> Self {
        match value {
            "ACTIVE" => SubscriptionStatus::Active,
            "TRIAL" => SubscriptionStatus::Trial,
            "PENDING" => SubscriptionStatus::Pending,
            "EXPIRED" => SubscriptionStatus::Expired,
            _ => SubscriptionStatus::Inactive,
        }
    }

    /// Statuses under which tenant actions are allowed.
    pub fn is_usable(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trial)
    }
}

impl Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
