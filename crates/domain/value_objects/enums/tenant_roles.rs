use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Role carried by the caller's token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenantRole {
    Doctor,
    HospitalAdmin,
    Patient,
    Admin,
}

impl TenantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantRole::Doctor => "DOCTOR",
            TenantRole::HospitalAdmin => "HOSPITAL_ADMIN",
            TenantRole::Patient => "PATIENT",
            TenantRole::Admin => "ADMIN",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DOCTOR" => Some(TenantRole::Doctor),
            "HOSPITAL_ADMIN" => Some(TenantRole::HospitalAdmin),
            "PATIENT" => Some(TenantRole::Patient),
            "ADMIN" => Some(TenantRole::Admin),
            _ => None,
        }
    }
}

impl Display for TenantRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
