use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingInterval {
    Month,
    Year,
}

impl BillingInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingInterval::Month => "MONTH",
            BillingInterval::Year => "YEAR",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "MONTH" => Some(BillingInterval::Month),
            "YEAR" => Some(BillingInterval::Year),
            _ => None,
        }
    }

    pub fn months(&self) -> u32 {
        match self {
            BillingInterval::Month => 1,
            BillingInterval::Year => 12,
        }
    }

    /// Picks the price interval used to bill `months` and how many units of it are charged.
    pub fn for_months(months: u32) -> (Self, u32) {
        if months > 0 && months % 12 == 0 {
            (BillingInterval::Year, months / 12)
        } else {
            (BillingInterval::Month, months)
        }
    }
}

impl Display for BillingInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_years_bill_with_yearly_price() {
        assert_eq!(BillingInterval::for_months(24), (BillingInterval::Year, 2));
        assert_eq!(BillingInterval::for_months(12), (BillingInterval::Year, 1));
    }

    #[test]
    fn other_durations_bill_monthly() {
        assert_eq!(BillingInterval::for_months(3), (BillingInterval::Month, 3));
        assert_eq!(BillingInterval::for_months(13), (BillingInterval::Month, 13));
    }
}
