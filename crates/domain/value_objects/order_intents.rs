use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::enums::plan_codes::PlanCode;

const RENEWAL_PREFIX: &str = "REN-";
const PLAN_CHANGE_PREFIX: &str = "CHG-";

/// What a gateway order id asks the finalizer to do once paid.
///
/// Wire forms:
/// - `REN-{subscription_id}-{months}-{timestamp}`
/// - `CHG-{plan_code}-{subscription_id}-{months}-{timestamp}`
///
/// Subscription ids are hyphenated UUIDs, so the trailing fields are read from the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderIntent {
    Renewal {
        subscription_id: Uuid,
        months: u32,
    },
    PlanChange {
        plan: PlanCode,
        subscription_id: Uuid,
        months: u32,
    },
}

impl OrderIntent {
    pub fn subscription_id(&self) -> Uuid {
        match self {
            OrderIntent::Renewal {
                subscription_id, ..
            }
            | OrderIntent::PlanChange {
                subscription_id, ..
            } => *subscription_id,
        }
    }

    pub fn months(&self) -> u32 {
        match self {
            OrderIntent::Renewal { months, .. } | OrderIntent::PlanChange { months, .. } => *months,
        }
    }

    pub fn encode(&self, issued_at: DateTime<Utc>) -> String {
        let timestamp = issued_at.timestamp_millis();
        match self {
            OrderIntent::Renewal {
                subscription_id,
                months,
            } => format!("{RENEWAL_PREFIX}{subscription_id}-{months}-{timestamp}"),
            OrderIntent::PlanChange {
                plan,
                subscription_id,
                months,
            } => format!("{PLAN_CHANGE_PREFIX}{plan}-{subscription_id}-{months}-{timestamp}"),
        }
    }

    pub fn parse(order_id: &str) -> Option<Self> {
        let order_id = order_id.trim();

        if let Some(rest) = order_id.strip_prefix(RENEWAL_PREFIX) {
            let (subscription_id, months) = split_tail(rest)?;
            return Some(OrderIntent::Renewal {
                subscription_id,
                months,
            });
        }

        if let Some(rest) = order_id.strip_prefix(PLAN_CHANGE_PREFIX) {
            let (plan, rest) = rest.split_once('-')?;
            let plan = PlanCode::from_str(plan)?;
            let (subscription_id, months) = split_tail(rest)?;
            return Some(OrderIntent::PlanChange {
                plan,
                subscription_id,
                months,
            });
        }

        None
    }
}

/// Parses `{uuid}-{months}-{timestamp}`.
fn split_tail(rest: &str) -> Option<(Uuid, u32)> {
    let mut parts = rest.rsplitn(3, '-');
    let timestamp = parts.next()?;
    let months = parts.next()?;
    let subscription_id = parts.next()?;

    timestamp.parse::<i64>().ok()?;
    let months = months.parse::<u32>().ok().filter(|m| *m > 0)?;
    let subscription_id = Uuid::parse_str(subscription_id).ok()?;

    Some((subscription_id, months))
}
