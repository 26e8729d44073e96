use chrono::{DateTime, Months, Utc};
use serde::Serialize;

use super::enums::subscription_statuses::SubscriptionStatus;
use crate::domain::entities::subscriptions::SubscriptionEntity;

const SECONDS_PER_DAY: i64 = 86_400;

/// Status of a subscription as of `now`. Never stored.
pub fn effective_status(
    subscription: Option<&SubscriptionEntity>,
    now: DateTime<Utc>,
) -> SubscriptionStatus {
    match subscription {
        Some(subscription) => effective_status_of(
            subscription.stored_status(),
            subscription.start_date,
            subscription.end_date,
            now,
        ),
        None => SubscriptionStatus::Inactive,
    }
}

pub fn effective_status_of(
    stored: SubscriptionStatus,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> SubscriptionStatus {
    match stored {
        SubscriptionStatus::Trial if now > end_date => SubscriptionStatus::Expired,
        SubscriptionStatus::Trial => SubscriptionStatus::Trial,
        SubscriptionStatus::Active if now < start_date => SubscriptionStatus::Pending,
        SubscriptionStatus::Active if now > end_date => SubscriptionStatus::Expired,
        SubscriptionStatus::Active => SubscriptionStatus::Active,
        SubscriptionStatus::Pending => SubscriptionStatus::Pending,
        SubscriptionStatus::Expired => SubscriptionStatus::Expired,
        SubscriptionStatus::Inactive => SubscriptionStatus::Inactive,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryWindow {
    pub days_remaining: i64,
    pub days_overdue: i64,
    pub in_grace: bool,
}

/// Partial days round up. At most one of the two counters is non-zero.
pub fn expiry_window(end_date: DateTime<Utc>, now: DateTime<Utc>, grace_days: i64) -> ExpiryWindow {
    let delta = (end_date - now).num_seconds();
    let days_remaining = ceil_days(delta.max(0));
    let days_overdue = ceil_days((-delta).max(0));

    ExpiryWindow {
        days_remaining,
        days_overdue,
        in_grace: grace_days > 0 && days_overdue > 0 && days_overdue <= grace_days,
    }
}

fn ceil_days(seconds: i64) -> i64 {
    (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
}

/// Calendar-month arithmetic; `None` on overflow.
pub fn add_months(start: DateTime<Utc>, months: u32) -> Option<DateTime<Utc>> {
    start.checked_add_months(Months::new(months))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn lapsed_active_subscription_is_expired() {
        let status = effective_status_of(
            SubscriptionStatus::Active,
            at(2023, 12, 1),
            at(2024, 1, 1),
            at(2024, 2, 1),
        );
        let window = expiry_window(at(2024, 1, 1), at(2024, 2, 1), 0);

        assert_eq!(status, SubscriptionStatus::Expired);
        assert_eq!(window.days_overdue, 31);
        assert_eq!(window.days_remaining, 0);
        assert!(!window.in_grace);
    }

    #[test]
    fn future_dated_activation_reads_pending() {
        let status = effective_status_of(
            SubscriptionStatus::Active,
            at(2024, 3, 1),
            at(2024, 4, 1),
            at(2024, 2, 1),
        );
        assert_eq!(status, SubscriptionStatus::Pending);
    }

    #[test]
    fn trial_expires_once_end_passes() {
        let end = at(2024, 1, 15);
        let start = at(2024, 1, 1);

        assert_eq!(
            effective_status_of(SubscriptionStatus::Trial, start, end, end),
            SubscriptionStatus::Trial
        );
        assert_eq!(
            effective_status_of(
                SubscriptionStatus::Trial,
                start,
                end,
                end + Duration::seconds(1)
            ),
            SubscriptionStatus::Expired
        );
    }

    #[test]
    fn stored_terminal_states_pass_through() {
        let (start, end, now) = (at(2024, 1, 1), at(2025, 1, 1), at(2024, 6, 1));
        for stored in [
            SubscriptionStatus::Pending,
            SubscriptionStatus::Expired,
            SubscriptionStatus::Inactive,
        ] {
            assert_eq!(effective_status_of(stored, start, end, now), stored);
        }
    }

    #[test]
    fn missing_subscription_is_inactive() {
        assert_eq!(
            effective_status(None, at(2024, 1, 1)),
            SubscriptionStatus::Inactive
        );
    }

    #[test]
    fn partial_days_round_up() {
        let now = at(2024, 1, 1);
        let window = expiry_window(now + Duration::hours(25), now, 0);
        assert_eq!(window.days_remaining, 2);
        assert_eq!(window.days_overdue, 0);
    }

    #[test]
    fn grace_applies_only_within_configured_days() {
        let end = at(2024, 1, 1);

        assert!(expiry_window(end, at(2024, 1, 3), 3).in_grace);
        assert!(!expiry_window(end, at(2024, 1, 5), 3).in_grace);
        assert!(!expiry_window(end, at(2023, 12, 30), 3).in_grace);
    }

    #[test]
    fn months_are_calendar_months() {
        assert_eq!(add_months(at(2024, 2, 1), 3), Some(at(2024, 5, 1)));
        assert_eq!(add_months(at(2024, 1, 31), 1), Some(at(2024, 2, 29)));
    }
}
