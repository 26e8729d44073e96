use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{
    enums::{
        payment_statuses::PaymentStatus, plan_codes::PlanCode,
        subscription_statuses::SubscriptionStatus,
    },
    order_intents::OrderIntent,
    subscription_lifecycle::add_months,
};
use crate::domain::entities::{
    payments::SubscriptionPaymentEntity, subscriptions::SubscriptionEntity,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalizeReason {
    PaymentNotFound,
    SubscriptionMissingButPaid,
    IntentUnrecognized,
}

impl FinalizeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalizeReason::PaymentNotFound => "payment_not_found",
            FinalizeReason::SubscriptionMissingButPaid => "subscription_missing_but_paid",
            FinalizeReason::IntentUnrecognized => "intent_unrecognized",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FinalizeOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub already: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FinalizeReason>,
}

impl FinalizeOutcome {
    pub fn applied() -> Self {
        Self {
            ok: true,
            already: false,
            reason: None,
        }
    }

    pub fn already_final() -> Self {
        Self {
            ok: true,
            already: true,
            reason: None,
        }
    }

    pub fn payment_not_found() -> Self {
        Self {
            ok: false,
            already: false,
            reason: Some(FinalizeReason::PaymentNotFound),
        }
    }

    /// Money was captured but the subscription side effect could not be applied.
    pub fn paid_with(reason: FinalizeReason) -> Self {
        Self {
            ok: true,
            already: false,
            reason: Some(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionUpdate {
    pub subscription_id: Uuid,
    pub plan: Option<PlanCode>,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub amount: Option<(i64, String)>,
}

/// Writes the finalizer must perform. Empty when the payment was already terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizePlan {
    pub payment_status: Option<PaymentStatus>,
    pub subscription_update: Option<SubscriptionUpdate>,
    pub outcome: FinalizeOutcome,
}

impl FinalizePlan {
    fn no_writes(outcome: FinalizeOutcome) -> Self {
        Self {
            payment_status: None,
            subscription_update: None,
            outcome,
        }
    }

    fn payment_only(status: PaymentStatus, outcome: FinalizeOutcome) -> Self {
        Self {
            payment_status: Some(status),
            subscription_update: None,
            outcome,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.payment_status.is_none() && self.subscription_update.is_none()
    }
}

/// Decides the finalization of one payment.
///
/// `subscription` must be the row named by the payment's order intent, loaded inside the same
/// transaction that locked the payment.
pub fn plan_finalization(
    payment: &SubscriptionPaymentEntity,
    subscription: Option<&SubscriptionEntity>,
    success: bool,
    now: DateTime<Utc>,
) -> FinalizePlan {
    if payment.payment_status().is_terminal() {
        return FinalizePlan::no_writes(FinalizeOutcome::already_final());
    }

    if !success {
        return FinalizePlan::payment_only(PaymentStatus::Failed, FinalizeOutcome::applied());
    }

    let Some(intent) = payment.transaction_id.as_deref().and_then(OrderIntent::parse) else {
        return FinalizePlan::payment_only(
            PaymentStatus::Completed,
            FinalizeOutcome::paid_with(FinalizeReason::IntentUnrecognized),
        );
    };

    let Some(subscription) = subscription.filter(|s| s.id == intent.subscription_id()) else {
        return FinalizePlan::payment_only(
            PaymentStatus::Completed,
            FinalizeOutcome::paid_with(FinalizeReason::SubscriptionMissingButPaid),
        );
    };

    let update = match intent {
        OrderIntent::Renewal { months, .. } => {
            let start_date = now.max(subscription.end_date);
            add_months(start_date, months).map(|end_date| SubscriptionUpdate {
                subscription_id: subscription.id,
                plan: None,
                status: SubscriptionStatus::Active,
                start_date,
                end_date,
                amount: None,
            })
        }
        OrderIntent::PlanChange { plan, months, .. } => {
            add_months(now, months).map(|end_date| SubscriptionUpdate {
                subscription_id: subscription.id,
                plan: Some(plan),
                status: SubscriptionStatus::Active,
                start_date: now,
                end_date,
                amount: Some((payment.amount_minor, payment.currency.clone())),
            })
        }
    };

    match update {
        Some(update) => FinalizePlan {
            payment_status: Some(PaymentStatus::Completed),
            subscription_update: Some(update),
            outcome: FinalizeOutcome::applied(),
        },
        None => FinalizePlan::payment_only(
            PaymentStatus::Completed,
            FinalizeOutcome::paid_with(FinalizeReason::IntentUnrecognized),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn subscription(id: Uuid, end_date: DateTime<Utc>) -> SubscriptionEntity {
        SubscriptionEntity {
            id,
            subscriber_type: "DOCTOR".to_string(),
            doctor_id: Some(Uuid::new_v4()),
            hospital_id: None,
            plan_code: "STANDARD".to_string(),
            status: "ACTIVE".to_string(),
            start_date: at(2023, 12, 1),
            end_date,
            amount_minor: 5_000,
            currency: "XOF".to_string(),
            auto_renew: false,
            created_at: at(2023, 12, 1),
            updated_at: at(2023, 12, 1),
        }
    }

    fn payment(order_id: &str, status: PaymentStatus) -> SubscriptionPaymentEntity {
        SubscriptionPaymentEntity {
            id: Uuid::new_v4(),
            subscription_id: Uuid::new_v4(),
            amount_minor: 15_000,
            currency: "XOF".to_string(),
            payment_method: "ORANGE_MONEY".to_string(),
            transaction_id: Some(order_id.to_string()),
            pay_token: Some("pt".to_string()),
            notif_token: Some("nt".to_string()),
            status: status.to_string(),
            payment_date: at(2024, 1, 31),
            created_at: at(2024, 1, 31),
            updated_at: at(2024, 1, 31),
        }
    }

    #[test]
    fn lapsed_renewal_restarts_from_now() {
        let sub_id = Uuid::new_v4();
        let sub = subscription(sub_id, at(2024, 1, 1));
        let pay = payment(&format!("REN-{sub_id}-3-1700000000"), PaymentStatus::Pending);

        let plan = plan_finalization(&pay, Some(&sub), true, at(2024, 2, 1));

        assert_eq!(plan.payment_status, Some(PaymentStatus::Completed));
        assert_eq!(plan.outcome, FinalizeOutcome::applied());
        let update = plan.subscription_update.unwrap();
        assert_eq!(update.start_date, at(2024, 2, 1));
        assert_eq!(update.end_date, at(2024, 5, 1));
        assert_eq!(update.status, SubscriptionStatus::Active);
        assert_eq!(update.plan, None);
        assert_eq!(update.amount, None);
    }

    #[test]
    fn early_renewal_extends_from_current_end() {
        let sub_id = Uuid::new_v4();
        let sub = subscription(sub_id, at(2024, 3, 10));
        let pay = payment(&format!("REN-{sub_id}-1-1700000000"), PaymentStatus::Pending);
        let now = at(2024, 2, 1);

        let update = plan_finalization(&pay, Some(&sub), true, now)
            .subscription_update
            .unwrap();

        assert_eq!(update.start_date, at(2024, 3, 10));
        assert_eq!(update.end_date, at(2024, 4, 10));
        assert!(update.end_date >= add_months(now.max(sub.end_date), 1).unwrap());
    }

    #[test]
    fn plan_change_restarts_period_and_takes_paid_amount() {
        let sub_id = Uuid::new_v4();
        let sub = subscription(sub_id, at(2024, 3, 10));
        let pay = payment(
            &format!("CHG-PREMIUM-{sub_id}-12-1700000000"),
            PaymentStatus::Pending,
        );

        let update = plan_finalization(&pay, Some(&sub), true, at(2024, 2, 1))
            .subscription_update
            .unwrap();

        assert_eq!(update.plan, Some(PlanCode::Premium));
        assert_eq!(update.start_date, at(2024, 2, 1));
        assert_eq!(update.end_date, at(2025, 2, 1));
        assert_eq!(update.amount, Some((15_000, "XOF".to_string())));
    }

    #[test]
    fn terminal_payment_produces_no_writes() {
        let sub_id = Uuid::new_v4();
        let sub = subscription(sub_id, at(2024, 1, 1));

        for status in [PaymentStatus::Completed, PaymentStatus::Failed] {
            let pay = payment(&format!("REN-{sub_id}-3-1700000000"), status);
            let plan = plan_finalization(&pay, Some(&sub), true, at(2024, 2, 1));

            assert!(plan.is_noop());
            assert_eq!(plan.outcome, FinalizeOutcome::already_final());
        }
    }

    #[test]
    fn failure_verdict_only_fails_payment() {
        let sub_id = Uuid::new_v4();
        let sub = subscription(sub_id, at(2024, 1, 1));
        let pay = payment(&format!("REN-{sub_id}-3-1700000000"), PaymentStatus::Pending);

        let plan = plan_finalization(&pay, Some(&sub), false, at(2024, 2, 1));

        assert_eq!(plan.payment_status, Some(PaymentStatus::Failed));
        assert_eq!(plan.subscription_update, None);
        assert!(plan.outcome.ok);
    }

    #[test]
    fn missing_subscription_still_completes_payment() {
        let pay = payment(
            &format!("REN-{}-3-1700000000", Uuid::new_v4()),
            PaymentStatus::Pending,
        );

        let plan = plan_finalization(&pay, None, true, at(2024, 2, 1));

        assert_eq!(plan.payment_status, Some(PaymentStatus::Completed));
        assert_eq!(
            plan.outcome.reason,
            Some(FinalizeReason::SubscriptionMissingButPaid)
        );
    }

    #[test]
    fn undecodable_order_id_is_flagged() {
        let pay = payment("legacy-order-42", PaymentStatus::Pending);

        let plan = plan_finalization(&pay, None, true, at(2024, 2, 1));

        assert_eq!(plan.payment_status, Some(PaymentStatus::Completed));
        assert_eq!(plan.outcome.reason, Some(FinalizeReason::IntentUnrecognized));
    }

    #[test]
    fn outcome_serializes_compactly() {
        assert_eq!(
            serde_json::to_value(FinalizeOutcome::already_final()).unwrap(),
            json!({"ok": true, "already": true})
        );
        assert_eq!(
            serde_json::to_value(FinalizeOutcome::payment_not_found()).unwrap(),
            json!({"ok": false, "reason": "payment_not_found"})
        );
    }
}
