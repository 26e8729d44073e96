use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    enums::{
        plan_codes::PlanCode, quota_keys::QuotaKey, subscriber_types::SubscriberType,
        subscription_statuses::SubscriptionStatus, tenant_roles::TenantRole,
    },
    quotas::{Limit, QuotaReport, RemainingSlots},
    subscription_lifecycle::effective_status_of,
};
use crate::domain::entities::subscriptions::SubscriptionEntity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryUsageDto {
    pub key: QuotaKey,
    pub current: i64,
    pub limit: Limit,
    pub label: &'static str,
    pub remaining_slots: RemainingSlots,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummaryDto {
    pub primary: PrimaryUsageDto,
    pub full: QuotaReport,
}

/// Read model for the subscription banner. `show = false` carries no other data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LimitSummaryDto {
    pub show: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<SubscriberType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<TenantRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SubscriptionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_overdue: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_grace: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_add_more_doctors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageSummaryDto>,
}

impl LimitSummaryDto {
    pub fn hidden() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDto {
    pub id: Uuid,
    pub subscriber_type: String,
    pub plan: String,
    pub stored_status: String,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub amount_minor: i64,
    pub currency: String,
    pub auto_renew: bool,
}

impl SubscriptionDto {
    pub fn from_entity(entity: &SubscriptionEntity, now: DateTime<Utc>) -> Self {
        let stored = entity.stored_status();
        Self {
            id: entity.id,
            subscriber_type: entity.subscriber_type.clone(),
            plan: entity.plan_code.clone(),
            stored_status: entity.status.clone(),
            status: effective_status_of(stored, entity.start_date, entity.end_date, now),
            start_date: entity.start_date,
            end_date: entity.end_date,
            amount_minor: entity.amount_minor,
            currency: entity.currency.clone(),
            auto_renew: entity.auto_renew,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectPlanModel {
    pub plan: PlanCode,
    #[serde(default)]
    pub trial: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenewalCheckoutModel {
    pub months: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanChangeCheckoutModel {
    pub plan: PlanCode,
    pub months: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionDto {
    pub order_id: String,
    pub payment_url: String,
    pub amount_minor: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCleanupResult {
    pub deleted_subscriptions: usize,
    pub deleted_payments: usize,
}
