use serde::Serialize;
use uuid::Uuid;

use super::{
    enums::{
        billing_intervals::BillingInterval, plan_codes::PlanCode,
        subscriber_types::SubscriberType,
    },
    quotas::PlanQuotaLimits,
};

/// Where a resolved price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    PlanPrice,
    PlanBase,
    Unconfigured,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPrice {
    pub plan: PlanCode,
    pub subscriber_type: SubscriberType,
    pub interval: BillingInterval,
    pub amount_minor: i64,
    pub currency: String,
    pub source: PriceSource,
}

impl ResolvedPrice {
    pub fn is_chargeable(&self) -> bool {
        self.source != PriceSource::Unconfigured && self.amount_minor > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPriceDto {
    pub subscriber_type: String,
    pub interval: String,
    pub amount_minor: i64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanCatalogItemDto {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub base_price_minor: i64,
    pub currency: String,
    pub limits: PlanQuotaLimits,
    pub prices: Vec<PlanPriceDto>,
}
