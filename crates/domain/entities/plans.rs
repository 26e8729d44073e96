use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::{
        enums::{
            billing_intervals::BillingInterval, plan_codes::PlanCode,
            subscriber_types::SubscriberType,
        },
        quotas::{Limit, PlanQuotaLimits},
    },
    infra::db::postgres::schema::{plan_configs, plan_limits, plan_prices},
};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = plan_configs)]
pub struct PlanConfigEntity {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub price_minor: i64,
    pub currency: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlanConfigEntity {
    pub fn plan_code(&self) -> Option<PlanCode> {
        PlanCode::from_str(&self.code)
    }
}

/// Nullable caps mean "no cap".
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = plan_limits)]
pub struct PlanLimitsEntity {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub max_appointments: Option<i64>,
    pub max_patients: Option<i64>,
    pub max_doctors_per_hospital: Option<i64>,
    pub storage_gb: Option<i64>,
}

impl From<PlanLimitsEntity> for PlanQuotaLimits {
    fn from(value: PlanLimitsEntity) -> Self {
        Self {
            appointments_per_month: Limit::from_nullable(value.max_appointments),
            patients_per_month: Limit::from_nullable(value.max_patients),
            doctors_per_hospital: Limit::from_nullable(value.max_doctors_per_hospital),
            storage_gb: Limit::from_nullable(value.storage_gb),
        }
    }
}

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = plan_prices)]
pub struct PlanPriceEntity {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub subscriber_type: String,
    pub billing_interval: String,
    pub currency: String,
    pub amount_minor: i64,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl PlanPriceEntity {
    pub fn subscriber_type(&self) -> Option<SubscriberType> {
        SubscriberType::from_str(&self.subscriber_type)
    }

    pub fn billing_interval(&self) -> Option<BillingInterval> {
        BillingInterval::from_str(&self.billing_interval)
    }
}
