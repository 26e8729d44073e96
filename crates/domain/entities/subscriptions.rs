use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::{
        enums::{
            plan_codes::PlanCode, subscriber_types::SubscriberType,
            subscription_statuses::SubscriptionStatus,
        },
        finalization::SubscriptionUpdate,
        tenants::Tenant,
    },
    infra::db::postgres::schema::subscriptions,
};

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = subscriptions)]
pub struct SubscriptionEntity {
    pub id: Uuid,
    pub subscriber_type: String,
    pub doctor_id: Option<Uuid>,
    pub hospital_id: Option<Uuid>,
    pub plan_code: String,
    pub status: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub amount_minor: i64,
    pub currency: String,
    pub auto_renew: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionEntity {
    pub fn stored_status(&self) -> SubscriptionStatus {
        SubscriptionStatus::from_str(&self.status)
    }

    pub fn plan(&self) -> Option<PlanCode> {
        PlanCode::from_str(&self.plan_code)
    }

    pub fn tenant(&self) -> Option<Tenant> {
        match SubscriberType::from_str(&self.subscriber_type)? {
            SubscriberType::Doctor => self.doctor_id.map(Tenant::doctor),
            SubscriberType::Hospital => self.hospital_id.map(Tenant::hospital),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subscriptions)]
pub struct InsertSubscriptionEntity {
    pub subscriber_type: String,
    pub doctor_id: Option<Uuid>,
    pub hospital_id: Option<Uuid>,
    pub plan_code: String,
    pub status: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub amount_minor: i64,
    pub currency: String,
    pub auto_renew: bool,
}

impl InsertSubscriptionEntity {
    /// Owner columns are derived from the tenant so exactly one of them is set.
    pub fn for_tenant(
        tenant: Tenant,
        plan: PlanCode,
        status: SubscriptionStatus,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        amount_minor: i64,
        currency: String,
    ) -> Self {
        let (doctor_id, hospital_id) = match tenant.scope {
            SubscriberType::Doctor => (Some(tenant.scope_id), None),
            SubscriberType::Hospital => (None, Some(tenant.scope_id)),
        };

        Self {
            subscriber_type: tenant.scope.to_string(),
            doctor_id,
            hospital_id,
            plan_code: plan.to_string(),
            status: status.to_string(),
            start_date,
            end_date,
            amount_minor,
            currency,
            auto_renew: false,
        }
    }
}

/// Period rewrite applied by the finalizer. `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = subscriptions)]
pub struct SubscriptionPeriodChangeset {
    pub status: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub plan_code: Option<String>,
    pub amount_minor: Option<i64>,
    pub currency: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionPeriodChangeset {
    pub fn from_update(update: &SubscriptionUpdate, now: DateTime<Utc>) -> Self {
        let (amount_minor, currency) = match &update.amount {
            Some((amount, currency)) => (Some(*amount), Some(currency.clone())),
            None => (None, None),
        };

        Self {
            status: update.status.to_string(),
            start_date: update.start_date,
            end_date: update.end_date,
            plan_code: update.plan.map(|plan| plan.to_string()),
            amount_minor,
            currency,
            updated_at: now,
        }
    }
}
