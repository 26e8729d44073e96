use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::enums::payment_statuses::PaymentStatus,
    infra::db::postgres::schema::subscription_payments,
};

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = subscription_payments)]
pub struct SubscriptionPaymentEntity {
    pub id: Uuid,
    pub subscription_id: Uuid,
    pub amount_minor: i64,
    pub currency: String,
    pub payment_method: String,
    pub transaction_id: Option<String>,
    pub pay_token: Option<String>,
    pub notif_token: Option<String>,
    pub status: String,
    pub payment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionPaymentEntity {
    /// Unknown stored values are treated as still pending.
    pub fn payment_status(&self) -> PaymentStatus {
        PaymentStatus::from_str(&self.status).unwrap_or(PaymentStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = subscription_payments)]
pub struct InsertSubscriptionPaymentEntity {
    pub subscription_id: Uuid,
    pub amount_minor: i64,
    pub currency: String,
    pub payment_method: String,
    pub transaction_id: Option<String>,
    pub pay_token: Option<String>,
    pub notif_token: Option<String>,
    pub status: String,
    pub payment_date: DateTime<Utc>,
}
