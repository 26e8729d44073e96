use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::payments::{InsertSubscriptionPaymentEntity, SubscriptionPaymentEntity},
    value_objects::finalization::FinalizeOutcome,
};

#[async_trait]
#[automock]
pub trait PaymentRepository {
    async fn record_pending_payment(&self, payment: InsertSubscriptionPaymentEntity)
    -> Result<Uuid>;

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<SubscriptionPaymentEntity>>;

    /// PENDING payments carrying a gateway order id, created at or after `since`, oldest first.
    async fn list_reconciliation_candidates(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<SubscriptionPaymentEntity>>;

    /// Atomically settles the payment behind `order_id` and applies its subscription effect.
    async fn finalize_payment(
        &self,
        order_id: &str,
        success: bool,
        now: DateTime<Utc>,
    ) -> Result<FinalizeOutcome>;
}
