use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::subscriptions::{InsertSubscriptionEntity, SubscriptionEntity},
    value_objects::{
        enums::subscription_statuses::SubscriptionStatus, subscriptions::SubscriptionCleanupResult,
        tenants::Tenant,
    },
};

#[async_trait]
#[automock]
pub trait SubscriptionRepository {
    async fn find_by_id(&self, subscription_id: Uuid) -> Result<Option<SubscriptionEntity>>;

    async fn find_by_tenant(&self, tenant: Tenant) -> Result<Option<SubscriptionEntity>>;

    async fn create(&self, subscription: InsertSubscriptionEntity) -> Result<SubscriptionEntity>;

    async fn update_status_and_period(
        &self,
        subscription_id: Uuid,
        status: SubscriptionStatus,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<SubscriptionEntity>;

    /// Deletes INACTIVE/EXPIRED subscriptions last touched before `older_than`, with their
    /// payments, in one transaction.
    async fn delete_dead_subscriptions(
        &self,
        older_than: DateTime<Utc>,
        limit: i64,
    ) -> Result<SubscriptionCleanupResult>;
}
