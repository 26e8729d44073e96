use chrono::{DateTime, Duration, Utc};
use crates::domain::{
    entities::subscriptions::SubscriptionEntity,
    repositories::subscriptions::SubscriptionRepository,
    value_objects::{
        enums::subscription_statuses::SubscriptionStatus, subscription_lifecycle::add_months,
        subscriptions::{SubscriptionCleanupResult, SubscriptionDto},
    },
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::usecases::subscriptions::{SubscriptionError, UseCaseResult};

pub const DEFAULT_CLEANUP_OLDER_THAN_DAYS: i64 = 90;
pub const DEFAULT_CLEANUP_LIMIT: i64 = 500;
pub const MAX_CLEANUP_OLDER_THAN_DAYS: i64 = 36_500;

pub struct AdminSubscriptionUseCase<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
}

impl<S> AdminSubscriptionUseCase<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>) -> Self {
        Self { subscription_repo }
    }

    /// Marks the subscription ACTIVE. A lapsed or empty period restarts at `now`
    /// with the same length, or one month when there was none.
    pub async fn approve(
        &self,
        subscription_id: Uuid,
        now: DateTime<Utc>,
    ) -> UseCaseResult<SubscriptionDto> {
        let subscription = self.load(subscription_id).await?;
        let (start_date, end_date) = approved_period(&subscription, now);

        let updated = self
            .subscription_repo
            .update_status_and_period(subscription_id, SubscriptionStatus::Active, start_date, end_date)
            .await
            .map_err(|err| {
                error!(%subscription_id, db_error = ?err, "admin: approve failed");
                SubscriptionError::Internal(err)
            })?;

        info!(
            %subscription_id,
            previous_status = %subscription.status,
            %end_date,
            "admin: subscription approved"
        );
        Ok(SubscriptionDto::from_entity(&updated, now))
    }

    pub async fn reject(
        &self,
        subscription_id: Uuid,
        now: DateTime<Utc>,
    ) -> UseCaseResult<SubscriptionDto> {
        let subscription = self.load(subscription_id).await?;

        let updated = self
            .subscription_repo
            .update_status_and_period(
                subscription_id,
                SubscriptionStatus::Inactive,
                subscription.start_date,
                subscription.end_date,
            )
            .await
            .map_err(|err| {
                error!(%subscription_id, db_error = ?err, "admin: reject failed");
                SubscriptionError::Internal(err)
            })?;

        info!(%subscription_id, previous_status = %subscription.status, "admin: subscription rejected");
        Ok(SubscriptionDto::from_entity(&updated, now))
    }

    pub async fn cleanup(
        &self,
        older_than_days: i64,
        limit: i64,
        now: DateTime<Utc>,
    ) -> UseCaseResult<SubscriptionCleanupResult> {
        let older_than_days = older_than_days.clamp(0, MAX_CLEANUP_OLDER_THAN_DAYS);
        let older_than = now - Duration::days(older_than_days);
        let limit = limit.max(1);

        let result = self
            .subscription_repo
            .delete_dead_subscriptions(older_than, limit)
            .await
            .map_err(|err| {
                error!(%older_than, limit, db_error = ?err, "admin: cleanup failed");
                SubscriptionError::Internal(err)
            })?;

        info!(
            %older_than,
            limit,
            deleted_subscriptions = result.deleted_subscriptions,
            deleted_payments = result.deleted_payments,
            "admin: dead subscriptions cleaned up"
        );
        Ok(result)
    }

    async fn load(&self, subscription_id: Uuid) -> UseCaseResult<SubscriptionEntity> {
        self.subscription_repo
            .find_by_id(subscription_id)
            .await?
            .ok_or_else(|| {
                warn!(%subscription_id, "admin: subscription not found");
                SubscriptionError::SubscriptionNotFound
            })
    }
}

fn approved_period(
    subscription: &SubscriptionEntity,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let length = subscription.end_date - subscription.start_date;
    if subscription.end_date > now && length > Duration::zero() {
        return (subscription.start_date, subscription.end_date);
    }

    let end_date = if length > Duration::zero() {
        now + length
    } else {
        add_months(now, 1).unwrap_or(now + Duration::days(30))
    };
    (now, end_date)
}
