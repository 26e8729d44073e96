use chrono::{DateTime, Duration, Utc};
use crates::domain::{
    entities::subscriptions::InsertSubscriptionEntity,
    repositories::{plans::PlanRepository, subscriptions::SubscriptionRepository},
    value_objects::{
        enums::{
            billing_intervals::BillingInterval, plan_codes::PlanCode,
            subscription_statuses::SubscriptionStatus,
        },
        subscription_lifecycle::add_months,
        subscriptions::{SelectPlanModel, SubscriptionDto},
        tenants::Tenant,
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::usecases::plan_catalog::PlanCatalog;

/// The free plan has no billing period; its subscription is written with a far end date.
const FREE_PLAN_PERIOD_MONTHS: u32 = 1200;

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("tenant already has a subscription")]
    AlreadySubscribed,
    #[error("subscription not found")]
    SubscriptionNotFound,
    #[error("session does not belong to a subscribing tenant")]
    NoTenant,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SubscriptionError::AlreadySubscribed => StatusCode::CONFLICT,
            SubscriptionError::SubscriptionNotFound => StatusCode::NOT_FOUND,
            SubscriptionError::NoTenant => StatusCode::BAD_REQUEST,
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

pub struct SubscriptionUseCase<P, S>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    plan_catalog: Arc<PlanCatalog<P>>,
    subscription_repo: Arc<S>,
    trial_days: i64,
}

impl<P, S> SubscriptionUseCase<P, S>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(plan_catalog: Arc<PlanCatalog<P>>, subscription_repo: Arc<S>, trial_days: i64) -> Self {
        Self {
            plan_catalog,
            subscription_repo,
            trial_days,
        }
    }

    pub async fn current(
        &self,
        tenant: Tenant,
        now: DateTime<Utc>,
    ) -> UseCaseResult<Option<SubscriptionDto>> {
        let subscription = self.subscription_repo.find_by_tenant(tenant).await?;
        Ok(subscription.map(|s| SubscriptionDto::from_entity(&s, now)))
    }

    /// First plan choice for a tenant.
    ///
    /// FREE starts ACTIVE and open-ended. A paid plan starts as a TRIAL when asked for,
    /// otherwise PENDING with an empty period until the first payment is finalized.
    pub async fn select_plan(
        &self,
        tenant: Tenant,
        model: SelectPlanModel,
        now: DateTime<Utc>,
    ) -> UseCaseResult<SubscriptionDto> {
        info!(
            scope = %tenant.scope,
            scope_id = %tenant.scope_id,
            plan = %model.plan,
            trial = model.trial,
            "subscriptions: plan selection requested"
        );

        if let Some(existing) = self.subscription_repo.find_by_tenant(tenant).await? {
            warn!(
                scope_id = %tenant.scope_id,
                subscription_id = %existing.id,
                "subscriptions: tenant already subscribed"
            );
            return Err(SubscriptionError::AlreadySubscribed);
        }

        let monthly = self
            .plan_catalog
            .resolve_price(model.plan, tenant.scope, BillingInterval::Month)
            .await?;

        let insert = match (model.plan, model.trial) {
            (PlanCode::Free, _) => InsertSubscriptionEntity::for_tenant(
                tenant,
                PlanCode::Free,
                SubscriptionStatus::Active,
                now,
                add_months(now, FREE_PLAN_PERIOD_MONTHS).unwrap_or(now),
                0,
                monthly.currency,
            ),
            (plan, true) => InsertSubscriptionEntity::for_tenant(
                tenant,
                plan,
                SubscriptionStatus::Trial,
                now,
                now + Duration::days(self.trial_days),
                0,
                monthly.currency,
            ),
            (plan, false) => InsertSubscriptionEntity::for_tenant(
                tenant,
                plan,
                SubscriptionStatus::Pending,
                now,
                now,
                monthly.amount_minor,
                monthly.currency,
            ),
        };

        let created = self.subscription_repo.create(insert).await.map_err(|err| {
            error!(
                scope_id = %tenant.scope_id,
                db_error = ?err,
                "subscriptions: failed to create subscription"
            );
            SubscriptionError::Internal(err)
        })?;

        info!(
            subscription_id = %created.id,
            status = %created.status,
            "subscriptions: subscription created"
        );
        Ok(SubscriptionDto::from_entity(&created, now))
    }
}
