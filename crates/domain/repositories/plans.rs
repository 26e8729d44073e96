use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::plans::{PlanConfigEntity, PlanLimitsEntity, PlanPriceEntity},
    value_objects::enums::{
        billing_intervals::BillingInterval, plan_codes::PlanCode, subscriber_types::SubscriberType,
    },
};

#[async_trait]
#[automock]
pub trait PlanRepository {
    async fn find_by_code(&self, code: PlanCode) -> Result<Option<PlanConfigEntity>>;

    async fn find_limits(&self, plan_id: Uuid) -> Result<Option<PlanLimitsEntity>>;

    /// Most recently updated active price for the triple, if any.
    async fn find_active_price(
        &self,
        plan_id: Uuid,
        subscriber_type: SubscriberType,
        interval: BillingInterval,
    ) -> Result<Option<PlanPriceEntity>>;

    async fn list_active_plans(&self) -> Result<Vec<PlanConfigEntity>>;

    async fn list_active_prices(&self, plan_id: Uuid) -> Result<Vec<PlanPriceEntity>>;
}
