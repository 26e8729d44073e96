use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain;
use crate::infra::db::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{plan_configs, plan_limits, plan_prices},
};
use domain::{
    entities::plans::{PlanConfigEntity, PlanLimitsEntity, PlanPriceEntity},
    repositories::plans::PlanRepository,
    value_objects::enums::{
        billing_intervals::BillingInterval, plan_codes::PlanCode, subscriber_types::SubscriberType,
    },
};

pub struct PlanPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PlanPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PlanRepository for PlanPostgres {
    async fn find_by_code(&self, code: PlanCode) -> Result<Option<PlanConfigEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let plan = plan_configs::table
            .filter(plan_configs::code.eq(code.as_str()))
            .select(PlanConfigEntity::as_select())
            .first::<PlanConfigEntity>(&mut conn)
            .optional()?;

        Ok(plan)
    }

    async fn find_limits(&self, plan_id: Uuid) -> Result<Option<PlanLimitsEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let limits = plan_limits::table
            .filter(plan_limits::plan_id.eq(plan_id))
            .select(PlanLimitsEntity::as_select())
            .first::<PlanLimitsEntity>(&mut conn)
            .optional()?;

        Ok(limits)
    }

    async fn find_active_price(
        &self,
        plan_id: Uuid,
        subscriber_type: SubscriberType,
        interval: BillingInterval,
    ) -> Result<Option<PlanPriceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let price = plan_prices::table
            .filter(plan_prices::plan_id.eq(plan_id))
            .filter(plan_prices::subscriber_type.eq(subscriber_type.as_str()))
            .filter(plan_prices::billing_interval.eq(interval.as_str()))
            .filter(plan_prices::is_active.eq(true))
            .order(plan_prices::updated_at.desc())
            .select(PlanPriceEntity::as_select())
            .first::<PlanPriceEntity>(&mut conn)
            .optional()?;

        Ok(price)
    }

    async fn list_active_plans(&self) -> Result<Vec<PlanConfigEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let plans = plan_configs::table
            .filter(plan_configs::is_active.eq(true))
            .order(plan_configs::price_minor.asc())
            .select(PlanConfigEntity::as_select())
            .load::<PlanConfigEntity>(&mut conn)?;

        Ok(plans)
    }

    async fn list_active_prices(&self, plan_id: Uuid) -> Result<Vec<PlanPriceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let prices = plan_prices::table
            .filter(plan_prices::plan_id.eq(plan_id))
            .filter(plan_prices::is_active.eq(true))
            .order((
                plan_prices::subscriber_type.asc(),
                plan_prices::billing_interval.asc(),
                plan_prices::updated_at.desc(),
            ))
            .select(PlanPriceEntity::as_select())
            .load::<PlanPriceEntity>(&mut conn)?;

        Ok(prices)
    }
}
