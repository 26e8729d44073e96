use anyhow::Result;
use crates::domain::{
    repositories::plans::PlanRepository,
    value_objects::{
        enums::{
            billing_intervals::BillingInterval, plan_codes::PlanCode,
            subscriber_types::SubscriberType,
        },
        plans::{PlanCatalogItemDto, PlanPriceDto, PriceSource, ResolvedPrice},
        quotas::PlanQuotaLimits,
    },
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Read side of the plan tables: catalog listing, price resolution and quota limits.
pub struct PlanCatalog<P>
where
    P: PlanRepository + Send + Sync + 'static,
{
    plan_repo: Arc<P>,
    default_currency: String,
}

impl<P> PlanCatalog<P>
where
    P: PlanRepository + Send + Sync + 'static,
{
    pub fn new(plan_repo: Arc<P>, default_currency: String) -> Self {
        Self {
            plan_repo,
            default_currency,
        }
    }

    pub fn default_currency(&self) -> &str {
        &self.default_currency
    }

    pub async fn list_catalog(&self) -> Result<Vec<PlanCatalogItemDto>> {
        let plans = self.plan_repo.list_active_plans().await?;
        let mut items = Vec::with_capacity(plans.len());

        for plan in plans {
            let limits = self
                .plan_repo
                .find_limits(plan.id)
                .await?
                .map(PlanQuotaLimits::from)
                .unwrap_or_default();

            let prices = self
                .plan_repo
                .list_active_prices(plan.id)
                .await?
                .into_iter()
                .map(|price| PlanPriceDto {
                    subscriber_type: price.subscriber_type,
                    interval: price.billing_interval,
                    amount_minor: price.amount_minor,
                    currency: price.currency,
                })
                .collect();

            items.push(PlanCatalogItemDto {
                id: plan.id,
                code: plan.code,
                name: plan.name,
                base_price_minor: plan.price_minor,
                currency: plan.currency,
                limits,
                prices,
            });
        }

        info!(plan_count = items.len(), "plan_catalog: catalog loaded");
        Ok(items)
    }

    /// Active price row, then the plan's base price, then zero. Missing configuration is
    /// reported through `source`, never as an error.
    pub async fn resolve_price(
        &self,
        plan: PlanCode,
        subscriber_type: SubscriberType,
        interval: BillingInterval,
    ) -> Result<ResolvedPrice> {
        let unconfigured = ResolvedPrice {
            plan,
            subscriber_type,
            interval,
            amount_minor: 0,
            currency: self.default_currency.clone(),
            source: PriceSource::Unconfigured,
        };

        let Some(plan_config) = self.plan_repo.find_by_code(plan).await? else {
            warn!(%plan, "plan_catalog: plan is not configured");
            return Ok(unconfigured);
        };

        if let Some(price) = self
            .plan_repo
            .find_active_price(plan_config.id, subscriber_type, interval)
            .await?
        {
            debug!(%plan, %subscriber_type, %interval, "plan_catalog: using plan price row");
            return Ok(ResolvedPrice {
                amount_minor: price.amount_minor,
                currency: price.currency,
                source: PriceSource::PlanPrice,
                ..unconfigured
            });
        }

        debug!(%plan, %subscriber_type, %interval, "plan_catalog: falling back to base price");
        Ok(ResolvedPrice {
            amount_minor: plan_config.price_minor,
            currency: plan_config.currency,
            source: PriceSource::PlanBase,
            ..unconfigured
        })
    }

    /// A plan without a limits row is uncapped.
    pub async fn limits_for(&self, plan: PlanCode) -> Result<PlanQuotaLimits> {
        let Some(plan_config) = self.plan_repo.find_by_code(plan).await? else {
            warn!(%plan, "plan_catalog: plan is not configured; treating as uncapped");
            return Ok(PlanQuotaLimits::default());
        };

        Ok(self
            .plan_repo
            .find_limits(plan_config.id)
            .await?
            .map(PlanQuotaLimits::from)
            .unwrap_or_default())
    }
}
