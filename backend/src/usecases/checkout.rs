use chrono::{DateTime, Utc};
use crates::domain::{
    entities::{payments::InsertSubscriptionPaymentEntity, subscriptions::SubscriptionEntity},
    repositories::{
        payment_gateway::PaymentGateway, payments::PaymentRepository, plans::PlanRepository,
        subscriptions::SubscriptionRepository,
    },
    value_objects::{
        enums::{
            billing_intervals::BillingInterval, payment_methods::PaymentMethod,
            payment_statuses::PaymentStatus, plan_codes::PlanCode,
        },
        gateway::InitiatePaymentRequest,
        order_intents::OrderIntent,
        plans::PriceSource,
        subscriptions::CheckoutSessionDto,
        tenants::Tenant,
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::usecases::plan_catalog::PlanCatalog;

pub const MAX_CHECKOUT_MONTHS: u32 = 36;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("months must be between 1 and 36, got {0}")]
    InvalidMonths(u32),
    #[error("tenant has no subscription to pay for")]
    SubscriptionNotFound,
    #[error("plan {0} has no chargeable price configured")]
    NotChargeable(PlanCode),
    #[error("session does not belong to a subscribing tenant")]
    NoTenant,
    #[error("payment gateway is unavailable")]
    Gateway(anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CheckoutError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            CheckoutError::InvalidMonths(_) | CheckoutError::NoTenant => StatusCode::BAD_REQUEST,
            CheckoutError::SubscriptionNotFound => StatusCode::NOT_FOUND,
            CheckoutError::NotChargeable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CheckoutError::Gateway(_) => StatusCode::BAD_GATEWAY,
            CheckoutError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, CheckoutError>;

/// Opens gateway payments whose order id carries the renewal or plan-change intent.
pub struct CheckoutUseCase<P, S, Pay, G>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    plan_catalog: Arc<PlanCatalog<P>>,
    subscription_repo: Arc<S>,
    payment_repo: Arc<Pay>,
    gateway: Arc<G>,
}

impl<P, S, Pay, G> CheckoutUseCase<P, S, Pay, G>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    pub fn new(
        plan_catalog: Arc<PlanCatalog<P>>,
        subscription_repo: Arc<S>,
        payment_repo: Arc<Pay>,
        gateway: Arc<G>,
    ) -> Self {
        Self {
            plan_catalog,
            subscription_repo,
            payment_repo,
            gateway,
        }
    }

    pub async fn start_renewal(
        &self,
        tenant: Tenant,
        months: u32,
        now: DateTime<Utc>,
    ) -> UseCaseResult<CheckoutSessionDto> {
        validate_months(months)?;
        let subscription = self.load_subscription(tenant).await?;
        let plan = subscription.plan().ok_or_else(|| {
            anyhow::anyhow!("subscription {} has unknown plan {}", subscription.id, subscription.plan_code)
        })?;

        let intent = OrderIntent::Renewal {
            subscription_id: subscription.id,
            months,
        };
        self.open_payment(tenant, &subscription, plan, intent, now).await
    }

    pub async fn start_plan_change(
        &self,
        tenant: Tenant,
        plan: PlanCode,
        months: u32,
        now: DateTime<Utc>,
    ) -> UseCaseResult<CheckoutSessionDto> {
        validate_months(months)?;
        let subscription = self.load_subscription(tenant).await?;

        let intent = OrderIntent::PlanChange {
            plan,
            subscription_id: subscription.id,
            months,
        };
        self.open_payment(tenant, &subscription, plan, intent, now).await
    }

    async fn load_subscription(&self, tenant: Tenant) -> UseCaseResult<SubscriptionEntity> {
        self.subscription_repo
            .find_by_tenant(tenant)
            .await
            .map_err(|err| {
                error!(
                    scope_id = %tenant.scope_id,
                    db_error = ?err,
                    "checkout: failed to load subscription"
                );
                CheckoutError::Internal(err)
            })?
            .ok_or(CheckoutError::SubscriptionNotFound)
    }

    async fn open_payment(
        &self,
        tenant: Tenant,
        subscription: &SubscriptionEntity,
        plan: PlanCode,
        intent: OrderIntent,
        now: DateTime<Utc>,
    ) -> UseCaseResult<CheckoutSessionDto> {
        let months = intent.months();
        let (mut interval, mut units) = BillingInterval::for_months(months);
        let mut price = self
            .plan_catalog
            .resolve_price(plan, tenant.scope, interval)
            .await?;

        // Only a yearly price row is a yearly amount; the base price is monthly.
        if interval == BillingInterval::Year && price.source != PriceSource::PlanPrice {
            debug!(
                %plan,
                scope = %tenant.scope,
                months,
                "checkout: no yearly price row; billing monthly"
            );
            interval = BillingInterval::Month;
            units = months;
            price = self
                .plan_catalog
                .resolve_price(plan, tenant.scope, interval)
                .await?;
        }

        if !price.is_chargeable() {
            warn!(
                %plan,
                scope = %tenant.scope,
                %interval,
                source = ?price.source,
                "checkout: refusing to charge an unconfigured or zero price"
            );
            return Err(CheckoutError::NotChargeable(plan));
        }

        let amount_minor = price
            .amount_minor
            .checked_mul(i64::from(units))
            .ok_or_else(|| anyhow::anyhow!("checkout amount overflows for {units} x {interval}"))?;
        let order_id = intent.encode(now);

        info!(
            %order_id,
            subscription_id = %subscription.id,
            amount_minor,
            currency = %price.currency,
            "checkout: initiating gateway payment"
        );

        let initiated = self
            .gateway
            .initiate_payment(InitiatePaymentRequest {
                order_id: order_id.clone(),
                amount_minor,
                currency: price.currency.clone(),
                reference: format!("{plan} {}", subscription.id),
            })
            .await
            .map_err(|err| {
                error!(%order_id, error = ?err, "checkout: gateway initiation failed");
                CheckoutError::Gateway(err)
            })?;

        self.payment_repo
            .record_pending_payment(InsertSubscriptionPaymentEntity {
                subscription_id: subscription.id,
                amount_minor,
                currency: price.currency.clone(),
                payment_method: PaymentMethod::OrangeMoney.to_string(),
                transaction_id: Some(order_id.clone()),
                pay_token: Some(initiated.pay_token),
                notif_token: initiated.notif_token,
                status: PaymentStatus::Pending.to_string(),
                payment_date: now,
            })
            .await
            .map_err(|err| {
                // The gateway already holds an order the database does not know about.
                error!(
                    %order_id,
                    db_error = ?err,
                    "checkout: failed to record pending payment after gateway initiation"
                );
                CheckoutError::Internal(err)
            })?;

        Ok(CheckoutSessionDto {
            order_id,
            payment_url: initiated.payment_url,
            amount_minor,
            currency: price.currency,
        })
    }
}

fn validate_months(months: u32) -> UseCaseResult<()> {
    if months == 0 || months > MAX_CHECKOUT_MONTHS {
        return Err(CheckoutError::InvalidMonths(months));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::{
        plan_catalog::tests::{sample_plan, sample_price},
        quota::tests::sample_subscription,
    };
    use chrono::{Duration, TimeZone};
    use crates::domain::{
        repositories::{
            payment_gateway::MockPaymentGateway, payments::MockPaymentRepository,
            plans::MockPlanRepository, subscriptions::MockSubscriptionRepository,
        },
        value_objects::{
            enums::{subscriber_types::SubscriberType, subscription_statuses::SubscriptionStatus},
            gateway::InitiatedPayment,
        },
    };
    use mockall::predicate::eq;
    use uuid::Uuid;

    fn subscription_repo_for(subscription: Option<SubscriptionEntity>) -> MockSubscriptionRepository {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_find_by_tenant().returning(move |_| {
            let subscription = subscription.clone();
            Box::pin(async move { Ok(subscription) })
        });
        subscription_repo
    }

    fn catalog_with_price(
        plan: PlanCode,
        subscriber_type: SubscriberType,
        interval: BillingInterval,
        amount_minor: i64,
    ) -> Arc<PlanCatalog<MockPlanRepository>> {
        let plan_config = sample_plan(plan, 0);
        let price = sample_price(plan_config.id, subscriber_type, interval, amount_minor);

        let mut plan_repo = MockPlanRepository::new();
        plan_repo
            .expect_find_by_code()
            .with(eq(plan))
            .returning(move |_| {
                let plan_config = plan_config.clone();
                Box::pin(async move { Ok(Some(plan_config)) })
            });
        plan_repo
            .expect_find_active_price()
            .with(
                mockall::predicate::always(),
                eq(subscriber_type),
                eq(interval),
            )
            .returning(move |_, _, _| {
                let price = price.clone();
                Box::pin(async move { Ok(Some(price)) })
            });
        Arc::new(PlanCatalog::new(Arc::new(plan_repo), "XOF".to_string()))
    }

    fn catalog_with_base_price_only(
        plan: PlanCode,
        base_price_minor: i64,
    ) -> Arc<PlanCatalog<MockPlanRepository>> {
        let plan_config = sample_plan(plan, base_price_minor);

        let mut plan_repo = MockPlanRepository::new();
        plan_repo.expect_find_by_code().returning(move |_| {
            let plan_config = plan_config.clone();
            Box::pin(async move { Ok(Some(plan_config)) })
        });
        plan_repo
            .expect_find_active_price()
            .returning(|_, _, _| Box::pin(async { Ok(None) }));
        Arc::new(PlanCatalog::new(Arc::new(plan_repo), "XOF".to_string()))
    }

    fn gateway_returning_session() -> MockPaymentGateway {
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_initiate_payment().returning(|_| {
            Box::pin(async {
                Ok(InitiatedPayment {
                    pay_token: "pt-123".to_string(),
                    payment_url: "https://pay.example/checkout/pt-123".to_string(),
                    notif_token: Some("nt-456".to_string()),
                })
            })
        });
        gateway
    }

    #[tokio::test]
    async fn renewal_for_a_year_uses_yearly_price_and_records_pending_payment() {
        let tenant = Tenant::hospital(Uuid::new_v4());
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let subscription = sample_subscription(
            tenant,
            PlanCode::Standard,
            SubscriptionStatus::Active,
            now - Duration::days(30),
            now,
        );
        let subscription_id = subscription.id;
        let expected_order_id = OrderIntent::Renewal {
            subscription_id,
            months: 24,
        }
        .encode(now);
        let recorded_order_id = expected_order_id.clone();

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_record_pending_payment()
            .withf(move |payment| {
                payment.subscription_id == subscription_id
                    && payment.amount_minor == 180_000
                    && payment.status == "PENDING"
                    && payment.payment_method == "ORANGE_MONEY"
                    && payment.transaction_id.as_deref() == Some(recorded_order_id.as_str())
                    && payment.notif_token.as_deref() == Some("nt-456")
            })
            .times(1)
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let usecase = CheckoutUseCase::new(
            catalog_with_price(
                PlanCode::Standard,
                SubscriberType::Hospital,
                BillingInterval::Year,
                90_000,
            ),
            Arc::new(subscription_repo_for(Some(subscription))),
            Arc::new(payment_repo),
            Arc::new(gateway_returning_session()),
        );

        let session = usecase.start_renewal(tenant, 24, now).await.unwrap();

        assert_eq!(session.order_id, expected_order_id);
        assert_eq!(session.amount_minor, 180_000);
        assert_eq!(session.payment_url, "https://pay.example/checkout/pt-123");
    }

    #[tokio::test]
    async fn whole_years_without_yearly_price_row_bill_every_month() {
        let tenant = Tenant::doctor(Uuid::new_v4());
        let now = Utc::now();
        let subscription = sample_subscription(
            tenant,
            PlanCode::Standard,
            SubscriptionStatus::Active,
            now - Duration::days(3),
            now + Duration::days(27),
        );

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_record_pending_payment()
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let usecase = CheckoutUseCase::new(
            catalog_with_base_price_only(PlanCode::Standard, 10_000),
            Arc::new(subscription_repo_for(Some(subscription))),
            Arc::new(payment_repo),
            Arc::new(gateway_returning_session()),
        );

        for (months, expected) in [(11, 110_000), (12, 120_000), (24, 240_000), (36, 360_000)] {
            let session = usecase.start_renewal(tenant, months, now).await.unwrap();
            assert_eq!(session.amount_minor, expected, "{months} months");
        }
    }

    #[tokio::test]
    async fn plan_change_encodes_target_plan_in_order_id() {
        let tenant = Tenant::doctor(Uuid::new_v4());
        let now = Utc::now();
        let subscription = sample_subscription(
            tenant,
            PlanCode::Standard,
            SubscriptionStatus::Active,
            now - Duration::days(3),
            now + Duration::days(27),
        );

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_record_pending_payment()
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let usecase = CheckoutUseCase::new(
            catalog_with_price(
                PlanCode::Premium,
                SubscriberType::Doctor,
                BillingInterval::Month,
                25_000,
            ),
            Arc::new(subscription_repo_for(Some(subscription))),
            Arc::new(payment_repo),
            Arc::new(gateway_returning_session()),
        );

        let session = usecase
            .start_plan_change(tenant, PlanCode::Premium, 3, now)
            .await
            .unwrap();

        assert!(session.order_id.starts_with("CHG-PREMIUM-"));
        assert_eq!(session.amount_minor, 75_000);
        assert!(matches!(
            OrderIntent::parse(&session.order_id),
            Some(OrderIntent::PlanChange {
                plan: PlanCode::Premium,
                months: 3,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn zero_price_is_rejected_before_the_gateway_is_called() {
        let tenant = Tenant::doctor(Uuid::new_v4());
        let now = Utc::now();
        let subscription = sample_subscription(
            tenant,
            PlanCode::Standard,
            SubscriptionStatus::Active,
            now,
            now + Duration::days(30),
        );

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_initiate_payment().never();
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo.expect_record_pending_payment().never();

        let usecase = CheckoutUseCase::new(
            catalog_with_price(PlanCode::Standard, SubscriberType::Doctor, BillingInterval::Month, 0),
            Arc::new(subscription_repo_for(Some(subscription))),
            Arc::new(payment_repo),
            Arc::new(gateway),
        );

        let err = usecase.start_renewal(tenant, 1, now).await.unwrap_err();
        assert!(matches!(err, CheckoutError::NotChargeable(PlanCode::Standard)));
    }

    #[tokio::test]
    async fn months_out_of_range_are_rejected() {
        let usecase = CheckoutUseCase::new(
            Arc::new(PlanCatalog::new(
                Arc::new(MockPlanRepository::new()),
                "XOF".to_string(),
            )),
            Arc::new(MockSubscriptionRepository::new()),
            Arc::new(MockPaymentRepository::new()),
            Arc::new(MockPaymentGateway::new()),
        );
        let tenant = Tenant::doctor(Uuid::new_v4());

        for months in [0, MAX_CHECKOUT_MONTHS + 1] {
            let err = usecase.start_renewal(tenant, months, Utc::now()).await.unwrap_err();
            assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn gateway_failure_records_nothing() {
        let tenant = Tenant::doctor(Uuid::new_v4());
        let now = Utc::now();
        let subscription = sample_subscription(
            tenant,
            PlanCode::Standard,
            SubscriptionStatus::Active,
            now,
            now + Duration::days(30),
        );

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_initiate_payment()
            .returning(|_| Box::pin(async { Err(anyhow::anyhow!("mobile money request timed out")) }));
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo.expect_record_pending_payment().never();

        let usecase = CheckoutUseCase::new(
            catalog_with_price(
                PlanCode::Standard,
                SubscriberType::Doctor,
                BillingInterval::Month,
                10_000,
            ),
            Arc::new(subscription_repo_for(Some(subscription))),
            Arc::new(payment_repo),
            Arc::new(gateway),
        );

        let err = usecase.start_renewal(tenant, 1, now).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "payment gateway is unavailable");
    }

    #[tokio::test]
    async fn tenant_without_subscription_cannot_check_out() {
        let usecase = CheckoutUseCase::new(
            Arc::new(PlanCatalog::new(
                Arc::new(MockPlanRepository::new()),
                "XOF".to_string(),
            )),
            Arc::new(subscription_repo_for(None)),
            Arc::new(MockPaymentRepository::new()),
            Arc::new(MockPaymentGateway::new()),
        );

        let err = usecase
            .start_renewal(Tenant::doctor(Uuid::new_v4()), 1, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::SubscriptionNotFound));
    }
}
