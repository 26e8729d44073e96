use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    config::config_model::DotEnvyConfig,
    usecases::{
        checkout::{CheckoutError, CheckoutUseCase},
        limit_summary::LimitSummaryUseCase,
        plan_catalog::PlanCatalog,
        quota::QuotaUseCase,
        subscriptions::{SubscriptionError, SubscriptionUseCase},
    },
};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use crates::{
    domain::{
        repositories::{
            payment_gateway::PaymentGateway, payments::PaymentRepository, plans::PlanRepository,
            subscriptions::SubscriptionRepository, usage::TenantUsageRepository,
        },
        value_objects::{
            enums::{
                billing_intervals::BillingInterval, plan_codes::PlanCode,
                subscriber_types::SubscriberType,
            },
            subscriptions::{PlanChangeCheckoutModel, RenewalCheckoutModel, SelectPlanModel},
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            payments::PaymentPostgres, plans::PlanPostgres, subscriptions::SubscriptionPostgres,
            usage::TenantUsagePostgres,
        },
    },
    payments::mobile_money_client::MobileMoneyClient,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    plan: PlanCode,
    subscriber_type: SubscriberType,
    interval: Option<BillingInterval>,
}

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    config: Arc<DotEnvyConfig>,
    gateway: Arc<MobileMoneyClient>,
) -> Router {
    let plan_repository = PlanPostgres::new(Arc::clone(&db_pool));
    let subscription_repository = Arc::new(SubscriptionPostgres::new(Arc::clone(&db_pool)));
    let payment_repository = PaymentPostgres::new(Arc::clone(&db_pool));
    let usage_repository = TenantUsagePostgres::new(Arc::clone(&db_pool));

    let plan_catalog = Arc::new(PlanCatalog::new(
        Arc::new(plan_repository),
        config.billing.default_currency.clone(),
    ));
    let subscription_usecase = SubscriptionUseCase::new(
        Arc::clone(&plan_catalog),
        Arc::clone(&subscription_repository),
        config.billing.trial_days,
    );
    let quota_usecase = QuotaUseCase::new(
        Arc::clone(&plan_catalog),
        Arc::clone(&subscription_repository),
        Arc::new(usage_repository),
    );
    let limit_summary_usecase =
        LimitSummaryUseCase::new(Arc::new(quota_usecase), config.billing.grace_period_days);
    let checkout_usecase = CheckoutUseCase::new(
        Arc::clone(&plan_catalog),
        subscription_repository,
        Arc::new(payment_repository),
        gateway,
    );

    router(
        plan_catalog,
        Arc::new(subscription_usecase),
        Arc::new(limit_summary_usecase),
        Arc::new(checkout_usecase),
    )
}

pub fn router<P, S, U, Pay, G>(
    plan_catalog: Arc<PlanCatalog<P>>,
    subscription_usecase: Arc<SubscriptionUseCase<P, S>>,
    limit_summary_usecase: Arc<LimitSummaryUseCase<P, S, U>>,
    checkout_usecase: Arc<CheckoutUseCase<P, S, Pay, G>>,
) -> Router
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    U: TenantUsageRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    let catalog_routes = Router::new()
        .route("/plans", get(list_plans::<P>))
        .route("/price", get(resolve_price::<P>))
        .with_state(plan_catalog);

    let subscription_routes = Router::new()
        .route("/current", get(current_subscription::<P, S>))
        .route("/select", post(select_plan::<P, S>))
        .with_state(subscription_usecase);

    let summary_routes = Router::new()
        .route("/summary", get(limit_summary::<P, S, U>))
        .with_state(limit_summary_usecase);

    let checkout_routes = Router::new()
        .route("/checkout/renewal", post(renewal_checkout::<P, S, Pay, G>))
        .route("/checkout/plan-change", post(plan_change_checkout::<P, S, Pay, G>))
        .with_state(checkout_usecase);

    catalog_routes
        .merge(subscription_routes)
        .merge(summary_routes)
        .merge(checkout_routes)
}

pub async fn list_plans<P>(
    State(plan_catalog): State<Arc<PlanCatalog<P>>>,
    _auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanRepository + Send + Sync + 'static,
{
    let plans = plan_catalog.list_catalog().await?;
    Ok(Json(plans))
}

pub async fn resolve_price<P>(
    State(plan_catalog): State<Arc<PlanCatalog<P>>>,
    _auth: AuthUser,
    Query(query): Query<PriceQuery>,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanRepository + Send + Sync + 'static,
{
    let interval = query.interval.unwrap_or(BillingInterval::Month);
    let price = plan_catalog
        .resolve_price(query.plan, query.subscriber_type, interval)
        .await?;
    Ok(Json(price))
}

pub async fn limit_summary<P, S, U>(
    State(usecase): State<Arc<LimitSummaryUseCase<P, S, U>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    U: TenantUsageRepository + Send + Sync + 'static,
{
    let summary = usecase.summary(&auth.tenant_identity(), Utc::now()).await?;
    Ok(Json(summary))
}

pub async fn current_subscription<P, S>(
    State(usecase): State<Arc<SubscriptionUseCase<P, S>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let tenant = auth.tenant().ok_or(SubscriptionError::NoTenant)?;
    let subscription = usecase.current(tenant, Utc::now()).await?;
    Ok(Json(subscription))
}

pub async fn select_plan<P, S>(
    State(usecase): State<Arc<SubscriptionUseCase<P, S>>>,
    auth: AuthUser,
    Json(model): Json<SelectPlanModel>,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let tenant = auth.tenant().ok_or(SubscriptionError::NoTenant)?;
    info!(user_id = %auth.user_id, "subscriptions: select request received");

    let subscription = usecase.select_plan(tenant, model, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

pub async fn renewal_checkout<P, S, Pay, G>(
    State(usecase): State<Arc<CheckoutUseCase<P, S, Pay, G>>>,
    auth: AuthUser,
    Json(model): Json<RenewalCheckoutModel>,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    let tenant = auth.tenant().ok_or(CheckoutError::NoTenant)?;
    info!(user_id = %auth.user_id, months = model.months, "checkout: renewal request received");

    let session = usecase
        .start_renewal(tenant, model.months, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn plan_change_checkout<P, S, Pay, G>(
    State(usecase): State<Arc<CheckoutUseCase<P, S, Pay, G>>>,
    auth: AuthUser,
    Json(model): Json<PlanChangeCheckoutModel>,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    let tenant = auth.tenant().ok_or(CheckoutError::NoTenant)?;
    info!(
        user_id = %auth.user_id,
        plan = %model.plan,
        months = model.months,
        "checkout: plan change request received"
    );

    let session = usecase
        .start_plan_change(tenant, model.plan, model.months, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}
