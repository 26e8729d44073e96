use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    config::config_model::DotEnvyConfig,
    usecases::{
        plan_catalog::PlanCatalog,
        quota::{QuotaError, QuotaUseCase},
    },
};
use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use chrono::Utc;
use crates::{
    domain::repositories::{
        plans::PlanRepository, subscriptions::SubscriptionRepository,
        usage::TenantUsageRepository,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            plans::PlanPostgres, subscriptions::SubscriptionPostgres, usage::TenantUsagePostgres,
        },
    },
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AppointmentCheckRequest {
    pub patient_id: Uuid,
    pub appointment_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct QuotaCheckResponse {
    pub allowed: bool,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let plan_repository = PlanPostgres::new(Arc::clone(&db_pool));
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let usage_repository = TenantUsagePostgres::new(Arc::clone(&db_pool));

    let plan_catalog = PlanCatalog::new(
        Arc::new(plan_repository),
        config.billing.default_currency.clone(),
    );
    let usecase = QuotaUseCase::new(
        Arc::new(plan_catalog),
        Arc::new(subscription_repository),
        Arc::new(usage_repository),
    );

    router(Arc::new(usecase))
}

pub fn router<P, S, U>(usecase: Arc<QuotaUseCase<P, S, U>>) -> Router
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    U: TenantUsageRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/appointments/check", post(check_appointment::<P, S, U>))
        .route("/doctors/check", post(check_add_doctor::<P, S, U>))
        .with_state(usecase)
}

pub async fn check_appointment<P, S, U>(
    State(usecase): State<Arc<QuotaUseCase<P, S, U>>>,
    auth: AuthUser,
    Json(request): Json<AppointmentCheckRequest>,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    U: TenantUsageRepository + Send + Sync + 'static,
{
    let tenant = auth.tenant().ok_or(QuotaError::NoTenant)?;

    usecase
        .check_appointment(tenant, request.patient_id, request.appointment_id, Utc::now())
        .await?;
    Ok(Json(QuotaCheckResponse { allowed: true }))
}

pub async fn check_add_doctor<P, S, U>(
    State(usecase): State<Arc<QuotaUseCase<P, S, U>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    U: TenantUsageRepository + Send + Sync + 'static,
{
    let tenant = auth.tenant().ok_or(QuotaError::NoTenant)?;

    usecase.check_add_doctor(tenant, Utc::now()).await?;
    Ok(Json(QuotaCheckResponse { allowed: true }))
}
