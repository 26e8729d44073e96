use crate::{
    auth::AdminUser,
    axum_http::error_responses::AppError,
    usecases::admin_subscriptions::{
        AdminSubscriptionUseCase, DEFAULT_CLEANUP_LIMIT, DEFAULT_CLEANUP_OLDER_THAN_DAYS,
        MAX_CLEANUP_OLDER_THAN_DAYS,
    },
};
use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;
use crates::{
    domain::repositories::subscriptions::SubscriptionRepository,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::subscriptions::SubscriptionPostgres,
    },
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// Run example
//   curl -X POST "http://localhost:$SERVER_PORT_BACKEND/api/v1/admin/subscriptions/cleanup" \
//     -H "Authorization: Bearer $ADMIN_SESSION_JWT" \
//     -H "Content-Type: application/json" \
//     -d '{"older_than_days":90,"limit":500}'

#[derive(Debug, Default, Deserialize)]
pub struct CleanupSubscriptionsRequest {
    pub older_than_days: Option<i64>,
    pub limit: Option<i64>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let usecase = AdminSubscriptionUseCase::new(Arc::new(subscription_repository));

    router(Arc::new(usecase))
}

pub fn router<S>(usecase: Arc<AdminSubscriptionUseCase<S>>) -> Router
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/:subscription_id/approve", post(approve::<S>))
        .route("/:subscription_id/reject", post(reject::<S>))
        .route("/cleanup", post(cleanup::<S>))
        .with_state(usecase)
}

pub async fn approve<S>(
    State(usecase): State<Arc<AdminSubscriptionUseCase<S>>>,
    AdminUser(admin): AdminUser,
    Path(subscription_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    info!(admin_id = %admin.user_id, %subscription_id, "admin: approve request received");
    let subscription = usecase.approve(subscription_id, Utc::now()).await?;
    Ok(Json(subscription))
}

pub async fn reject<S>(
    State(usecase): State<Arc<AdminSubscriptionUseCase<S>>>,
    AdminUser(admin): AdminUser,
    Path(subscription_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    info!(admin_id = %admin.user_id, %subscription_id, "admin: reject request received");
    let subscription = usecase.reject(subscription_id, Utc::now()).await?;
    Ok(Json(subscription))
}

pub async fn cleanup<S>(
    State(usecase): State<Arc<AdminSubscriptionUseCase<S>>>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CleanupSubscriptionsRequest>,
) -> Result<impl IntoResponse, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let older_than_days = request
        .older_than_days
        .unwrap_or(DEFAULT_CLEANUP_OLDER_THAN_DAYS);
    let limit = request.limit.unwrap_or(DEFAULT_CLEANUP_LIMIT);
    if !(0..=MAX_CLEANUP_OLDER_THAN_DAYS).contains(&older_than_days) || limit <= 0 {
        return Err(AppError::BadRequest(format!(
            "older_than_days must be in 0..={MAX_CLEANUP_OLDER_THAN_DAYS} and limit > 0"
        )));
    }

    info!(admin_id = %admin.user_id, older_than_days, limit, "admin: cleanup request received");
    let result = usecase.cleanup(older_than_days, limit, Utc::now()).await?;
    Ok(Json(result))
}
