use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;
use crates::domain::repositories::{payment_gateway::PaymentGateway, payments::PaymentRepository};
use subtle::ConstantTimeEq;
use tracing::{error, info};

use crate::usecases::reconcile_pending_payments::ReconcilePendingPaymentsUseCase;

// Run example
//   curl -X POST "http://localhost:$SERVER_PORT_WORKER/internal/v1/reconciliation/run" \
//     -H "Authorization: Bearer $INTERNAL_RECONCILIATION_TOKEN"

pub struct ReconciliationRouteState<Pay, G>
where
    Pay: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    internal_token: Option<Arc<str>>,
    usecase: Arc<ReconcilePendingPaymentsUseCase<Pay, G>>,
}

impl<Pay, G> Clone for ReconciliationRouteState<Pay, G>
where
    Pay: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            internal_token: self.internal_token.clone(),
            usecase: Arc::clone(&self.usecase),
        }
    }
}

pub fn routes<Pay, G>(
    internal_token: Option<String>,
    usecase: Arc<ReconcilePendingPaymentsUseCase<Pay, G>>,
) -> Router
where
    Pay: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    Router::new()
        .route("/run", post(run_reconciliation::<Pay, G>))
        .with_state(ReconciliationRouteState {
            internal_token: internal_token.map(Arc::from),
            usecase,
        })
}

pub async fn run_reconciliation<Pay, G>(
    State(state): State<ReconciliationRouteState<Pay, G>>,
    headers: HeaderMap,
) -> Response
where
    Pay: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    let expected_token = match state.internal_token.as_deref() {
        Some(token) => token,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                "reconciliation token is not configured",
            )
                .into_response();
        }
    };

    if let Err(status) = authorize_bearer(&headers, expected_token) {
        return (status, "unauthorized").into_response();
    }

    info!("reconciliation: manual sweep triggered");
    match state.usecase.run(Utc::now()).await {
        Ok(report) => Json(report).into_response(),
        Err(err) => {
            error!(error = ?err, "reconciliation: manual sweep failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "reconciliation failed").into_response()
        }
    }
}

fn authorize_bearer(headers: &HeaderMap, expected_token: &str) -> Result<(), StatusCode> {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if bool::from(token.as_bytes().ct_eq(expected_token.as_bytes())) {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::reconcile_pending_payments::ReconciliationSettings;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use crates::domain::repositories::{
        payment_gateway::MockPaymentGateway, payments::MockPaymentRepository,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app(internal_token: Option<&str>, payment_repo: MockPaymentRepository) -> Router {
        let usecase = ReconcilePendingPaymentsUseCase::new(
            Arc::new(payment_repo),
            Arc::new(MockPaymentGateway::new()),
            ReconciliationSettings {
                window_minutes: 120,
                batch_limit: 200,
            },
        );
        routes(internal_token.map(str::to_string), Arc::new(usecase))
    }

    fn run_request(authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/run");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn trigger_is_disabled_without_token() {
        let response = app(None, MockPaymentRepository::new())
            .oneshot(run_request(Some("Bearer anything")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn wrong_token_is_unauthorized() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo.expect_list_reconciliation_candidates().never();

        let response = app(Some("s3cret"), payment_repo)
            .oneshot(run_request(Some("Bearer guess")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn authorized_trigger_returns_report() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_list_reconciliation_candidates()
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(Vec::new()) }));

        let response = app(Some("s3cret"), payment_repo)
            .oneshot(run_request(Some("Bearer s3cret")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({
                "scanned": 0,
                "completed": 0,
                "failed": 0,
                "still_pending": 0,
                "unrecognized": 0,
                "errors": 0
            })
        );
    }
}
