use crate::{
    axum_http::error_responses::AppError, usecases::payment_finalizer::PaymentFinalizer,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;
use crates::{
    domain::{
        repositories::payments::PaymentRepository, value_objects::gateway::GatewayNotification,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::payments::PaymentPostgres,
    },
};
use std::sync::Arc;
use tracing::info;

// The gateway calls this without a session; the notification token stored at checkout
// authenticates the request.
pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let payment_repository = PaymentPostgres::new(Arc::clone(&db_pool));
    let finalizer = PaymentFinalizer::new(Arc::new(payment_repository));

    router(Arc::new(finalizer))
}

pub fn router<Pay>(finalizer: Arc<PaymentFinalizer<Pay>>) -> Router
where
    Pay: PaymentRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/notify/:order_id", post(notify::<Pay>))
        .with_state(finalizer)
}

pub async fn notify<Pay>(
    State(finalizer): State<Arc<PaymentFinalizer<Pay>>>,
    Path(order_id): Path<String>,
    Json(notification): Json<GatewayNotification>,
) -> Result<impl IntoResponse, AppError>
where
    Pay: PaymentRepository + Send + Sync + 'static,
{
    info!(
        %order_id,
        status = %notification.status,
        txnid = ?notification.txnid,
        "payments: gateway notification received"
    );

    let receipt = finalizer
        .handle_notification(&order_id, &notification, Utc::now())
        .await?;
    Ok(Json(receipt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use crates::domain::{
        entities::payments::SubscriptionPaymentEntity,
        repositories::payments::MockPaymentRepository,
        value_objects::finalization::FinalizeOutcome,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    const ORDER_ID: &str = "REN-1b4e28ba-2fa1-4d2e-8c3f-5a6b7c8d9e0f-1-1706745600000";

    fn stored_payment() -> SubscriptionPaymentEntity {
        let now = Utc::now();
        SubscriptionPaymentEntity {
            id: Uuid::new_v4(),
            subscription_id: Uuid::new_v4(),
            amount_minor: 10_000,
            currency: "XOF".to_string(),
            payment_method: "ORANGE_MONEY".to_string(),
            transaction_id: Some(ORDER_ID.to_string()),
            pay_token: Some("pt-1".to_string()),
            notif_token: Some("nt-1".to_string()),
            status: "PENDING".to_string(),
            payment_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    fn notify_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/notify/{ORDER_ID}"))
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn successful_notification_returns_receipt() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo.expect_find_by_transaction_id().returning(|_| {
            let payment = stored_payment();
            Box::pin(async move { Ok(Some(payment)) })
        });
        payment_repo
            .expect_finalize_payment()
            .withf(|order_id, success, _| order_id == ORDER_ID && *success)
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(FinalizeOutcome::applied()) }));
        let app = router(Arc::new(PaymentFinalizer::new(Arc::new(payment_repo))));

        let response = app
            .oneshot(notify_request(
                json!({ "status": "SUCCESS", "notif_token": "nt-1", "txnid": "MP1" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "verdict": "success", "outcome": { "ok": true } }));
    }

    #[tokio::test]
    async fn forged_token_is_unauthorized() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo.expect_find_by_transaction_id().returning(|_| {
            let payment = stored_payment();
            Box::pin(async move { Ok(Some(payment)) })
        });
        payment_repo.expect_finalize_payment().never();
        let app = router(Arc::new(PaymentFinalizer::new(Arc::new(payment_repo))));

        let response = app
            .oneshot(notify_request(
                json!({ "status": "SUCCESS", "notif_token": "guess" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
