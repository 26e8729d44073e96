use chrono::{DateTime, Utc};
use crates::domain::{
    repositories::payments::PaymentRepository,
    value_objects::{
        finalization::{FinalizeOutcome, FinalizeReason},
        gateway::{GatewayNotification, GatewayVerdict},
    },
};
use serde::Serialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum FinalizeError {
    #[error("payment not found")]
    PaymentNotFound,
    #[error("notification token does not match the payment")]
    InvalidNotificationToken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl FinalizeError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            FinalizeError::PaymentNotFound => StatusCode::NOT_FOUND,
            FinalizeError::InvalidNotificationToken => StatusCode::UNAUTHORIZED,
            FinalizeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, FinalizeError>;

/// What a push notification led to. `outcome` is absent when the verdict was inconclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotificationReceipt {
    pub verdict: GatewayVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<FinalizeOutcome>,
}

/// Single entry point for settling gateway orders, shared by the webhook and the
/// reconciliation sweep.
pub struct PaymentFinalizer<Pay>
where
    Pay: PaymentRepository + Send + Sync + 'static,
{
    payment_repo: Arc<Pay>,
}

impl<Pay> PaymentFinalizer<Pay>
where
    Pay: PaymentRepository + Send + Sync + 'static,
{
    pub fn new(payment_repo: Arc<Pay>) -> Self {
        Self { payment_repo }
    }

    /// Idempotent: a payment that is already COMPLETED or FAILED is reported as `already`.
    pub async fn finalize(
        &self,
        order_id: &str,
        success: bool,
        now: DateTime<Utc>,
    ) -> UseCaseResult<FinalizeOutcome> {
        let outcome = self
            .payment_repo
            .finalize_payment(order_id, success, now)
            .await
            .map_err(|err| {
                error!(%order_id, success, db_error = ?err, "finalizer: transaction failed");
                FinalizeError::Internal(err)
            })?;

        match outcome.reason {
            Some(FinalizeReason::PaymentNotFound) => {
                warn!(%order_id, "finalizer: payment not found");
            }
            Some(reason @ FinalizeReason::IntentUnrecognized)
            | Some(reason @ FinalizeReason::SubscriptionMissingButPaid) => {
                error!(
                    %order_id,
                    reason = reason.as_str(),
                    "finalizer: payment captured but subscription not updated; reconcile manually"
                );
            }
            None if outcome.already => {
                info!(%order_id, "finalizer: payment already final; nothing to do");
            }
            None => {
                info!(%order_id, success, "finalizer: payment finalized");
            }
        }

        Ok(outcome)
    }

    /// Authenticates a gateway push by its notification token, then feeds the verdict to
    /// [`Self::finalize`]. Pending or unrecognized statuses leave the payment untouched.
    pub async fn handle_notification(
        &self,
        order_id: &str,
        notification: &GatewayNotification,
        now: DateTime<Utc>,
    ) -> UseCaseResult<NotificationReceipt> {
        let payment = self
            .payment_repo
            .find_by_transaction_id(order_id)
            .await?
            .ok_or_else(|| {
                warn!(%order_id, "finalizer: notification for unknown order");
                FinalizeError::PaymentNotFound
            })?;

        let stored = payment.notif_token.as_deref();
        if !notification_token_matches(stored, notification.notif_token.as_deref()) {
            warn!(
                %order_id,
                payment_id = %payment.id,
                "finalizer: notification token mismatch; ignoring"
            );
            return Err(FinalizeError::InvalidNotificationToken);
        }

        let verdict = GatewayVerdict::classify(&notification.status);
        let outcome = match verdict {
            GatewayVerdict::Success => Some(self.finalize(order_id, true, now).await?),
            GatewayVerdict::Failed => Some(self.finalize(order_id, false, now).await?),
            GatewayVerdict::Pending => {
                info!(%order_id, status = %notification.status, "finalizer: notification still pending");
                None
            }
            GatewayVerdict::Unrecognized => {
                error!(
                    %order_id,
                    status = %notification.status,
                    "finalizer: unrecognized gateway status in notification"
                );
                None
            }
        };

        Ok(NotificationReceipt { verdict, outcome })
    }
}

fn notification_token_matches(stored: Option<&str>, received: Option<&str>) -> bool {
    match (stored, received) {
        (Some(expected), Some(received)) => {
            expected.as_bytes().ct_eq(received.as_bytes()).into()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crates::domain::{
        entities::payments::SubscriptionPaymentEntity, repositories::payments::MockPaymentRepository,
    };
    use uuid::Uuid;

    const ORDER_ID: &str = "REN-7d1f6c2a-3b4e-4f5a-9c8d-1e2f3a4b5c6d-3-1700000000000";

    fn pending_payment(notif_token: Option<&str>) -> SubscriptionPaymentEntity {
        let now = Utc::now();
        SubscriptionPaymentEntity {
            id: Uuid::new_v4(),
            subscription_id: Uuid::new_v4(),
            amount_minor: 30_000,
            currency: "XOF".to_string(),
            payment_method: "ORANGE_MONEY".to_string(),
            transaction_id: Some(ORDER_ID.to_string()),
            pay_token: Some("pt-1".to_string()),
            notif_token: notif_token.map(str::to_string),
            status: "PENDING".to_string(),
            payment_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    fn notification(status: &str, notif_token: Option<&str>) -> GatewayNotification {
        GatewayNotification {
            status: status.to_string(),
            notif_token: notif_token.map(str::to_string),
            txnid: Some("MP240201.0001.A00001".to_string()),
        }
    }

    fn repo_with_payment(payment: Option<SubscriptionPaymentEntity>) -> MockPaymentRepository {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_find_by_transaction_id()
            .returning(move |_| {
                let payment = payment.clone();
                Box::pin(async move { Ok(payment) })
            });
        payment_repo
    }

    #[tokio::test]
    async fn finalize_passes_through_repository_outcome() {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_finalize_payment()
            .withf(move |order_id, success, at| order_id == ORDER_ID && *success && *at == now)
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(FinalizeOutcome::already_final()) }));

        let finalizer = PaymentFinalizer::new(Arc::new(payment_repo));
        let outcome = finalizer.finalize(ORDER_ID, true, now).await.unwrap();

        assert_eq!(outcome, FinalizeOutcome::already_final());
    }

    #[tokio::test]
    async fn successful_notification_completes_the_payment() {
        let mut payment_repo = repo_with_payment(Some(pending_payment(Some("nt-1"))));
        payment_repo
            .expect_finalize_payment()
            .withf(|order_id, success, _| order_id == ORDER_ID && *success)
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(FinalizeOutcome::applied()) }));

        let finalizer = PaymentFinalizer::new(Arc::new(payment_repo));
        let receipt = finalizer
            .handle_notification(ORDER_ID, &notification("SUCCESS", Some("nt-1")), Utc::now())
            .await
            .unwrap();

        assert_eq!(receipt.verdict, GatewayVerdict::Success);
        assert_eq!(receipt.outcome, Some(FinalizeOutcome::applied()));
    }

    #[tokio::test]
    async fn failed_notification_finalizes_as_failure() {
        let mut payment_repo = repo_with_payment(Some(pending_payment(Some("nt-1"))));
        payment_repo
            .expect_finalize_payment()
            .withf(|_, success, _| !*success)
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(FinalizeOutcome::applied()) }));

        let finalizer = PaymentFinalizer::new(Arc::new(payment_repo));
        let receipt = finalizer
            .handle_notification(ORDER_ID, &notification("FAILED", Some("nt-1")), Utc::now())
            .await
            .unwrap();

        assert_eq!(receipt.verdict, GatewayVerdict::Failed);
    }

    #[tokio::test]
    async fn mismatched_token_never_finalizes() {
        let mut payment_repo = repo_with_payment(Some(pending_payment(Some("nt-1"))));
        payment_repo.expect_finalize_payment().never();

        let finalizer = PaymentFinalizer::new(Arc::new(payment_repo));
        let err = finalizer
            .handle_notification(ORDER_ID, &notification("SUCCESS", Some("forged")), Utc::now())
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn token_comparison_needs_the_exact_token() {
        assert!(notification_token_matches(Some("nt-1"), Some("nt-1")));
        assert!(!notification_token_matches(Some("nt-1"), Some("nt-")));
        assert!(!notification_token_matches(Some("nt-1"), Some("nt-10")));
        assert!(!notification_token_matches(Some("nt-1"), Some("")));
        assert!(!notification_token_matches(None, Some("nt-1")));
        assert!(!notification_token_matches(Some("nt-1"), None));
    }

    #[tokio::test]
    async fn payment_without_stored_token_cannot_be_notified() {
        let mut payment_repo = repo_with_payment(Some(pending_payment(None)));
        payment_repo.expect_finalize_payment().never();

        let finalizer = PaymentFinalizer::new(Arc::new(payment_repo));
        let err = finalizer
            .handle_notification(ORDER_ID, &notification("SUCCESS", None), Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, FinalizeError::InvalidNotificationToken));
    }

    #[tokio::test]
    async fn inconclusive_statuses_leave_payment_untouched() {
        for status in ["PENDING", "SOMETHING_NEW"] {
            let mut payment_repo = repo_with_payment(Some(pending_payment(Some("nt-1"))));
            payment_repo.expect_finalize_payment().never();

            let finalizer = PaymentFinalizer::new(Arc::new(payment_repo));
            let receipt = finalizer
                .handle_notification(ORDER_ID, &notification(status, Some("nt-1")), Utc::now())
                .await
                .unwrap();

            assert_eq!(receipt.outcome, None);
        }
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let finalizer = PaymentFinalizer::new(Arc::new(repo_with_payment(None)));
        let err = finalizer
            .handle_notification(ORDER_ID, &notification("SUCCESS", Some("nt-1")), Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, FinalizeError::PaymentNotFound));
    }
}
