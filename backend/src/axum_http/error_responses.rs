use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::usecases::{
    checkout::CheckoutError, payment_finalizer::FinalizeError, quota::QuotaError,
    subscriptions::SubscriptionError,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A use case refused the request; the message is safe to show to the caller.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn rejected(status: StatusCode, message: impl ToString) -> Self {
        AppError::Rejected {
            status,
            message: message.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Rejected { status, message } => (status, message),
            AppError::Internal(err) => {
                error!(error = ?err, "http: internal error");
                // Don't leak internal error detail to client
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<QuotaError> for AppError {
    fn from(err: QuotaError) -> Self {
        match err {
            QuotaError::Internal(inner) => AppError::Internal(inner),
            other => AppError::rejected(other.status_code(), &other),
        }
    }
}

impl From<SubscriptionError> for AppError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::Internal(inner) => AppError::Internal(inner),
            other => AppError::rejected(other.status_code(), &other),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Internal(inner) => AppError::Internal(inner),
            CheckoutError::Gateway(inner) => {
                error!(error = ?inner, "http: payment gateway call failed");
                AppError::rejected(StatusCode::BAD_GATEWAY, "payment gateway is unavailable")
            }
            other => AppError::rejected(other.status_code(), &other),
        }
    }
}

impl From<FinalizeError> for AppError {
    fn from(err: FinalizeError) -> Self {
        match err {
            FinalizeError::Internal(inner) => AppError::Internal(inner),
            other => AppError::rejected(other.status_code(), &other),
        }
    }
}
