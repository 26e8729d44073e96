use serde::{Deserialize, Serialize};

/// Request to open a hosted mobile-money payment page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiatePaymentRequest {
    pub order_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiatedPayment {
    pub pay_token: String,
    pub payment_url: String,
    pub notif_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionStatusQuery {
    pub order_id: String,
    pub pay_token: Option<String>,
    pub amount_minor: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionStatus {
    pub raw_status: String,
    pub txnid: Option<String>,
}

impl TransactionStatus {
    pub fn verdict(&self) -> GatewayVerdict {
        GatewayVerdict::classify(&self.raw_status)
    }
}

/// Classified gateway status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayVerdict {
    Success,
    Failed,
    Pending,
    Unrecognized,
}

const FAILED_WORDS: [&str; 10] = [
    "UNPAID",
    "NOT_PAID",
    "UNSUCCESS",
    "NOT_SUCCESS",
    "FAILED",
    "FAILURE",
    "CANCELLED",
    "CANCELED",
    "EXPIRED",
    "REJECTED",
];
const SUCCESS_WORDS: [&str; 2] = ["SUCCESS", "PAID"];
const PENDING_WORDS: [&str; 4] = ["PENDING", "INITIATED", "PROCESSING", "IN_PROGRESS"];

impl GatewayVerdict {
    /// Failure words are checked first so that `UNPAID` or `UNSUCCESSFUL` never read as paid.
    pub fn classify(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        if normalized.is_empty() {
            return GatewayVerdict::Unrecognized;
        }

        if FAILED_WORDS.iter().any(|w| normalized.contains(w)) {
            GatewayVerdict::Failed
        } else if SUCCESS_WORDS.iter().any(|w| normalized.contains(w)) {
            GatewayVerdict::Success
        } else if PENDING_WORDS.iter().any(|w| normalized.contains(w)) {
            GatewayVerdict::Pending
        } else {
            GatewayVerdict::Unrecognized
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayVerdict::Success => "success",
            GatewayVerdict::Failed => "failed",
            GatewayVerdict::Pending => "pending",
            GatewayVerdict::Unrecognized => "unrecognized",
        }
    }
}

/// Body the gateway posts to the notification URL.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayNotification {
    pub status: String,
    pub notif_token: Option<String>,
    pub txnid: Option<String>,
}
