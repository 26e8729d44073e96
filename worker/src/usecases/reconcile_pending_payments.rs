use anyhow::{Context, Result};
use backend::usecases::payment_finalizer::PaymentFinalizer;
use chrono::{DateTime, Duration, Utc};
use crates::domain::{
    entities::payments::SubscriptionPaymentEntity,
    repositories::{payment_gateway::PaymentGateway, payments::PaymentRepository},
    value_objects::gateway::{GatewayVerdict, TransactionStatusQuery},
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy)]
pub struct ReconciliationSettings {
    pub window_minutes: i64,
    pub batch_limit: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub scanned: usize,
    pub completed: usize,
    pub failed: usize,
    pub still_pending: usize,
    pub unrecognized: usize,
    pub errors: usize,
}

pub struct ReconcilePendingPaymentsUseCase<Pay, G>
where
    Pay: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    payment_repo: Arc<Pay>,
    gateway: Arc<G>,
    finalizer: PaymentFinalizer<Pay>,
    settings: ReconciliationSettings,
    // The loop and the internal trigger share one use case; sweeps never overlap.
    sweep_lock: Mutex<()>,
}

impl<Pay, G> ReconcilePendingPaymentsUseCase<Pay, G>
where
    Pay: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    pub fn new(payment_repo: Arc<Pay>, gateway: Arc<G>, settings: ReconciliationSettings) -> Self {
        Self {
            finalizer: PaymentFinalizer::new(Arc::clone(&payment_repo)),
            payment_repo,
            gateway,
            settings,
            sweep_lock: Mutex::new(()),
        }
    }

    /// One sweep over recent PENDING payments. Only listing the candidates can fail the
    /// sweep; every per-payment problem is logged and counted in `errors`.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<ReconciliationReport> {
        let _guard = self.sweep_lock.lock().await;

        let since = now - Duration::minutes(self.settings.window_minutes);
        let candidates = self
            .payment_repo
            .list_reconciliation_candidates(since, self.settings.batch_limit)
            .await
            .context("failed to list reconciliation candidates")?;

        let mut report = ReconciliationReport {
            scanned: candidates.len(),
            ..Default::default()
        };
        if candidates.is_empty() {
            debug!(%since, "reconciliation: no pending payments in window");
            return Ok(report);
        }

        for payment in &candidates {
            match self.reconcile_one(payment, now).await {
                Ok(GatewayVerdict::Success) => report.completed += 1,
                Ok(GatewayVerdict::Failed) => report.failed += 1,
                Ok(GatewayVerdict::Pending) => report.still_pending += 1,
                Ok(GatewayVerdict::Unrecognized) => report.unrecognized += 1,
                Err(err) => {
                    error!(
                        payment_id = %payment.id,
                        order_id = ?payment.transaction_id,
                        error = ?err,
                        "reconciliation: failed to reconcile payment; continuing"
                    );
                    report.errors += 1;
                }
            }
        }

        info!(
            scanned = report.scanned,
            completed = report.completed,
            failed = report.failed,
            still_pending = report.still_pending,
            unrecognized = report.unrecognized,
            errors = report.errors,
            "reconciliation: sweep completed"
        );

        Ok(report)
    }

    async fn reconcile_one(
        &self,
        payment: &SubscriptionPaymentEntity,
        now: DateTime<Utc>,
    ) -> Result<GatewayVerdict> {
        let order_id = payment
            .transaction_id
            .as_deref()
            .context("pending payment has no gateway order id")?;

        let status = self
            .gateway
            .check_transaction_status(TransactionStatusQuery {
                order_id: order_id.to_string(),
                pay_token: payment.pay_token.clone(),
                amount_minor: Some(payment.amount_minor),
            })
            .await
            .context("transaction status poll failed")?;

        let verdict = status.verdict();
        match verdict {
            GatewayVerdict::Success | GatewayVerdict::Failed => {
                let success = verdict == GatewayVerdict::Success;
                let outcome = self.finalizer.finalize(order_id, success, now).await?;
                info!(
                    %order_id,
                    success,
                    already = outcome.already,
                    txnid = ?status.txnid,
                    "reconciliation: payment settled"
                );
            }
            GatewayVerdict::Pending => {
                debug!(%order_id, status = %status.raw_status, "reconciliation: still pending");
            }
            GatewayVerdict::Unrecognized => {
                error!(
                    %order_id,
                    status = %status.raw_status,
                    "reconciliation: unrecognized gateway status; leaving payment untouched"
                );
            }
        }

        Ok(verdict)
    }
}
