use crate::usecases::reconcile_pending_payments::ReconcilePendingPaymentsUseCase;
use anyhow::Result;
use chrono::Utc;
use crates::domain::repositories::{payment_gateway::PaymentGateway, payments::PaymentRepository};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

pub async fn run_reconciliation_loop<Pay, G>(
    usecase: Arc<ReconcilePendingPaymentsUseCase<Pay, G>>,
    interval: Duration,
) -> Result<()>
where
    Pay: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    info!(
        interval_secs = interval.as_secs(),
        "reconciliation: starting worker loop"
    );
    loop {
        if let Err(e) = usecase.run(Utc::now()).await {
            error!(error = ?e, "reconciliation: sweep failed");
        }

        tokio::time::sleep(interval).await;
    }
}
