use anyhow::Result;
use crates::{
    infra::db::{postgres::postgres_connection, repositories::payments::PaymentPostgres},
    payments::mobile_money_client::MobileMoneyClient,
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};
use worker::{
    axum_http, config,
    services::worker_loop,
    usecases::reconcile_pending_payments::{
        ReconcilePendingPaymentsUseCase, ReconciliationSettings,
    },
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Worker exited with error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config::config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(
        &dotenvy_env.database.url,
        dotenvy_env.database.max_connections,
    )?;
    info!("Postgres connection has been established");

    let payment_repository = Arc::new(PaymentPostgres::new(Arc::new(postgres_pool)));
    let gateway = Arc::new(MobileMoneyClient::new(dotenvy_env.mobile_money.clone())?);

    let reconciliation = &dotenvy_env.reconciliation;
    let usecase = Arc::new(ReconcilePendingPaymentsUseCase::new(
        payment_repository,
        gateway,
        ReconciliationSettings {
            window_minutes: reconciliation.window_minutes,
            batch_limit: reconciliation.batch_limit,
        },
    ));
    if reconciliation.internal_token.is_none() {
        info!("INTERNAL_RECONCILIATION_TOKEN is unset; manual trigger disabled");
    }

    let reconciliation_loop = tokio::spawn(worker_loop::run_reconciliation_loop(
        Arc::clone(&usecase),
        Duration::from_secs(reconciliation.interval_secs),
    ));

    let server_config = Arc::clone(&dotenvy_env);
    let http_server =
        tokio::spawn(async move { axum_http::http_serve::start(server_config, usecase).await });

    tokio::select! {
        result = reconciliation_loop => result??,
        result = http_server => result??,
    };
    Ok(())
}
