use super::config_model::{DotEnvyConfig, Reconciliation, WorkerServer};
use anyhow::{Context, Result};
use backend::config::config_loader::{load_database, load_mobile_money};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let worker_server = WorkerServer {
        port: required("SERVER_PORT_WORKER")?
            .parse()
            .context("SERVER_PORT_WORKER is invalid")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let reconciliation = Reconciliation {
        window_minutes: positive_or("RECONCILIATION_WINDOW_MINUTES", 120),
        interval_secs: positive_or("RECONCILIATION_INTERVAL_SECS", 300) as u64,
        batch_limit: positive_or("RECONCILIATION_BATCH_LIMIT", 200),
        internal_token: std::env::var("INTERNAL_RECONCILIATION_TOKEN")
            .ok()
            .and_then(|v| {
                let trimmed = v.trim().to_string();
                (!trimmed.is_empty()).then_some(trimmed)
            }),
    };

    Ok(DotEnvyConfig {
        worker_server,
        database: load_database()?,
        mobile_money: load_mobile_money()?,
        reconciliation,
    })
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}

fn positive_or(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}
