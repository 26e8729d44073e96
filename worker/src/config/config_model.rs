use backend::config::config_model::Database;
use crates::payments::mobile_money_client::MobileMoneyConfig;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub worker_server: WorkerServer,
    pub database: Database,
    pub mobile_money: MobileMoneyConfig,
    pub reconciliation: Reconciliation,
}

#[derive(Debug, Clone)]
pub struct WorkerServer {
    pub port: u16,
    pub timeout: u64,
    pub body_limit: u64,
}

#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub window_minutes: i64,
    pub interval_secs: u64,
    pub batch_limit: i64,
    /// The internal trigger answers 503 while this is unset.
    pub internal_token: Option<String>,
}
