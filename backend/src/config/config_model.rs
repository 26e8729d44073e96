use crates::payments::mobile_money_client::MobileMoneyConfig;

use super::stage::Stage;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub stage: Stage,
    pub backend_server: BackendServer,
    pub database: Database,
    pub auth: Auth,
    pub mobile_money: MobileMoneyConfig,
    pub billing: Billing,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
    /// Only consulted in `Stage::Production`; other stages allow any origin.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct Auth {
    pub jwt_secret: String,
}

#[derive(Debug, Clone)]
pub struct Billing {
    pub default_currency: String,
    pub trial_days: i64,
    pub grace_period_days: i64,
}
