use super::{
    config_model::{Auth, BackendServer, Billing, Database, DotEnvyConfig},
    stage::Stage,
};
use anyhow::{Context, Result};
use crates::payments::mobile_money_client::MobileMoneyConfig;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required("SERVER_PORT_BACKEND")?
            .parse()
            .context("SERVER_PORT_BACKEND is invalid")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
        allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
    };

    let auth = Auth {
        jwt_secret: required("JWT_SECRET")?,
    };

    Ok(DotEnvyConfig {
        stage: get_stage(),
        backend_server,
        database: load_database()?,
        auth,
        mobile_money: load_mobile_money()?,
        billing: load_billing()?,
    })
}

pub fn load_database() -> Result<Database> {
    Ok(Database {
        url: required("DATABASE_URL")?,
        max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS is invalid")?,
    })
}

/// Shared with the worker, which polls the same gateway.
pub fn load_mobile_money() -> Result<MobileMoneyConfig> {
    dotenvy::dotenv().ok();

    Ok(MobileMoneyConfig {
        base_url: required("MOBILE_MONEY_BASE_URL")?,
        token_url: required("MOBILE_MONEY_TOKEN_URL")?,
        client_id: required("MOBILE_MONEY_CLIENT_ID")?,
        client_secret: required("MOBILE_MONEY_CLIENT_SECRET")?,
        merchant_key: required("MOBILE_MONEY_MERCHANT_KEY")?,
        return_url: required("MOBILE_MONEY_RETURN_URL")?,
        cancel_url: required("MOBILE_MONEY_CANCEL_URL")?,
        notif_url: required("MOBILE_MONEY_NOTIF_URL")?,
        lang: std::env::var("MOBILE_MONEY_LANG").unwrap_or_else(|_| "fr".to_string()),
        timeout_secs: std::env::var("MOBILE_MONEY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "15".to_string())
            .parse()
            .context("MOBILE_MONEY_TIMEOUT_SECS is invalid")?,
    })
}

pub fn load_billing() -> Result<Billing> {
    Ok(Billing {
        default_currency: std::env::var("BILLING_DEFAULT_CURRENCY")
            .ok()
            .map(|v| v.trim().to_ascii_uppercase())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "XOF".to_string()),
        trial_days: std::env::var("BILLING_TRIAL_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(14),
        grace_period_days: std::env::var("BILLING_GRACE_PERIOD_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| *v >= 0)
            .unwrap_or(0),
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or("".to_string());
    Stage::try_from(&stage_str).unwrap_or_default()
}

pub fn get_jwt_secret() -> Result<String> {
    dotenvy::dotenv().ok();

    required("JWT_SECRET")
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}
