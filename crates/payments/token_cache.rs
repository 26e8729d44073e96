use std::future::Future;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

const MAX_TOKEN_LIFETIME_SECS: i64 = 365 * 24 * 60 * 60;

/// Token as returned by the authorization endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in_secs: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Caches one bearer token and refreshes it shortly before it expires.
///
/// The lock is held across the refresh, so concurrent callers wait for a single token request
/// instead of each issuing their own.
pub struct TokenCache {
    slot: Mutex<Option<CachedToken>>,
    safety_margin: Duration,
}

impl TokenCache {
    pub fn new(safety_margin: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            safety_margin,
        }
    }

    pub async fn get_or_refresh<F, Fut>(&self, now: DateTime<Utc>, fetch: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<IssuedToken>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if now + self.safety_margin < cached.expires_at {
                return Ok(cached.access_token.clone());
            }
        }

        let issued = fetch().await?;
        let lifetime = issued.expires_in_secs.clamp(0, MAX_TOKEN_LIFETIME_SECS);
        let expires_at = now
            .checked_add_signed(Duration::seconds(lifetime))
            .unwrap_or(now);
        *slot = Some(CachedToken {
            access_token: issued.access_token.clone(),
            expires_at,
        });

        Ok(issued.access_token)
    }

    /// Drops the cached token, e.g. after the gateway rejected it.
    pub async fn invalidate(&self) {
        self.slot.lock().await.take();
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new(Duration::seconds(60))
    }
}
