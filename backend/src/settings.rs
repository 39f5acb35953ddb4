//! Process configuration loaded via OrthoConfig.
//!
//! Every field maps to a `JOBBOARD_*` environment variable (and the matching
//! CLI flag). Session toggles are kept as raw strings so the session layer
//! can apply its own debug/release validation.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Deserializer};

use crate::domain::RetryPolicy;
use crate::domain::ledger::{DEFAULT_LOCK_TIMEOUT_MS, DEFAULT_MAX_ATTEMPTS};
use crate::inbound::http::session_config::{
    ALLOW_EPHEMERAL_ENV, COOKIE_SECURE_ENV, KEY_FILE_ENV, SAMESITE_ENV, SessionEnv,
};

/// Runtime settings for the job board server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "JOBBOARD")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL; in-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub database_pool_size: Option<u32>,
    /// Path of the session signing key.
    pub session_key_file: Option<String>,
    #[serde(default, deserialize_with = "raw_toggle")]
    pub session_cookie_secure: Option<String>,
    #[serde(default, deserialize_with = "raw_toggle")]
    pub session_same_site: Option<String>,
    #[serde(default, deserialize_with = "raw_toggle")]
    pub session_allow_ephemeral: Option<String>,
    /// Compare-and-swap attempts per ledger write.
    #[ortho_config(default = DEFAULT_MAX_ATTEMPTS)]
    pub ledger_max_attempts: u32,
    /// Lock wait in milliseconds before a ledger operation gives up.
    #[ortho_config(default = DEFAULT_LOCK_TIMEOUT_MS)]
    pub ledger_lock_timeout_ms: u64,
}

/// Keep session toggles as text whatever type the environment layer
/// inferred, so `1`, `true` and `Strict` all reach the session validator.
fn raw_toggle<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Flag(bool),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Flag(flag) => flag.to_string(),
        Raw::Number(number) => number.to_string(),
    }))
}

impl AppSettings {
    /// Listen address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)))
    }

    /// Retry limits for the application ledger.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.ledger_max_attempts,
            Duration::from_millis(self.ledger_lock_timeout_ms),
        )
    }
}

impl SessionEnv for AppSettings {
    fn string(&self, name: &str) -> Option<String> {
        match name {
            KEY_FILE_ENV => self.session_key_file.clone(),
            COOKIE_SECURE_ENV => self.session_cookie_secure.clone(),
            SAMESITE_ENV => self.session_same_site.clone(),
            ALLOW_EPHEMERAL_ENV => self.session_allow_ephemeral.clone(),
            _ => None,
        }
    }
}
