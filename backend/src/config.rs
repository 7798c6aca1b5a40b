//! Service settings loaded via OrthoConfig.
//!
//! Values layer from defaults, an optional config file, `MEDIBOOK_*`
//! environment variables and command-line flags, in increasing precedence.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{RateLimitPolicy, RateLimitPolicyError};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
/// Requests per client per window accepted by the general middleware.
pub const DEFAULT_GENERAL_LIMIT: u32 = 300;
/// Requests per partner credential per window.
pub const DEFAULT_PARTNER_LIMIT: u32 = 10;
/// Seconds between stale rate-limit window sweeps.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not `host:port`.
    #[error("invalid bind address {value:?}: {source}")]
    BindAddr {
        /// Rejected value.
        value: String,
        /// Parser failure.
        source: std::net::AddrParseError,
    },
    /// A rate-limit setting is zero.
    #[error("invalid {limiter} rate limit: {source}")]
    Policy {
        /// Which limiter the setting belongs to.
        limiter: &'static str,
        /// Policy validation failure.
        source: RateLimitPolicyError,
    },
}

/// Runtime settings for the booking service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MEDIBOOK")]
pub struct ServiceSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string. Without it the in-memory store is used.
    pub database_url: Option<String>,
    /// General per-client request budget per window.
    #[ortho_config(default = DEFAULT_GENERAL_LIMIT)]
    pub general_limit: u32,
    /// Partner per-credential request budget per window.
    #[ortho_config(default = DEFAULT_PARTNER_LIMIT)]
    pub partner_limit: u32,
    /// Window length in seconds, shared by both limiters.
    #[ortho_config(default = RateLimitPolicy::DEFAULT_WINDOW_SECS)]
    pub window_secs: u64,
    /// Seconds between stale window sweeps.
    #[ortho_config(default = DEFAULT_SWEEP_INTERVAL_SECS)]
    pub sweep_interval_secs: u64,
    /// Partner API keys. In the environment, list them comma-separated
    /// (`a,b`); a single key is written as a JSON list (`["a"]`).
    #[serde(default)]
    #[ortho_config(default = Vec::new())]
    pub partner_api_keys: Vec<String>,
}

impl ServiceSettings {
    /// Parsed listen address.
    ///
    /// # Errors
    ///
    /// [`SettingsError::BindAddr`] when the value is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::BindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    /// Database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Policy for the general traffic limiter.
    ///
    /// # Errors
    ///
    /// [`SettingsError::Policy`] when the limit or window is zero.
    pub fn general_policy(&self) -> Result<RateLimitPolicy, SettingsError> {
        RateLimitPolicy::new(self.general_limit, self.window_secs).map_err(|source| {
            SettingsError::Policy {
                limiter: "general",
                source,
            }
        })
    }

    /// Policy for the partner credential limiter.
    ///
    /// # Errors
    ///
    /// [`SettingsError::Policy`] when the limit or window is zero.
    pub fn partner_policy(&self) -> Result<RateLimitPolicy, SettingsError> {
        RateLimitPolicy::new(self.partner_limit, self.window_secs).map_err(|source| {
            SettingsError::Policy {
                limiter: "partner",
                source,
            }
        })
    }

    /// Interval between sweeps; never shorter than one second.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    /// Partner keys, trimmed, blanks dropped.
    pub fn partner_api_keys(&self) -> Vec<String> {
        self.partner_api_keys
            .iter()
            .map(|key| key.trim())
            .filter(|key| !key.is_empty())
            .map(str::to_owned)
            .collect()
    }
}
