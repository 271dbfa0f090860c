//! Runtime configuration.
//!
//! check-service reads no configuration files. Defaults can be overridden
//! through environment variables:
//!
//! - `CHECK_SERVICE_CONNECT_TIMEOUT_MS`: TCP connect timeout
//! - `CHECK_SERVICE_READ_TIMEOUT_MS`: socket read/write timeout
//! - `NO_COLOR` or `CHECK_SERVICE_NO_COLOR`: disable colored output

use std::env;

use tracing::warn;

use crate::net::client::HttpConfig;

pub const CONNECT_TIMEOUT_VAR: &str = "CHECK_SERVICE_CONNECT_TIMEOUT_MS";
pub const READ_TIMEOUT_VAR: &str = "CHECK_SERVICE_READ_TIMEOUT_MS";
pub const NO_COLOR_VARS: [&str; 2] = ["NO_COLOR", "CHECK_SERVICE_NO_COLOR"];

/// Runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub http: HttpConfig,
    pub no_color: bool,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup (for testing)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(ms) = timeout_from(&lookup, CONNECT_TIMEOUT_VAR) {
            config.http.connect_timeout_ms = ms;
        }
        if let Some(ms) = timeout_from(&lookup, READ_TIMEOUT_VAR) {
            config.http.read_timeout_ms = ms;
        }

        config.no_color = NO_COLOR_VARS.iter().any(|&name| lookup(name).is_some());

        config
    }
}

fn timeout_from<F>(lookup: &F, name: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Some(ms),
        _ => {
            warn!(variable = name, value = %raw, "ignoring invalid timeout");
            None
        }
    }
}
