use std::env;
use std::num::NonZeroU64;
use std::str::FromStr;
use std::time::Duration;

use crate::chat::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_STATUS_TIMEOUT, Mode};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub status_timeout: Duration,
    pub voice_command: Option<String>,
    pub seed_welcome: bool,
    pub mode: Mode,
}

impl AppConfig {
    /// Reads the config using `lookup` in place of the process
    /// environment. Malformed values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = "127.0.0.1";
        let port = "5000";
        let api_base_url =
            lookup("SKYDOST_API_URL").unwrap_or_else(|| format!("http://{}:{}", host, port));
        let request_timeout = timeout_or(
            "SKYDOST_REQUEST_TIMEOUT_SECS",
            lookup("SKYDOST_REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT,
        );
        let status_timeout = timeout_or(
            "SKYDOST_STATUS_TIMEOUT_SECS",
            lookup("SKYDOST_STATUS_TIMEOUT_SECS"),
            DEFAULT_STATUS_TIMEOUT,
        );
        let voice_command = lookup("SKYDOST_VOICE_COMMAND").filter(|cmd| !cmd.trim().is_empty());
        let seed_welcome = parse_or("SKYDOST_SEED_WELCOME", lookup("SKYDOST_SEED_WELCOME"), true);
        let mode = parse_or("SKYDOST_MODE", lookup("SKYDOST_MODE"), Mode::General);

        Self {
            api_base_url,
            request_timeout,
            status_timeout,
            voice_command,
            seed_welcome,
            mode,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            default
        }),
    }
}

/// Whole seconds, at least one. A zero timeout would fail every
/// request before it is sent.
fn timeout_or(key: &str, value: Option<String>, default: Duration) -> Duration {
    let Some(fallback) = NonZeroU64::new(default.as_secs()) else {
        return default;
    };
    Duration::from_secs(parse_or(key, value, fallback).get())
}
