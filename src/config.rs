//! Configuration module for netdiag.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;

use crate::platform::{Platform, ProbeSettings};

/// Configuration error types.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port for the web server (default: 8080)
    pub http_port: u16,
    /// Upper bound on a single probe's run time (default: 30s)
    pub probe_timeout: Duration,
    /// Diagnostic runs allowed in flight at once (default: 4)
    pub max_concurrent_runs: usize,
    /// Whose probe tools and output grammar to use (default: build target)
    pub platform: Platform,
    pub probe: ProbeSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            probe_timeout: Duration::from_secs(30),
            max_concurrent_runs: 4,
            platform: Platform::detect(),
            probe: ProbeSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `NETDIAG_HTTP_PORT`: HTTP port (default: 8080)
    /// - `NETDIAG_PROBE_TIMEOUT_SECS`: per-probe timeout in seconds (default: 30)
    /// - `NETDIAG_MAX_CONCURRENT_RUNS`: concurrent diagnostic runs (default: 4)
    /// - `NETDIAG_PING_COUNT`: echo requests per ping (default: 4)
    /// - `NETDIAG_MAX_HOPS`: traceroute hop limit (default: 30)
    /// - `NETDIAG_PLATFORM`: `linux`, `macos` or `windows` (default: detected)
    ///
    /// Invalid values are logged and ignored.
    pub fn load() -> Self {
        let (cfg, errors) = Self::from_lookup(|key| env::var(key).ok());
        for e in errors {
            tracing::warn!("Ignoring configuration: {}", e);
        }
        cfg
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// Returns the configuration together with every value that was rejected.
    pub fn from_lookup<F>(lookup: F) -> (Self, Vec<ConfigError>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let mut errors = Vec::new();

        if let Some(port) = parse_var::<u16, _>(&lookup, "NETDIAG_HTTP_PORT", &mut errors) {
            cfg.http_port = port;
        }

        let timeout = parse_var::<u64, _>(&lookup, "NETDIAG_PROBE_TIMEOUT_SECS", &mut errors);
        if let Some(secs) = timeout {
            if secs == 0 {
                errors.push(invalid("NETDIAG_PROBE_TIMEOUT_SECS", "0", "must be at least 1"));
            } else {
                cfg.probe_timeout = Duration::from_secs(secs);
            }
        }

        let runs = parse_var::<usize, _>(&lookup, "NETDIAG_MAX_CONCURRENT_RUNS", &mut errors);
        if let Some(runs) = runs {
            if runs == 0 {
                errors.push(invalid("NETDIAG_MAX_CONCURRENT_RUNS", "0", "must be at least 1"));
            } else if runs > Semaphore::MAX_PERMITS {
                errors.push(invalid(
                    "NETDIAG_MAX_CONCURRENT_RUNS",
                    &runs.to_string(),
                    &format!("must be at most {}", Semaphore::MAX_PERMITS),
                ));
            } else {
                cfg.max_concurrent_runs = runs;
            }
        }

        if let Some(count) = parse_var::<u32, _>(&lookup, "NETDIAG_PING_COUNT", &mut errors) {
            if count == 0 {
                errors.push(invalid("NETDIAG_PING_COUNT", "0", "must be at least 1"));
            } else {
                cfg.probe.ping_count = count;
            }
        }

        if let Some(hops) = parse_var::<u32, _>(&lookup, "NETDIAG_MAX_HOPS", &mut errors) {
            if hops == 0 {
                errors.push(invalid("NETDIAG_MAX_HOPS", "0", "must be at least 1"));
            } else {
                cfg.probe.max_hops = hops;
            }
        }

        if let Some(platform) = parse_var::<Platform, _>(&lookup, "NETDIAG_PLATFORM", &mut errors) {
            cfg.platform = platform;
        }

        (cfg, errors)
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str, errors: &mut Vec<ConfigError>) -> Option<T>
where
    T: FromStr,
    T::Err: ToString,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(e) => {
            errors.push(ConfigError::InvalidValue {
                key,
                value: raw,
                reason: e.to_string(),
            });
            None
        }
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.http_port, 8080);
        assert_eq!(cfg.probe_timeout, Duration::from_secs(30));
        assert_eq!(cfg.max_concurrent_runs, 4);
        assert_eq!(cfg.probe.ping_count, 4);
        assert_eq!(cfg.probe.max_hops, 30);
        assert_eq!(cfg.platform, Platform::detect());
    }

    #[test]
    fn test_overrides() {
        let (cfg, errors) = ServerConfig::from_lookup(lookup(&[
            ("NETDIAG_HTTP_PORT", "3000"),
            ("NETDIAG_PROBE_TIMEOUT_SECS", "10"),
            ("NETDIAG_MAX_CONCURRENT_RUNS", "2"),
            ("NETDIAG_PING_COUNT", "8"),
            ("NETDIAG_MAX_HOPS", "15"),
            ("NETDIAG_PLATFORM", "windows"),
        ]));
        assert!(errors.is_empty());
        assert_eq!(cfg.http_port, 3000);
        assert_eq!(cfg.probe_timeout, Duration::from_secs(10));
        assert_eq!(cfg.max_concurrent_runs, 2);
        assert_eq!(cfg.probe.ping_count, 8);
        assert_eq!(cfg.probe.max_hops, 15);
        assert_eq!(cfg.platform, Platform::Windows);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let (cfg, errors) = ServerConfig::from_lookup(lookup(&[
            ("NETDIAG_HTTP_PORT", "not-a-port"),
            ("NETDIAG_MAX_CONCURRENT_RUNS", "0"),
            ("NETDIAG_PLATFORM", "plan9"),
        ]));
        assert_eq!(errors.len(), 3);
        assert_eq!(cfg.http_port, 8080);
        assert_eq!(cfg.max_concurrent_runs, 4);
        assert_eq!(cfg.platform, Platform::detect());
        assert!(errors[0].to_string().contains("NETDIAG_HTTP_PORT"));
    }

    #[test]
    fn test_oversized_run_limit_is_rejected() {
        let huge = usize::MAX.to_string();
        let (cfg, errors) =
            ServerConfig::from_lookup(lookup(&[("NETDIAG_MAX_CONCURRENT_RUNS", huge.as_str())]));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("must be at most"));
        assert_eq!(cfg.max_concurrent_runs, 4);

        let max = Semaphore::MAX_PERMITS.to_string();
        let (cfg, errors) =
            ServerConfig::from_lookup(lookup(&[("NETDIAG_MAX_CONCURRENT_RUNS", max.as_str())]));
        assert!(errors.is_empty());
        assert_eq!(cfg.max_concurrent_runs, Semaphore::MAX_PERMITS);
    }
}
