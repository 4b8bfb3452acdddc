//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).
//!
//! | Variable                  | Default        |
//! |---------------------------|----------------|
//! | `LISTEN_ADDR`             | `0.0.0.0:3000` |
//! | `OUTBOUND_QUEUE_CAPACITY` | `256`          |
//! | `MAX_CONNECTIONS`         | `10000`        |
//! | `LOG_FORMAT`              | `pretty`       |

use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::Context;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format `{other}`")),
        }
    }
}

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Capacity of each connection's outbound queue. Events for a
    /// recipient whose queue is full are dropped.
    pub outbound_queue_capacity: usize,

    /// Maximum number of simultaneously live connections.
    pub max_connections: usize,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            outbound_queue_capacity: 256,
            max_connections: 10_000,
            log_format: LogFormat::Pretty,
        }
    }
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set or unparsable.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, which returns the raw value
    /// of a variable if set.
    ///
    /// Queue capacity and connection limit are clamped to at least 1.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let listen_addr = match lookup("LISTEN_ADDR") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("invalid LISTEN_ADDR `{raw}`"))?,
            None => defaults.listen_addr,
        };

        Ok(Self {
            listen_addr,
            outbound_queue_capacity: parse_var(
                &lookup,
                "OUTBOUND_QUEUE_CAPACITY",
                defaults.outbound_queue_capacity,
            )
            .max(1),
            max_connections: parse_var(&lookup, "MAX_CONNECTIONS", defaults.max_connections)
                .max(1),
            log_format: parse_var(&lookup, "LOG_FORMAT", defaults.log_format),
        })
    }
}

/// Parses variable `key` as `T`, returning `default` on missing or invalid
/// values.
fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn log_format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn defaults_are_sane() {
        let config = RelayConfig::default();
        assert_eq!(config.listen_addr.port(), 3000);
        assert_eq!(config.outbound_queue_capacity, 256);
        assert_eq!(config.max_connections, 10_000);
    }

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn missing_variables_fall_back() {
        let Ok(config) = RelayConfig::from_lookup(lookup_from(&[])) else {
            panic!("defaults should load");
        };
        assert_eq!(config.max_connections, 10_000);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn variables_override_defaults() {
        let Ok(config) = RelayConfig::from_lookup(lookup_from(&[
            ("LISTEN_ADDR", "127.0.0.1:9000"),
            ("MAX_CONNECTIONS", "50"),
            ("LOG_FORMAT", "json"),
            ("OUTBOUND_QUEUE_CAPACITY", "not-a-number"),
        ])) else {
            panic!("config should load");
        };
        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.max_connections, 50);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.outbound_queue_capacity, 256);
    }

    #[test]
    fn zero_limits_are_clamped() {
        let Ok(config) = RelayConfig::from_lookup(lookup_from(&[
            ("MAX_CONNECTIONS", "0"),
            ("OUTBOUND_QUEUE_CAPACITY", "0"),
        ])) else {
            panic!("config should load");
        };
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.outbound_queue_capacity, 1);
    }

    #[test]
    fn bad_listen_addr_is_rejected() {
        let result = RelayConfig::from_lookup(lookup_from(&[("LISTEN_ADDR", "nowhere")]));
        let Err(err) = result else {
            panic!("expected an error");
        };
        assert!(err.to_string().contains("LISTEN_ADDR"));
    }
}
