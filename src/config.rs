//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default upper bound on keys resident in memory
pub const DEFAULT_MAX_SIZE: usize = 100_000;
/// Default reconciler wake-up period in seconds
pub const DEFAULT_SLEEP_INTERVAL_SECS: u64 = 30;
/// Default eviction buffer size above which the reconciler flushes
pub const DEFAULT_PERSIST_THRESHOLD: usize = 1000;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of keys resident in the hot cache map
    pub max_size: usize,
    /// File holding the persisted key -> values mapping
    pub persistence_file_path: PathBuf,
    /// Reconciler sleep between threshold checks, in seconds
    pub sleep_interval_seconds: u64,
    /// Eviction buffer size that triggers a flush to disk
    pub persist_threshold: usize,
    /// Interface both listeners bind to
    pub host: String,
    /// Line protocol TCP port
    pub tcp_port: u16,
    /// HTTP API port
    pub http_port: u16,
    /// Load persisted entries into memory at startup
    pub warm_start: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_SIZE` - Maximum resident keys (default: 100000)
    /// - `PERSISTENCE_FILE_PATH` - Persistence file (default: data.json)
    /// - `SLEEP_INTERVAL_SECONDS` - Reconciler period (default: 30)
    /// - `PERSIST_THRESHOLD` - Flush threshold (default: 1000)
    /// - `HOST` - Bind address (default: 127.0.0.1)
    /// - `TCP_PORT` - Line protocol port (default: 9999)
    /// - `HTTP_PORT` - HTTP API port (default: 3000)
    /// - `WARM_START` - Preload persisted data (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable source.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            max_size: parse_var(&lookup, "MAX_SIZE")
                .filter(|size: &usize| *size > 0)
                .unwrap_or(defaults.max_size),
            persistence_file_path: lookup("PERSISTENCE_FILE_PATH")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.persistence_file_path),
            sleep_interval_seconds: parse_var(&lookup, "SLEEP_INTERVAL_SECONDS")
                .filter(|secs: &u64| *secs > 0)
                .unwrap_or(defaults.sleep_interval_seconds),
            persist_threshold: parse_var(&lookup, "PERSIST_THRESHOLD")
                .unwrap_or(defaults.persist_threshold),
            host: lookup("HOST")
                .filter(|host| !host.trim().is_empty())
                .unwrap_or(defaults.host),
            tcp_port: parse_var(&lookup, "TCP_PORT").unwrap_or(defaults.tcp_port),
            http_port: parse_var(&lookup, "HTTP_PORT").unwrap_or(defaults.http_port),
            warm_start: lookup("WARM_START")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.warm_start),
        }
    }

    /// Reconciler sleep interval as a Duration.
    pub fn sleep_interval(&self) -> Duration {
        Duration::from_secs(self.sleep_interval_seconds)
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(name).and_then(|v| v.trim().parse().ok())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "on" => Some(true),
        "0" | "no" | "off" => Some(false),
        other => bool::from_str(other).ok(),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            persistence_file_path: PathBuf::from("data.json"),
            sleep_interval_seconds: DEFAULT_SLEEP_INTERVAL_SECS,
            persist_threshold: DEFAULT_PERSIST_THRESHOLD,
            host: "127.0.0.1".to_string(),
            tcp_port: 9999,
            http_port: 3000,
            warm_start: true,
        }
    }
}
