//! Application configuration
//!
//! Centralized configuration management with environment variable
//! support and sensible defaults. One config describes one DSM device;
//! the monitor does not fan out across devices.

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote DSM device and credentials
    pub dsm: DsmConfig,
    /// Polling configuration
    pub poll: PollConfig,
}

/// Connection settings for one DSM device
#[derive(Debug, Clone)]
pub struct DsmConfig {
    /// Hostname or IP address of the device
    pub host: String,
    /// Web API port
    pub port: u16,
    /// Use HTTPS rather than HTTP
    pub use_ssl: bool,
    /// Verify the TLS certificate (self-signed DSM installs disable this)
    pub verify_ssl: bool,
    /// Account name used for login
    pub username: String,
    /// Account password used for login
    pub password: String,
    /// Send run-task requests through the compound-request envelope
    /// instead of the direct event-scheduler call
    pub compound_run_task: bool,
}

/// Polling configuration
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Seconds between refresh cycles
    pub interval_secs: u64,
}

/// Default web API port (HTTPS)
const DEFAULT_PORT: u16 = 5001;
/// Default seconds between refresh cycles
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

impl Config {
    /// Load configuration from environment variables with defaults
    ///
    /// `DSM_HOST`, `DSM_USERNAME` and `DSM_PASSWORD` are required; the
    /// rest default to port 5001, TLS on with verification, direct
    /// run-task calls, and a 60 second poll interval.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            dsm: DsmConfig {
                host: require_env("DSM_HOST")?,
                port: env::var("DSM_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(DEFAULT_PORT),
                use_ssl: env_flag("DSM_USE_SSL", true),
                verify_ssl: env_flag("DSM_VERIFY_SSL", true),
                username: require_env("DSM_USERNAME")?,
                password: require_env("DSM_PASSWORD")?,
                compound_run_task: env_flag("DSM_COMPOUND_RUN_TASK", false),
            },
            poll: PollConfig {
                interval_secs: env::var("DSM_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            },
        })
    }
}

impl DsmConfig {
    /// Full URL of the device's web API endpoint
    pub fn base_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!(
            "{}://{}:{}{}",
            scheme,
            self.host,
            self.port,
            crate::dsm::constants::WEBAPI_ENDPOINT
        )
    }
}

fn require_env(name: &str) -> anyhow::Result<String> {
    env::var(name).map_err(|_| anyhow::anyhow!("missing required environment variable {name}"))
}

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}
