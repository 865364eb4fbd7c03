// Configuration module

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Comma-separated list of allowed CORS origins
    pub frontend_url: String,
    pub environment: Environment,
    pub check_mode: CheckMode,
    /// Upper bound for a single check unit before it is degraded to warnings
    pub check_timeout_secs: u64,
    /// Per-request timeout for live checks
    pub request_timeout_secs: u64,
    /// Let live checks reach loopback and private networks
    pub allow_private_targets: bool,
    /// Artificial delay per simulated check, so progress is observable
    pub simulated_latency_ms: u64,
    /// Fixed RNG seed for reproducible simulated outcomes
    #[serde(default)]
    pub simulation_seed: Option<u64>,
    pub log_format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// How check units 2-4 obtain their evidence
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    /// Outcomes drawn from a pseudo-random generator; no network traffic
    Simulated,
    /// Outcomes from real HTTP responses
    Live,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Config::default();

        let config = config::Config::builder()
            .set_default("server_host", defaults.server_host)?
            .set_default("server_port", i64::from(defaults.server_port))?
            .set_default("frontend_url", defaults.frontend_url)?
            .set_default("environment", "development")?
            .set_default("check_mode", "simulated")?
            .set_default("check_timeout_secs", defaults.check_timeout_secs as i64)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("allow_private_targets", defaults.allow_private_targets)?
            .set_default("simulated_latency_ms", defaults.simulated_latency_ms as i64)?
            .set_default("log_format", "pretty")?
            .add_source(config::Environment::default().try_parsing(true))
            .build()?;

        config.try_deserialize()
    }

    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }

    /// Trimmed, non-empty CORS origins
    pub fn cors_origins(&self) -> Vec<String> {
        self.frontend_url
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            frontend_url: "http://localhost:3000".to_string(),
            environment: Environment::Development,
            check_mode: CheckMode::Simulated,
            check_timeout_secs: 10,
            request_timeout_secs: 8,
            allow_private_targets: false,
            simulated_latency_ms: 300,
            simulation_seed: None,
            log_format: LogFormat::Pretty,
        }
    }
}
