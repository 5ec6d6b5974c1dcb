use action::EstimateOptions;
use config::ConfigError;
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Default config file, read when present.
pub const DEFAULT_CONFIG_PATH: &str = "recovery.toml";

/// Default base of the ticket explorer link.
pub const DEFAULT_EXPLORER_URL: &str = "https://retryable-dashboard.arbitrum.io/tx";

/// Top-level recovery configuration.
///
/// Every section is optional, an empty file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Explorer the success report links to
    pub explorer_url: String,

    /// Headroom of the gas estimate
    pub estimation: EstimateOptions,

    /// Polling of ticket status on L2
    pub tracking: TrackingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            estimation: EstimateOptions::default(),
            tracking: TrackingConfig::default(),
        }
    }
}

/// How long to follow a ticket on L2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// First polling delay in seconds, doubled on every attempt
    pub poll_interval_secs: u64,
    /// Attempts before giving up
    pub max_attempts: usize,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 2,
            max_attempts: 30,
        }
    }
}

impl TrackingConfig {
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;

        Ok(config)
    }

    /// Load `path` if given, else the default file if it exists, else defaults.
    pub fn load(path: Option<&Path>) -> eyre::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }
}

/// API key of the L1 RPC provider; the tool cannot start without it.
pub fn require_api_key(key: Option<&str>) -> Result<String, ConfigError> {
    key.map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::MissingApiKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.explorer_url, DEFAULT_EXPLORER_URL);
    }

    #[test]
    fn test_full_file() {
        let config: Config = toml::from_str(
            r#"
            explorer_url = "https://example.org/tx"

            [estimation]
            gas_price_percent_increase = 50

            [tracking]
            poll_interval_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.explorer_url, "https://example.org/tx");
        assert_eq!(config.estimation.gas_price_percent_increase, 50);
        assert_eq!(config.estimation.submission_fee_percent_increase, 300);
        assert_eq!(config.tracking.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.tracking.max_attempts, 30);
    }

    #[test]
    fn test_require_api_key() {
        assert_eq!(require_api_key(Some(" abc ")), Ok("abc".to_string()));
        assert_eq!(require_api_key(Some("")), Err(ConfigError::MissingApiKey));
        assert_eq!(require_api_key(None), Err(ConfigError::MissingApiKey));
    }
}
