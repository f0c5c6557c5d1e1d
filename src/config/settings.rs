use super::ConfigError;
use crate::shared::Network;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Slippage above this is rejected regardless of configuration.
pub const HARD_MAX_SLIPPAGE_BPS: u32 = 5_000;

pub const QUOTE_API_BASE_ENV: &str = "CHAINFLOW_QUOTE_API_BASE";

const DEFAULT_QUOTE_API_BASE: &str = "https://1click.chaindefuser.com/v0";

fn default_network() -> Network {
    Network::Testnet
}

fn default_native_asset() -> String {
    "NEAR".to_string()
}

fn default_slippage_bps() -> u32 {
    50
}

fn default_max_slippage_bps() -> u32 {
    1_000
}

fn default_fan_out_workers() -> usize {
    4
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_poll_timeout_ms() -> u64 {
    120_000
}

fn default_quote_api_base_url() -> String {
    DEFAULT_QUOTE_API_BASE.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkflowSettings {
    #[serde(default = "default_network")]
    pub default_network: Network,
    #[serde(default = "default_native_asset")]
    pub native_asset: String,
    #[serde(default = "default_slippage_bps")]
    pub default_slippage_bps: u32,
    #[serde(default = "default_max_slippage_bps")]
    pub max_slippage_bps: u32,
    #[serde(default = "default_fan_out_workers")]
    pub fan_out_workers: usize,
    #[serde(default)]
    pub status_poll: StatusPollSettings,
    #[serde(default)]
    pub quote_api: QuoteApiSettings,
    #[serde(default)]
    pub event_log_path: Option<PathBuf>,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            default_network: default_network(),
            native_asset: default_native_asset(),
            default_slippage_bps: default_slippage_bps(),
            max_slippage_bps: default_max_slippage_bps(),
            fan_out_workers: default_fan_out_workers(),
            status_poll: StatusPollSettings::default(),
            quote_api: QuoteApiSettings::default(),
            event_log_path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct StatusPollSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_poll_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for StatusPollSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            timeout_ms: default_poll_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct QuoteApiSettings {
    #[serde(default = "default_quote_api_base_url")]
    pub base_url: String,
}

impl Default for QuoteApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_quote_api_base_url(),
        }
    }
}

impl QuoteApiSettings {
    /// `CHAINFLOW_QUOTE_API_BASE` wins over the configured value when non-blank.
    pub fn resolved_base_url(&self) -> String {
        std::env::var(QUOTE_API_BASE_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| self.base_url.clone())
    }
}

impl WorkflowSettings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let settings: Self = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.native_asset.trim().is_empty() {
            return Err(ConfigError::Settings(
                "`native_asset` must be non-empty".to_string(),
            ));
        }
        if self.max_slippage_bps == 0 || self.max_slippage_bps > HARD_MAX_SLIPPAGE_BPS {
            return Err(ConfigError::Settings(format!(
                "`max_slippage_bps` must be between 1 and {HARD_MAX_SLIPPAGE_BPS}"
            )));
        }
        if self.default_slippage_bps > self.effective_max_slippage_bps() {
            return Err(ConfigError::Settings(format!(
                "`default_slippage_bps` ({}) exceeds the slippage ceiling ({})",
                self.default_slippage_bps,
                self.effective_max_slippage_bps()
            )));
        }
        if self.fan_out_workers == 0 {
            return Err(ConfigError::Settings(
                "`fan_out_workers` must be >= 1".to_string(),
            ));
        }
        if self.status_poll.interval_ms == 0 {
            return Err(ConfigError::Settings(
                "`status_poll.interval_ms` must be >= 1".to_string(),
            ));
        }
        if self.status_poll.timeout_ms < self.status_poll.interval_ms {
            return Err(ConfigError::Settings(
                "`status_poll.timeout_ms` must be >= `status_poll.interval_ms`".to_string(),
            ));
        }
        if self.quote_api.base_url.trim().is_empty() {
            return Err(ConfigError::Settings(
                "`quote_api.base_url` must be non-empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn effective_max_slippage_bps(&self) -> u32 {
        self.max_slippage_bps.min(HARD_MAX_SLIPPAGE_BPS)
    }
}
