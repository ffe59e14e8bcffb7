//! Settings loading for the trader and the simulated trading floor
//!
//! Supports JSON settings files. Every field has a default, so an empty
//! object (or no file at all) gives a working setup.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use trader_core::CompanyCatalog;
use trader_gateway::ServiceNames;

/// Settings loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse settings: {0}")]
    Parse(String),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Root settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub trader: TraderSettings,

    #[serde(default)]
    pub floor: FloorSettings,
}

impl Settings {
    /// Load settings from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.trader.validate()?;
        self.floor.validate()
    }
}

/// Per-trader settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraderSettings {
    /// Registry name of the portfolio ledger
    #[serde(default = "default_portfolio_service")]
    pub portfolio_service: String,

    /// Registry name of the market-data stream
    #[serde(default = "default_market_data_service")]
    pub market_data_service: String,

    /// Upper bound on one strategy invocation
    #[serde(default = "default_callback_timeout_ms")]
    pub callback_timeout_ms: u64,

    /// Largest share count a trader may pick
    #[serde(default = "default_max_shares")]
    pub max_shares: u32,

    /// Companies a trader may pick from
    #[serde(default)]
    pub companies: CompanyCatalog,
}

fn default_portfolio_service() -> String {
    ServiceNames::PORTFOLIO.to_string()
}

fn default_market_data_service() -> String {
    ServiceNames::MARKET_DATA.to_string()
}

fn default_callback_timeout_ms() -> u64 {
    1000
}

fn default_max_shares() -> u32 {
    7
}

impl Default for TraderSettings {
    fn default() -> Self {
        Self {
            portfolio_service: default_portfolio_service(),
            market_data_service: default_market_data_service(),
            callback_timeout_ms: default_callback_timeout_ms(),
            max_shares: default_max_shares(),
            companies: CompanyCatalog::default(),
        }
    }
}

impl TraderSettings {
    pub fn callback_timeout(&self) -> Duration {
        Duration::from_millis(self.callback_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.portfolio_service.trim().is_empty() || self.market_data_service.trim().is_empty() {
            return Err(ConfigError::Invalid("service names must not be empty".to_string()));
        }
        if self.callback_timeout_ms == 0 {
            return Err(ConfigError::Invalid("callback_timeout_ms must be positive".to_string()));
        }
        if self.max_shares == 0 {
            return Err(ConfigError::Invalid("max_shares must be positive".to_string()));
        }
        if self.companies.is_empty() {
            return Err(ConfigError::Invalid("companies must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Simulated trading floor (registry, ledger, feed) used by the demo binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorSettings {
    /// Number of traders to start
    #[serde(default = "default_traders")]
    pub traders: usize,

    /// Starting cash of the shared ledger account
    #[serde(default = "default_initial_cash")]
    pub initial_cash: Decimal,

    /// Starting price of every company
    #[serde(default = "default_initial_price")]
    pub initial_price: Decimal,

    /// Random-walk step size (fraction of price per tick)
    #[serde(default = "default_volatility")]
    pub volatility: Decimal,

    /// Feed tick interval
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// How long the demo runs
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,

    /// Market-data channel capacity
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_traders() -> usize {
    3
}

fn default_initial_cash() -> Decimal {
    dec!(10000)
}

fn default_initial_price() -> Decimal {
    dec!(100)
}

fn default_volatility() -> Decimal {
    dec!(0.01)
}

fn default_tick_interval_ms() -> u64 {
    200
}

fn default_duration_ms() -> u64 {
    5000
}

fn default_channel_capacity() -> usize {
    1000
}

impl Default for FloorSettings {
    fn default() -> Self {
        Self {
            traders: default_traders(),
            initial_cash: default_initial_cash(),
            initial_price: default_initial_price(),
            volatility: default_volatility(),
            tick_interval_ms: default_tick_interval_ms(),
            duration_ms: default_duration_ms(),
            channel_capacity: default_channel_capacity(),
            seed: None,
        }
    }
}

impl FloorSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_price <= Decimal::ZERO {
            return Err(ConfigError::Invalid("initial_price must be positive".to_string()));
        }
        if self.volatility < Decimal::ZERO || self.volatility >= Decimal::ONE {
            return Err(ConfigError::Invalid("volatility must be in [0, 1)".to_string()));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid("channel_capacity must be positive".to_string()));
        }
        Ok(())
    }
}
