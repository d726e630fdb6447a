//! # Till Configuration
//!
//! Settings for one till: where the store files live and the pricing and
//! loyalty rules applied at checkout.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TALLY_DATA_DIR=/srv/till                                           │
//! │     TALLY_VAT_RATE=7.5                                                 │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pos/till.toml (Linux)                                    │
//! │     ~/Library/Application Support/com.tally.pos/till.toml (macOS)      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     ./data, 5% VAT, 50.00 off above 500.00                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # till.toml
//! data_dir = "/srv/till"
//! store_name = "Corner Mart"
//! low_stock_threshold = 5
//!
//! [pricing]
//! vat_rate = 500               # basis points
//! discount_threshold = 50000   # cents
//! discount_amount = 5000       # cents
//!
//! [loyalty]
//! accrual_bps = 100
//! point_value_cents = 1
//! max_discount_bps = 1000
//! burn_multiplier = 100
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tally_core::{LoyaltyPolicy, PricingPolicy, TaxRate, DEFAULT_LOW_STOCK_THRESHOLD};
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};

const CONFIG_FILE: &str = "till.toml";

/// Complete till configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TillConfig {
    /// Directory holding catalog.txt, customers.txt and sales.txt.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Printed at the top of receipts.
    #[serde(default = "default_store_name")]
    pub store_name: String,

    /// Threshold for products that do not set their own.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,

    #[serde(default)]
    pub pricing: PricingPolicy,

    #[serde(default)]
    pub loyalty: LoyaltyPolicy,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_store_name() -> String {
    "Tally Supermarket".to_string()
}

fn default_low_stock_threshold() -> i64 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

impl Default for TillConfig {
    fn default() -> Self {
        TillConfig {
            data_dir: default_data_dir(),
            store_name: default_store_name(),
            low_stock_threshold: default_low_stock_threshold(),
            pricing: PricingPolicy::default(),
            loyalty: LoyaltyPolicy::default(),
        }
    }
}

impl TillConfig {
    /// Defaults pointed at a specific store directory. Handy for tests.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        TillConfig {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (till.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> EngineResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading till config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| EngineError::ConfigLoadFailed(format!("{}: {}", path.display(), e)))?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a `till.toml` document. Missing keys take their defaults.
    pub fn from_toml(contents: &str) -> EngineResult<Self> {
        toml::from_str(contents).map_err(|e| EngineError::ConfigLoadFailed(e.to_string()))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> EngineResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(EngineError::InvalidConfig("data_dir must not be empty".into()));
        }

        if self.store_name.trim().is_empty() {
            return Err(EngineError::InvalidConfig("store_name must not be empty".into()));
        }

        if self.low_stock_threshold < 0 {
            return Err(EngineError::InvalidConfig(
                "low_stock_threshold must not be negative".into(),
            ));
        }

        self.pricing
            .validate()
            .map_err(|e| EngineError::InvalidConfig(format!("pricing: {}", e)))?;
        self.loyalty
            .validate()
            .map_err(|e| EngineError::InvalidConfig(format!("loyalty: {}", e)))?;

        Ok(())
    }

    /// Applies `TALLY_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("TALLY_DATA_DIR") {
            debug!(data_dir = %dir, "Overriding data directory from environment");
            self.data_dir = PathBuf::from(dir);
        }

        if let Some(name) = lookup("TALLY_STORE_NAME") {
            self.store_name = name;
        }

        // Percentage, e.g. "7.5" for 7.5%
        if let Some(rate) = lookup("TALLY_VAT_RATE") {
            match rate.trim().parse::<f64>() {
                Ok(pct) if (0.0..=100.0).contains(&pct) => {
                    debug!(vat = pct, "Overriding VAT rate from environment");
                    self.pricing.vat_rate = TaxRate::from_percentage(pct);
                }
                _ => warn!(value = %rate, "Ignoring unparseable TALLY_VAT_RATE"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tally", "pos")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}
