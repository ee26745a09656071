//! Configuration for a marketplace instance.

use serde::{Deserialize, Serialize};

use crate::{MarketError, Result, constants};

/// Per-marketplace configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Minimum seconds between listing creation and listing expiry.
    pub min_listing_window_secs: u64,
    /// Decimals of the payment token (for display and amount parsing).
    pub token_decimals: u32,
    /// Symbol of the payment token.
    pub token_symbol: String,
    /// Committed settlement journal entries kept before the oldest is evicted.
    pub journal_capacity: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            min_listing_window_secs: constants::MIN_LISTING_WINDOW_SECS,
            token_decimals: constants::DEFAULT_TOKEN_DECIMALS,
            token_symbol: constants::DEFAULT_TOKEN_SYMBOL.to_string(),
            journal_capacity: constants::DEFAULT_JOURNAL_CAPACITY,
        }
    }
}

impl MarketConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| MarketError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.min_listing_window_secs == 0 {
            return Err(MarketError::Configuration(
                "min_listing_window_secs must be > 0".into(),
            ));
        }
        if self.token_decimals > constants::MAX_TOKEN_DECIMALS {
            return Err(MarketError::Configuration(format!(
                "token_decimals {} exceeds {}",
                self.token_decimals,
                constants::MAX_TOKEN_DECIMALS
            )));
        }
        if self.journal_capacity == 0 {
            return Err(MarketError::Configuration(
                "journal_capacity must be > 0".into(),
            ));
        }
        Ok(())
    }
}
