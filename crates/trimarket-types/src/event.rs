//! Marketplace notifications.
//!
//! Every successful listing or purchase appends one [`MarketEvent`] to an
//! append-only log consumed by external indexers.

use serde::{Deserialize, Serialize};

use crate::{AccountId, AssetId, Timestamp};

/// An observable marketplace notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum MarketEvent {
    /// A listing was created (or replaced a stale one).
    TokenListed { seller: AccountId, asset_id: AssetId },
    /// A purchase settled: payment and asset both moved.
    TokenBought { buyer: AccountId, asset_id: AssetId },
}

impl MarketEvent {
    /// The asset this notification is about.
    #[must_use]
    pub fn asset_id(&self) -> AssetId {
        match self {
            Self::TokenListed { asset_id, .. } | Self::TokenBought { asset_id, .. } => *asset_id,
        }
    }

    /// Stable event name, as indexers see it.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::TokenListed { .. } => "TokenListed",
            Self::TokenBought { .. } => "TokenBought",
        }
    }
}

impl std::fmt::Display for MarketEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenListed { seller, asset_id } => {
                write!(f, "TokenListed({seller}, {})", asset_id.0)
            }
            Self::TokenBought { buyer, asset_id } => {
                write!(f, "TokenBought({buyer}, {})", asset_id.0)
            }
        }
    }
}

/// A notification as stored in the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 0 with no gaps.
    pub sequence: u64,
    /// Timestamp of the operation that emitted the event.
    pub emitted_at: Timestamp,
    #[serde(flatten)]
    pub event: MarketEvent,
}
