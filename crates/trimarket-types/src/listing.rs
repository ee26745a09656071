//! The listing model.
//!
//! A [`Listing`] is a seller's declared offer to sell one asset at a fixed
//! price until an expiry. It is a declaration of intent, not escrow: custody
//! stays with the seller until a purchase settles.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, AssetId, Timestamp};

/// A fixed-price offer for a single asset.
///
/// Ownership and approval are deliberately not cached here; they are
/// re-checked against the asset ledger whenever the listing is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// The asset on offer.
    pub asset_id: AssetId,
    /// The account that created the listing and receives payment.
    pub seller: AccountId,
    /// Price in smallest fungible units.
    pub price: Amount,
    /// Purchases must happen strictly before this instant.
    pub expiry: Timestamp,
    /// When the listing was created.
    pub listed_at: Timestamp,
}

impl Listing {
    /// Returns `true` if `now` is at or past the expiry.
    #[must_use]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expiry
    }

    /// Seconds of validity left at `now` (zero once expired).
    #[must_use]
    pub fn remaining_secs(&self, now: Timestamp) -> u64 {
        self.expiry.0.saturating_sub(now.0)
    }
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Listing[{}] seller={} price={} expiry={}",
            self.asset_id, self.seller, self.price, self.expiry,
        )
    }
}

/// Fixture listings for tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Listing {
    #[must_use]
    pub fn dummy(asset_id: AssetId, seller: AccountId, price: Amount, expiry: Timestamp) -> Self {
        Self {
            asset_id,
            seller,
            price,
            expiry,
            listed_at: Timestamp(0),
        }
    }
}
