//! Listing validator — hard gate for listing creation and purchase.
//!
//! Every check reads live state from the custody ledgers at call time.
//! Nothing about ownership or approval is cached on the listing, so a seller
//! who transfers the asset away, or withdraws the marketplace's approval,
//! makes their listing behave as if it did not exist.
//!
//! ## Check order
//!
//! Listing: custody, then expiry window.
//! Purchase: existence, custody, expiry, allowance. First failure wins.

use trimarket_custody::{AssetLedger, FungibleLedger};
use trimarket_types::{
    AccountId, AssetId, Listing, MarketConfig, MarketError, Result, Timestamp,
};

use crate::registry::ListingRegistry;

/// Pure predicate logic over the registry and the custody ledgers.
#[derive(Debug, Clone)]
pub struct ListingValidator {
    /// The marketplace's own account: the spender of allowances and approvals.
    marketplace: AccountId,
    /// Minimum seconds between listing creation and expiry.
    min_window_secs: u64,
}

impl ListingValidator {
    #[must_use]
    pub fn new(marketplace: AccountId, min_window_secs: u64) -> Self {
        Self {
            marketplace,
            min_window_secs,
        }
    }

    #[must_use]
    pub fn from_config(marketplace: AccountId, config: &MarketConfig) -> Self {
        Self::new(marketplace, config.min_listing_window_secs)
    }

    #[must_use]
    pub fn marketplace(&self) -> AccountId {
        self.marketplace
    }

    /// Earliest expiry a listing created at `now` may carry.
    #[must_use]
    pub fn earliest_expiry(&self, now: Timestamp) -> Timestamp {
        now.plus_secs(self.min_window_secs)
    }

    /// `seller` currently owns `asset_id` and the marketplace may move it.
    pub fn custody_holds<N>(&self, assets: &N, seller: AccountId, asset_id: AssetId) -> bool
    where
        N: AssetLedger + ?Sized,
    {
        matches!(assets.owner_of(asset_id), Ok(owner) if owner == seller)
            && assets.is_approved_or_owner(self.marketplace, asset_id)
    }

    /// Decide whether `caller` may list `asset_id` with `expiry` at `now`.
    ///
    /// # Errors
    /// - `NotApprovedOrOwned` if the custody condition fails
    /// - `ExpiryTooSoon` if `expiry < now + window` (the boundary itself is accepted)
    pub fn check_listing<N>(
        &self,
        assets: &N,
        caller: AccountId,
        asset_id: AssetId,
        expiry: Timestamp,
        now: Timestamp,
    ) -> Result<()>
    where
        N: AssetLedger + ?Sized,
    {
        if !self.custody_holds(assets, caller, asset_id) {
            tracing::debug!(caller = %caller, asset = %asset_id, "Listing rejected: custody");
            return Err(MarketError::NotApprovedOrOwned(asset_id));
        }

        let earliest = self.earliest_expiry(now);
        if expiry < earliest {
            tracing::debug!(
                caller = %caller,
                asset = %asset_id,
                expiry = %expiry,
                earliest = %earliest,
                "Listing rejected: expiry"
            );
            return Err(MarketError::ExpiryTooSoon { expiry, earliest });
        }

        Ok(())
    }

    /// Decide whether `buyer` may purchase `asset_id` at `now`.
    ///
    /// Returns a copy of the listing that passed every check.
    ///
    /// # Errors
    /// - `NoListingFound` if no entry exists or its seller lost custody
    /// - `ListingExpired` if `now >= expiry`
    /// - `InsufficientAllowance` if the buyer's allowance to the marketplace is below the price
    pub fn check_purchase<F, N>(
        &self,
        registry: &ListingRegistry,
        fungible: &F,
        assets: &N,
        buyer: AccountId,
        asset_id: AssetId,
        now: Timestamp,
    ) -> Result<Listing>
    where
        F: FungibleLedger + ?Sized,
        N: AssetLedger + ?Sized,
    {
        let listing = self.live_entry(registry, assets, asset_id)?;

        if listing.is_expired_at(now) {
            return Err(MarketError::ListingExpired {
                expiry: listing.expiry,
                now,
            });
        }

        let allowed = fungible.allowance(buyer, self.marketplace);
        if allowed < listing.price {
            return Err(MarketError::InsufficientAllowance {
                needed: listing.price,
                allowed,
            });
        }

        tracing::debug!(buyer = %buyer, asset = %asset_id, price = %listing.price, "Purchase admitted");
        Ok(listing.clone())
    }

    /// The registry entry for `asset_id`, if its seller still has custody.
    ///
    /// # Errors
    /// `NoListingFound` if the entry is absent or stale.
    pub fn live_entry<'r, N>(
        &self,
        registry: &'r ListingRegistry,
        assets: &N,
        asset_id: AssetId,
    ) -> Result<&'r Listing>
    where
        N: AssetLedger + ?Sized,
    {
        let listing = registry
            .get(asset_id)
            .ok_or(MarketError::NoListingFound(asset_id))?;

        if !self.custody_holds(assets, listing.seller, asset_id) {
            tracing::debug!(
                seller = %listing.seller,
                asset = %asset_id,
                "Stale listing: seller no longer has custody"
            );
            return Err(MarketError::NoListingFound(asset_id));
        }

        Ok(listing)
    }
}
