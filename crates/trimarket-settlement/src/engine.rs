//! The marketplace engine.
//!
//! `list_token` records a seller's offer. `buy_token` settles a purchase:
//! 1. Re-validate the listing against live custody state
//! 2. Snapshot fungible supply
//! 3. Move `price` buyer → seller (fungible ledger)
//! 4. Move the asset seller → buyer (asset ledger)
//! 5. Remove the listing
//! 6. Verify supply conservation, commit the journal, emit `TokenBought`
//!
//! Steps 3–5 are staged in a [`SettlementJournal`]. If any of them, or the
//! supply check, fails, everything already applied is reverted and the
//! error is returned. No other operation can observe an intermediate state:
//! every mutating method takes `&mut self`.

use std::sync::Arc;

use trimarket_custody::{AssetLedger, FungibleLedger};
use trimarket_registry::{ListingRegistry, ListingValidator};
use trimarket_types::{
    AccountId, Amount, AssetId, Clock, Listing, MarketConfig, MarketError, MarketEvent, Result,
    SettlementId, Timestamp,
};

use crate::events::EventLog;
use crate::journal::{Effect, JournalEntry, SettlementJournal, TransactionLog};
use crate::supply_conservation::SupplyConservation;

/// Fixed-price marketplace over a fungible ledger `F` and an asset ledger `N`.
///
/// Owns the listing registry, the event log and the settlement log. The
/// ledgers are collaborators: the engine only calls their trait methods,
/// while [`fungible_mut`](Self::fungible_mut) and
/// [`assets_mut`](Self::assets_mut) let their own users mint, approve and
/// transfer outside any settlement.
pub struct Marketplace<F, N> {
    config: MarketConfig,
    account: AccountId,
    validator: ListingValidator,
    registry: ListingRegistry,
    fungible: F,
    assets: N,
    clock: Arc<dyn Clock>,
    events: EventLog,
    journal: TransactionLog,
}

impl<F, N> Marketplace<F, N>
where
    F: FungibleLedger,
    N: AssetLedger,
{
    /// Wire a marketplace acting as `account` on the two ledgers.
    ///
    /// # Errors
    /// `Configuration` if `config` does not validate.
    pub fn new(
        config: MarketConfig,
        account: AccountId,
        fungible: F,
        assets: N,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            account = %account,
            window_secs = config.min_listing_window_secs,
            token = %config.token_symbol,
            "Marketplace started"
        );
        Ok(Self {
            validator: ListingValidator::from_config(account, &config),
            journal: TransactionLog::new(config.journal_capacity),
            config,
            account,
            registry: ListingRegistry::new(),
            fungible,
            assets,
            clock,
            events: EventLog::new(),
        })
    }

    /// Offer `asset_id` for `price` until `expiry`.
    ///
    /// Replaces any earlier entry for the same asset. Moves nothing.
    ///
    /// # Errors
    /// - `NotApprovedOrOwned` if `caller` is not the owner or the marketplace is not approved
    /// - `ExpiryTooSoon` if `expiry` is less than the listing window away
    pub fn list_token(
        &mut self,
        caller: AccountId,
        asset_id: AssetId,
        price: Amount,
        expiry: Timestamp,
    ) -> Result<MarketEvent> {
        let now = self.clock.now();
        self.validator
            .check_listing(&self.assets, caller, asset_id, expiry, now)?;

        let listing = Listing {
            asset_id,
            seller: caller,
            price,
            expiry,
            listed_at: now,
        };
        if let Some(replaced) = self.registry.insert(listing) {
            tracing::debug!(
                asset = %asset_id,
                previous_seller = %replaced.seller,
                previous_price = %replaced.price,
                "Replaced stale listing"
            );
        }

        let event = MarketEvent::TokenListed {
            seller: caller,
            asset_id,
        };
        self.events.append(now, event.clone());

        tracing::info!(
            seller = %caller,
            asset = %asset_id,
            price = %price.format_units(self.config.token_decimals),
            expiry = %expiry,
            "Token listed"
        );
        Ok(event)
    }

    /// Buy `asset_id` at its listed price.
    ///
    /// # Errors
    /// - `NoListingFound` if there is no listing or the seller lost custody
    /// - `ListingExpired` if the listing's expiry has passed
    /// - `InsufficientAllowance` if the buyer's allowance is below the price
    /// - any ledger error from the transfers (e.g. `InsufficientBalance`), after rollback
    pub fn buy_token(&mut self, buyer: AccountId, asset_id: AssetId) -> Result<MarketEvent> {
        let now = self.clock.now();
        let listing = self
            .validator
            .check_purchase(
                &self.registry,
                &self.fungible,
                &self.assets,
                buyer,
                asset_id,
                now,
            )
            .inspect_err(|err| {
                tracing::warn!(buyer = %buyer, asset = %asset_id, error = %err, "Purchase rejected");
            })?;

        let entry = self.settle(&listing, buyer, now)?;

        let event = MarketEvent::TokenBought { buyer, asset_id };
        self.events.append(now, event.clone());

        tracing::info!(
            settlement = %entry.id,
            buyer = %buyer,
            seller = %entry.seller,
            asset = %asset_id,
            price = %entry.price.format_units(self.config.token_decimals),
            digest = %entry.digest_hex(),
            "Token bought"
        );
        self.journal.append(entry);
        Ok(event)
    }

    /// Apply all three effects or none.
    fn settle(&mut self, listing: &Listing, buyer: AccountId, now: Timestamp) -> Result<JournalEntry> {
        let supply = SupplyConservation::capture(&self.fungible, &[buyer, listing.seller])?;
        let mut journal = SettlementJournal::new();

        let committed = self
            .apply(listing, buyer, &mut journal)
            .and_then(|()| supply.verify(&self.fungible))
            .and_then(|()| journal.commit(SettlementId::new(), listing, buyer, now));

        match committed {
            Ok(entry) => Ok(entry),
            Err(err) => {
                let undone = journal.rollback(&mut self.fungible, &mut self.assets, &mut self.registry);
                tracing::warn!(
                    buyer = %buyer,
                    asset = %listing.asset_id,
                    undone,
                    error = %err,
                    "Settlement rolled back"
                );
                Err(err)
            }
        }
    }

    fn apply(
        &mut self,
        listing: &Listing,
        buyer: AccountId,
        journal: &mut SettlementJournal,
    ) -> Result<()> {
        let paid = self
            .fungible
            .transfer_from(self.account, buyer, listing.seller, listing.price)?;
        journal.record(Effect::Payment(paid));

        let delivered =
            self.assets
                .transfer_from(self.account, listing.seller, buyer, listing.asset_id)?;
        journal.record(Effect::Delivery(delivered));

        let removed = self
            .registry
            .remove(listing.asset_id)
            .ok_or(MarketError::NoListingFound(listing.asset_id))?;
        journal.record(Effect::Delisting(removed));
        Ok(())
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// The raw registry entry, stale or not.
    #[must_use]
    pub fn listing(&self, asset_id: AssetId) -> Option<&Listing> {
        self.registry.get(asset_id)
    }

    /// The registry entry if it could be bought right now by someone with
    /// enough allowance: seller still has custody and it has not expired.
    #[must_use]
    pub fn live_listing(&self, asset_id: AssetId) -> Option<&Listing> {
        let now = self.clock.now();
        self.validator
            .live_entry(&self.registry, &self.assets, asset_id)
            .ok()
            .filter(|l| !l.is_expired_at(now))
    }

    /// All registry entries, ordered by asset id.
    #[must_use]
    pub fn listings(&self) -> Vec<&Listing> {
        self.registry.listings()
    }

    #[must_use]
    pub fn registry(&self) -> &ListingRegistry {
        &self.registry
    }

    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    #[must_use]
    pub fn journal(&self) -> &TransactionLog {
        &self.journal
    }

    #[must_use]
    pub fn account(&self) -> AccountId {
        self.account
    }

    #[must_use]
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    #[must_use]
    pub fn fungible(&self) -> &F {
        &self.fungible
    }

    pub fn fungible_mut(&mut self) -> &mut F {
        &mut self.fungible
    }

    #[must_use]
    pub fn assets(&self) -> &N {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut N {
        &mut self.assets
    }
}
