//! Listing registry — at most one listing per asset.
//!
//! Entries are keyed by asset id. Inserting for an asset that already has an
//! entry replaces it; the old entry is returned so the caller can log it.
//! Stale entries (expired, or whose seller lost custody) stay in place until
//! they are overwritten or consumed.

use std::collections::HashMap;

use trimarket_types::{AccountId, AssetId, Listing};

/// Partial mapping from asset id to its listing.
#[derive(Debug, Clone, Default)]
pub struct ListingRegistry {
    listings: HashMap<AssetId, Listing>,
}

impl ListingRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            listings: HashMap::new(),
        }
    }

    /// Insert a listing, returning whatever entry it replaced.
    pub fn insert(&mut self, listing: Listing) -> Option<Listing> {
        self.listings.insert(listing.asset_id, listing)
    }

    /// Remove and return the listing for `asset_id`.
    pub fn remove(&mut self, asset_id: AssetId) -> Option<Listing> {
        self.listings.remove(&asset_id)
    }

    #[must_use]
    pub fn get(&self, asset_id: AssetId) -> Option<&Listing> {
        self.listings.get(&asset_id)
    }

    #[must_use]
    pub fn contains(&self, asset_id: AssetId) -> bool {
        self.listings.contains_key(&asset_id)
    }

    /// All entries, ordered by asset id.
    #[must_use]
    pub fn listings(&self) -> Vec<&Listing> {
        let mut all: Vec<&Listing> = self.listings.values().collect();
        all.sort_by_key(|l| l.asset_id);
        all
    }

    /// Entries recorded for `seller`, ordered by asset id.
    #[must_use]
    pub fn listings_by_seller(&self, seller: AccountId) -> Vec<&Listing> {
        let mut mine: Vec<&Listing> = self
            .listings
            .values()
            .filter(|l| l.seller == seller)
            .collect();
        mine.sort_by_key(|l| l.asset_id);
        mine
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trimarket_types::{Amount, Timestamp};

    fn listing(asset: u64, seller: AccountId, price: u128) -> Listing {
        Listing::dummy(AssetId(asset), seller, Amount(price), Timestamp(7_200))
    }

    #[test]
    fn insert_then_get() {
        let mut reg = ListingRegistry::new();
        let seller = AccountId::random();
        assert!(reg.insert(listing(1, seller, 100)).is_none());

        let got = reg.get(AssetId(1)).unwrap();
        assert_eq!(got.seller, seller);
        assert_eq!(got.price, Amount(100));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn insert_replaces_existing_entry() {
        let mut reg = ListingRegistry::new();
        let old_seller = AccountId::random();
        let new_seller = AccountId::random();
        reg.insert(listing(1, old_seller, 100));

        let replaced = reg.insert(listing(1, new_seller, 250)).unwrap();
        assert_eq!(replaced.seller, old_seller);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(AssetId(1)).unwrap().seller, new_seller);
    }

    #[test]
    fn remove_clears_entry() {
        let mut reg = ListingRegistry::new();
        reg.insert(listing(1, AccountId::random(), 100));
        assert!(reg.remove(AssetId(1)).is_some());
        assert!(!reg.contains(AssetId(1)));
        assert!(reg.remove(AssetId(1)).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn listings_are_sorted_and_filterable() {
        let mut reg = ListingRegistry::new();
        let alice = AccountId::random();
        let bob = AccountId::random();
        reg.insert(listing(3, alice, 1));
        reg.insert(listing(1, bob, 1));
        reg.insert(listing(2, alice, 1));

        let ids: Vec<u64> = reg.listings().iter().map(|l| l.asset_id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let alices: Vec<u64> = reg
            .listings_by_seller(alice)
            .iter()
            .map(|l| l.asset_id.0)
            .collect();
        assert_eq!(alices, vec![2, 3]);
    }
}
