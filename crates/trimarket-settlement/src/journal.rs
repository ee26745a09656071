//! Settlement journal — stages the effects of one purchase so they can be
//! committed together or undone together.
//!
//! Each applied effect is recorded with the receipt needed to reverse it.
//! On failure the journal is replayed backwards through the ledgers'
//! `revert`; on success it collapses into a single [`JournalEntry`] that is
//! appended to the [`TransactionLog`].
//!
//! A committed entry must contain exactly one payment, one delivery and one
//! delisting. Anything else is refused, because it would mean the engine is
//! about to publish a half-done settlement.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use trimarket_custody::{AssetLedger, AssetReceipt, FungibleLedger, FungibleReceipt};
use trimarket_registry::ListingRegistry;
use trimarket_types::{
    AccountId, Amount, AssetId, Listing, MarketError, Result, SettlementId, Timestamp,
};

/// One applied, reversible step of a settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fungible balance moved buyer → seller.
    Payment(FungibleReceipt),
    /// Asset moved seller → buyer.
    Delivery(AssetReceipt),
    /// Listing removed from the registry.
    Delisting(Listing),
}

/// Effects applied so far by an in-flight settlement.
#[derive(Debug, Default)]
pub struct SettlementJournal {
    effects: Vec<Effect>,
}

impl SettlementJournal {
    #[must_use]
    pub fn new() -> Self {
        Self {
            effects: Vec::with_capacity(3),
        }
    }

    pub fn record(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Undo every recorded effect, newest first. Returns how many were undone.
    pub fn rollback<F, N>(
        self,
        fungible: &mut F,
        assets: &mut N,
        registry: &mut ListingRegistry,
    ) -> usize
    where
        F: FungibleLedger + ?Sized,
        N: AssetLedger + ?Sized,
    {
        let undone = self.effects.len();
        for effect in self.effects.into_iter().rev() {
            match effect {
                Effect::Payment(receipt) => fungible.revert(&receipt),
                Effect::Delivery(receipt) => assets.revert(&receipt),
                Effect::Delisting(listing) => {
                    registry.insert(listing);
                }
            }
        }
        undone
    }

    /// Seal the journal into a committed entry.
    ///
    /// # Errors
    /// `Internal` unless the journal holds exactly one payment, one delivery
    /// and one delisting, all for `listing`.
    pub fn commit(
        &self,
        id: SettlementId,
        listing: &Listing,
        buyer: AccountId,
        settled_at: Timestamp,
    ) -> Result<JournalEntry> {
        let (mut paid, mut delivered, mut delisted) = (0, 0, 0);
        for effect in &self.effects {
            match effect {
                Effect::Payment(r) if r.payer == buyer && r.payee == listing.seller => paid += 1,
                Effect::Delivery(r) if r.asset_id == listing.asset_id && r.to == buyer => {
                    delivered += 1;
                }
                Effect::Delisting(l) if l.asset_id == listing.asset_id => delisted += 1,
                other => {
                    return Err(MarketError::Internal(format!(
                        "foreign effect in settlement of {}: {other:?}",
                        listing.asset_id
                    )));
                }
            }
        }
        if (paid, delivered, delisted) != (1, 1, 1) {
            return Err(MarketError::Internal(format!(
                "incomplete settlement of {}: payments={paid} deliveries={delivered} delistings={delisted}",
                listing.asset_id
            )));
        }

        Ok(JournalEntry::new(
            id,
            listing.asset_id,
            listing.seller,
            buyer,
            listing.price,
            settled_at,
        ))
    }
}

/// A committed settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: SettlementId,
    pub asset_id: AssetId,
    pub seller: AccountId,
    pub buyer: AccountId,
    pub price: Amount,
    pub settled_at: Timestamp,
    /// SHA-256 over the fields above.
    pub digest: [u8; 32],
}

impl JournalEntry {
    fn new(
        id: SettlementId,
        asset_id: AssetId,
        seller: AccountId,
        buyer: AccountId,
        price: Amount,
        settled_at: Timestamp,
    ) -> Self {
        let mut entry = Self {
            id,
            asset_id,
            seller,
            buyer,
            price,
            settled_at,
            digest: [0u8; 32],
        };
        entry.digest = entry.compute_digest();
        entry
    }

    /// Canonical digest: `"trimarket:settlement:v1:" || id || asset || seller || buyer || price || settled_at`.
    #[must_use]
    pub fn compute_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(b"trimarket:settlement:v1:");
        hasher.update(self.id.0.as_bytes());
        hasher.update(self.asset_id.0.to_le_bytes());
        hasher.update(self.seller.as_bytes());
        hasher.update(self.buyer.as_bytes());
        hasher.update(self.price.0.to_le_bytes());
        hasher.update(self.settled_at.0.to_le_bytes());
        hasher.finalize().into()
    }

    /// Whether the stored digest still matches the entry's fields.
    #[must_use]
    pub fn verify_digest(&self) -> bool {
        self.digest == self.compute_digest()
    }

    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}

/// Append-only log of committed settlements with bounded retention.
///
/// When the log reaches `capacity`, the oldest entry is evicted. The total
/// count of commits is kept regardless of eviction.
#[derive(Debug)]
pub struct TransactionLog {
    entries: VecDeque<JournalEntry>,
    capacity: usize,
    committed_total: u64,
}

impl TransactionLog {
    /// # Panics
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "TransactionLog capacity must be > 0");
        Self {
            entries: VecDeque::new(),
            capacity,
            committed_total: 0,
        }
    }

    pub fn append(&mut self, entry: JournalEntry) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        self.committed_total += 1;
    }

    /// Retained entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn last(&self) -> Option<&JournalEntry> {
        self.entries.back()
    }

    /// Retained entries for `asset_id`, oldest first.
    pub fn for_asset(&self, asset_id: AssetId) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().filter(move |e| e.asset_id == asset_id)
    }

    #[must_use]
    pub fn committed_total(&self) -> u64 {
        self.committed_total
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trimarket_custody::{NftLedger, TokenLedger};

    struct Fixture {
        tokens: TokenLedger,
        nfts: NftLedger,
        registry: ListingRegistry,
        market: AccountId,
        buyer: AccountId,
        listing: Listing,
    }

    fn setup() -> Fixture {
        let market = AccountId::random();
        let seller = AccountId::random();
        let buyer = AccountId::random();
        let mut tokens = TokenLedger::default();
        tokens.mint(buyer, Amount(500)).unwrap();
        tokens.approve(buyer, market, Amount(500));
        let mut nfts = NftLedger::new();
        let asset = nfts.safe_mint(seller);
        nfts.approve(seller, market, asset).unwrap();
        let listing = Listing::dummy(asset, seller, Amount(200), Timestamp(7_200));
        let mut registry = ListingRegistry::new();
        registry.insert(listing.clone());
        Fixture {
            tokens,
            nfts,
            registry,
            market,
            buyer,
            listing,
        }
    }

    fn apply_all(f: &mut Fixture) -> SettlementJournal {
        let mut journal = SettlementJournal::new();
        let paid = f
            .tokens
            .transfer_from(f.market, f.buyer, f.listing.seller, f.listing.price)
            .unwrap();
        journal.record(Effect::Payment(paid));
        let moved = f
            .nfts
            .transfer_from(f.market, f.listing.seller, f.buyer, f.listing.asset_id)
            .unwrap();
        journal.record(Effect::Delivery(moved));
        let removed = f.registry.remove(f.listing.asset_id).unwrap();
        journal.record(Effect::Delisting(removed));
        journal
    }

    #[test]
    fn rollback_restores_everything() {
        let mut f = setup();
        let journal = apply_all(&mut f);
        assert_eq!(journal.len(), 3);

        let undone = journal.rollback(&mut f.tokens, &mut f.nfts, &mut f.registry);
        assert_eq!(undone, 3);
        assert_eq!(f.tokens.balance_of(f.buyer), Amount(500));
        assert_eq!(f.tokens.balance_of(f.listing.seller), Amount::ZERO);
        assert_eq!(f.tokens.allowance(f.buyer, f.market), Amount(500));
        assert_eq!(f.nfts.owner_of(f.listing.asset_id).unwrap(), f.listing.seller);
        assert_eq!(f.nfts.get_approved(f.listing.asset_id), Some(f.market));
        assert_eq!(f.registry.get(f.listing.asset_id), Some(&f.listing));
    }

    #[test]
    fn rollback_of_partial_journal() {
        let mut f = setup();
        let mut journal = SettlementJournal::new();
        let paid = f
            .tokens
            .transfer_from(f.market, f.buyer, f.listing.seller, f.listing.price)
            .unwrap();
        journal.record(Effect::Payment(paid));

        assert_eq!(journal.rollback(&mut f.tokens, &mut f.nfts, &mut f.registry), 1);
        assert_eq!(f.tokens.balance_of(f.buyer), Amount(500));
        assert!(f.registry.contains(f.listing.asset_id));
    }

    #[test]
    fn commit_complete_journal() {
        let mut f = setup();
        let journal = apply_all(&mut f);
        let entry = journal
            .commit(SettlementId::new(), &f.listing, f.buyer, Timestamp(100))
            .unwrap();
        assert_eq!(entry.asset_id, f.listing.asset_id);
        assert_eq!(entry.price, Amount(200));
        assert!(entry.verify_digest());
        assert_eq!(entry.digest_hex().len(), 64);
    }

    #[test]
    fn commit_refuses_incomplete_journal() {
        let mut f = setup();
        let mut journal = SettlementJournal::new();
        let removed = f.registry.remove(f.listing.asset_id).unwrap();
        journal.record(Effect::Delisting(removed));
        let err = journal
            .commit(SettlementId::new(), &f.listing, f.buyer, Timestamp(100))
            .unwrap_err();
        assert!(matches!(err, MarketError::Internal(_)));
    }

    #[test]
    fn tampered_entry_fails_digest() {
        let mut f = setup();
        let mut entry = apply_all(&mut f)
            .commit(SettlementId::new(), &f.listing, f.buyer, Timestamp(100))
            .unwrap();
        entry.price = Amount(1);
        assert!(!entry.verify_digest());
    }

    #[test]
    fn log_evicts_oldest() {
        let mut log = TransactionLog::new(2);
        let seller = AccountId::random();
        let buyer = AccountId::random();
        for asset in 1..=3 {
            log.append(JournalEntry::new(
                SettlementId::new(),
                AssetId(asset),
                seller,
                buyer,
                Amount(1),
                Timestamp(asset),
            ));
        }
        assert_eq!(log.len(), 2);
        assert_eq!(log.committed_total(), 3);
        assert_eq!(log.for_asset(AssetId(1)).count(), 0);
        assert_eq!(log.last().unwrap().asset_id, AssetId(3));
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn zero_capacity_panics() {
        let _ = TransactionLog::new(0);
    }
}
