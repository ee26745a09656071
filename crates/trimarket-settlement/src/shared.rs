//! Thread-safe handle for concurrent callers.
//!
//! Each call takes the engine lock once and holds it until the operation has
//! either committed or rolled back, so operations are totally ordered and no
//! caller ever sees a half-applied settlement.

use std::sync::Arc;

use parking_lot::Mutex;
use trimarket_custody::{AssetLedger, FungibleLedger};
use trimarket_types::{AccountId, Amount, AssetId, MarketEvent, Result, Timestamp};

use crate::engine::Marketplace;

/// Cloneable, lock-guarded [`Marketplace`].
pub struct SharedMarketplace<F, N> {
    inner: Arc<Mutex<Marketplace<F, N>>>,
}

impl<F, N> Clone for SharedMarketplace<F, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F, N> SharedMarketplace<F, N>
where
    F: FungibleLedger,
    N: AssetLedger,
{
    #[must_use]
    pub fn new(market: Marketplace<F, N>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(market)),
        }
    }

    pub fn list_token(
        &self,
        caller: AccountId,
        asset_id: AssetId,
        price: Amount,
        expiry: Timestamp,
    ) -> Result<MarketEvent> {
        self.inner.lock().list_token(caller, asset_id, price, expiry)
    }

    pub fn buy_token(&self, buyer: AccountId, asset_id: AssetId) -> Result<MarketEvent> {
        self.inner.lock().buy_token(buyer, asset_id)
    }

    /// Run `f` against the engine under the lock.
    pub fn with<R>(&self, f: impl FnOnce(&Marketplace<F, N>) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Run `f` against the engine mutably under the lock, e.g. to let a
    /// ledger's users approve or transfer between marketplace calls.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Marketplace<F, N>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trimarket_custody::{NftLedger, TokenLedger};
    use trimarket_types::{MarketConfig, MarketError, ManualClock};

    #[test]
    fn concurrent_buyers_settle_once() {
        let start = Timestamp(1_700_000_000);
        let account = AccountId::random();
        let seller = AccountId::random();
        let buyers: Vec<AccountId> = (0..8).map(|_| AccountId::random()).collect();

        let mut tokens = TokenLedger::default();
        for b in &buyers {
            tokens.mint(*b, Amount(100)).unwrap();
            tokens.approve(*b, account, Amount::MAX);
        }
        let mut nfts = NftLedger::new();
        let asset = nfts.safe_mint(seller);
        nfts.approve(seller, account, asset).unwrap();

        let market = Marketplace::new(
            MarketConfig::default(),
            account,
            tokens,
            nfts,
            Arc::new(ManualClock::starting_at(start)),
        )
        .unwrap();
        let shared = SharedMarketplace::new(market);
        shared
            .list_token(seller, asset, Amount(100), start.plus_secs(7_200))
            .unwrap();

        let results: Vec<Result<MarketEvent>> = std::thread::scope(|s| {
            let handles: Vec<_> = buyers
                .iter()
                .map(|b| {
                    let shared = shared.clone();
                    let b = *b;
                    s.spawn(move || shared.buy_token(b, asset))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| matches!(e, MarketError::NoListingFound(_)))
        );

        shared.with(|m| {
            assert_eq!(m.fungible().balance_of(seller), Amount(100));
            assert_eq!(m.fungible().total_supply(), Amount(800));
            assert_eq!(m.journal().committed_total(), 1);
        });
    }
}
