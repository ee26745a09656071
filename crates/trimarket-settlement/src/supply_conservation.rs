//! Supply conservation invariant checker.
//!
//! Invariant enforced around every settlement:
//! ```text
//! total_supply(after) == total_supply(before)
//! Σ balance(parties, after) == Σ balance(parties, before)
//! ```
//!
//! A settlement only moves value between buyer and seller. If either sum
//! changes, the settlement is rolled back and the violation is reported.

use trimarket_custody::FungibleLedger;
use trimarket_types::{AccountId, Amount, MarketError, Result};

/// Snapshot of fungible totals taken before a settlement.
#[derive(Debug, Clone)]
pub struct SupplyConservation {
    total_supply: Amount,
    parties: Vec<AccountId>,
    parties_total: Amount,
}

impl SupplyConservation {
    /// Capture total supply and the combined balance of `parties`.
    pub fn capture<F>(ledger: &F, parties: &[AccountId]) -> Result<Self>
    where
        F: FungibleLedger + ?Sized,
    {
        let mut unique: Vec<AccountId> = parties.to_vec();
        unique.sort_unstable();
        unique.dedup();
        let parties_total = Self::sum(ledger, &unique)?;
        Ok(Self {
            total_supply: ledger.total_supply(),
            parties: unique,
            parties_total,
        })
    }

    #[must_use]
    pub fn expected_supply(&self) -> Amount {
        self.total_supply
    }

    #[must_use]
    pub fn expected_parties_total(&self) -> Amount {
        self.parties_total
    }

    /// Check the ledger against the snapshot.
    ///
    /// # Errors
    /// Returns [`MarketError::SupplyInvariantViolation`] if either total moved.
    pub fn verify<F>(&self, ledger: &F) -> Result<()>
    where
        F: FungibleLedger + ?Sized,
    {
        let supply = ledger.total_supply();
        if supply != self.total_supply {
            tracing::error!(
                expected = %self.total_supply,
                actual = %supply,
                "Total supply changed during settlement"
            );
            return Err(MarketError::SupplyInvariantViolation {
                reason: format!("total supply {supply} != expected {}", self.total_supply),
            });
        }

        let parties = Self::sum(ledger, &self.parties)?;
        if parties != self.parties_total {
            tracing::error!(
                expected = %self.parties_total,
                actual = %parties,
                "Party balances changed during settlement"
            );
            return Err(MarketError::SupplyInvariantViolation {
                reason: format!(
                    "party balances {parties} != expected {}",
                    self.parties_total
                ),
            });
        }
        Ok(())
    }

    fn sum<F>(ledger: &F, parties: &[AccountId]) -> Result<Amount>
    where
        F: FungibleLedger + ?Sized,
    {
        parties.iter().try_fold(Amount::ZERO, |acc, p| {
            acc.checked_add(ledger.balance_of(*p))
                .ok_or(MarketError::AmountOverflow)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trimarket_custody::TokenLedger;

    #[test]
    fn transfer_between_parties_is_conserved() {
        let mut ledger = TokenLedger::default();
        let a = AccountId::random();
        let b = AccountId::random();
        ledger.mint(a, Amount(100)).unwrap();

        let snapshot = SupplyConservation::capture(&ledger, &[a, b]).unwrap();
        ledger.transfer(a, b, Amount(40)).unwrap();
        assert!(snapshot.verify(&ledger).is_ok());
    }

    #[test]
    fn mint_during_settlement_detected() {
        let mut ledger = TokenLedger::default();
        let a = AccountId::random();
        ledger.mint(a, Amount(100)).unwrap();

        let snapshot = SupplyConservation::capture(&ledger, &[a]).unwrap();
        ledger.mint(a, Amount(1)).unwrap();
        let err = snapshot.verify(&ledger).unwrap_err();
        assert!(matches!(err, MarketError::SupplyInvariantViolation { .. }));
    }

    #[test]
    fn leak_to_third_party_detected() {
        let mut ledger = TokenLedger::default();
        let a = AccountId::random();
        let b = AccountId::random();
        let outsider = AccountId::random();
        ledger.mint(a, Amount(100)).unwrap();

        let snapshot = SupplyConservation::capture(&ledger, &[a, b]).unwrap();
        ledger.transfer(a, outsider, Amount(10)).unwrap();
        let err = snapshot.verify(&ledger).unwrap_err();
        assert!(err.to_string().contains("party balances"));
    }

    #[test]
    fn duplicate_parties_counted_once() {
        let mut ledger = TokenLedger::default();
        let a = AccountId::random();
        ledger.mint(a, Amount(100)).unwrap();
        let snapshot = SupplyConservation::capture(&ledger, &[a, a]).unwrap();
        assert_eq!(snapshot.expected_parties_total(), Amount(100));
        assert_eq!(snapshot.expected_supply(), Amount(100));
    }
}
