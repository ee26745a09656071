//! Fungible balance ledger.
//!
//! Tracks per-account balances and per-(owner, spender) allowances.
//! All mutations are atomic: either the full operation succeeds or
//! the ledger is unchanged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use trimarket_types::{AccountId, Amount, MarketError, Result, constants};

/// Proof of a completed `transfer_from`, sufficient to undo it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FungibleReceipt {
    pub spender: AccountId,
    pub payer: AccountId,
    pub payee: AccountId,
    pub amount: Amount,
    /// How much of the payer's allowance the transfer consumed.
    pub allowance_spent: Amount,
}

/// What the marketplace needs from a fungible balance service.
pub trait FungibleLedger {
    /// Move `amount` from `payer` to `payee`, spending `spender`'s allowance.
    fn transfer_from(
        &mut self,
        spender: AccountId,
        payer: AccountId,
        payee: AccountId,
        amount: Amount,
    ) -> Result<FungibleReceipt>;

    /// How much `spender` may still move on `owner`'s behalf.
    fn allowance(&self, owner: AccountId, spender: AccountId) -> Amount;

    fn balance_of(&self, owner: AccountId) -> Amount;

    fn total_supply(&self) -> Amount;

    /// Undo a transfer made by this ledger. Only valid for the most recent
    /// receipts of an operation that has not yet released the ledger.
    fn revert(&mut self, receipt: &FungibleReceipt);
}

/// In-memory fungible token.
#[derive(Debug, Clone)]
pub struct TokenLedger {
    symbol: String,
    decimals: u32,
    balances: HashMap<AccountId, Amount>,
    allowances: HashMap<(AccountId, AccountId), Amount>,
    total_supply: Amount,
}

impl TokenLedger {
    /// Create an empty token.
    #[must_use]
    pub fn new(symbol: impl Into<String>, decimals: u32) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: Amount::ZERO,
        }
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Create `amount` new tokens for `to`.
    pub fn mint(&mut self, to: AccountId, amount: Amount) -> Result<()> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(MarketError::AmountOverflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(MarketError::AmountOverflow)?;
        self.total_supply = supply;
        self.balances.insert(to, balance);
        tracing::debug!(to = %to, amount = %amount, symbol = %self.symbol, "Minted");
        Ok(())
    }

    /// Faucet: exchange native value 1:1 for tokens.
    pub fn buy_with_native(&mut self, to: AccountId, value: Amount) -> Result<Amount> {
        self.mint(to, value)?;
        Ok(value)
    }

    /// Set the allowance of `spender` over `owner`'s balance (replaces, never adds).
    pub fn approve(&mut self, owner: AccountId, spender: AccountId, amount: Amount) {
        if amount.is_zero() {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
    }

    /// Holder-initiated transfer.
    pub fn transfer(&mut self, from: AccountId, to: AccountId, amount: Amount) -> Result<()> {
        self.move_balance(from, to, amount)
    }

    fn move_balance(&mut self, from: AccountId, to: AccountId, amount: Amount) -> Result<()> {
        let available = self.balance_of(from);
        let debited = available
            .checked_sub(amount)
            .ok_or(MarketError::InsufficientBalance {
                needed: amount,
                available,
            })?;
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(MarketError::AmountOverflow)?;
        self.balances.insert(from, debited);
        self.balances.insert(to, credited);
        Ok(())
    }
}

impl Default for TokenLedger {
    fn default() -> Self {
        Self::new(constants::DEFAULT_TOKEN_SYMBOL, constants::DEFAULT_TOKEN_DECIMALS)
    }
}

impl FungibleLedger for TokenLedger {
    fn transfer_from(
        &mut self,
        spender: AccountId,
        payer: AccountId,
        payee: AccountId,
        amount: Amount,
    ) -> Result<FungibleReceipt> {
        let allowed = self.allowance(payer, spender);
        if allowed < amount {
            return Err(MarketError::AllowanceExceeded {
                needed: amount,
                allowed,
            });
        }

        self.move_balance(payer, payee, amount)?;

        // An unlimited allowance is never decremented.
        let allowance_spent = if allowed == Amount::MAX {
            Amount::ZERO
        } else {
            self.approve(payer, spender, allowed.saturating_sub(amount));
            amount
        };

        Ok(FungibleReceipt {
            spender,
            payer,
            payee,
            amount,
            allowance_spent,
        })
    }

    fn allowance(&self, owner: AccountId, spender: AccountId) -> Amount {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn balance_of(&self, owner: AccountId) -> Amount {
        self.balances.get(&owner).copied().unwrap_or_default()
    }

    fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn revert(&mut self, receipt: &FungibleReceipt) {
        if receipt.payer != receipt.payee {
            let payee = self.balance_of(receipt.payee).saturating_sub(receipt.amount);
            let payer = self.balance_of(receipt.payer).saturating_add(receipt.amount);
            self.balances.insert(receipt.payee, payee);
            self.balances.insert(receipt.payer, payer);
        }
        if !receipt.allowance_spent.is_zero() {
            let restored = self
                .allowance(receipt.payer, receipt.spender)
                .saturating_add(receipt.allowance_spent);
            self.approve(receipt.payer, receipt.spender, restored);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (TokenLedger, AccountId, AccountId, AccountId) {
        let mut ledger = TokenLedger::default();
        let owner = AccountId::random();
        let spender = AccountId::random();
        let payee = AccountId::random();
        ledger.mint(owner, Amount(1_000)).unwrap();
        (ledger, owner, spender, payee)
    }

    #[test]
    fn mint_increases_balance_and_supply() {
        let (ledger, owner, _, _) = setup();
        assert_eq!(ledger.balance_of(owner), Amount(1_000));
        assert_eq!(ledger.total_supply(), Amount(1_000));
    }

    #[test]
    fn mint_overflow_rejected() {
        let (mut ledger, owner, _, _) = setup();
        let err = ledger.mint(owner, Amount::MAX).unwrap_err();
        assert!(matches!(err, MarketError::AmountOverflow));
        assert_eq!(ledger.total_supply(), Amount(1_000));
    }

    #[test]
    fn faucet_mints_one_to_one() {
        let mut ledger = TokenLedger::default();
        let buyer = AccountId::random();
        let got = ledger.buy_with_native(buyer, Amount(5)).unwrap();
        assert_eq!(got, Amount(5));
        assert_eq!(ledger.balance_of(buyer), Amount(5));
    }

    #[test]
    fn transfer_from_spends_allowance() {
        let (mut ledger, owner, spender, payee) = setup();
        ledger.approve(owner, spender, Amount(300));

        let receipt = ledger
            .transfer_from(spender, owner, payee, Amount(200))
            .unwrap();
        assert_eq!(receipt.allowance_spent, Amount(200));
        assert_eq!(ledger.balance_of(owner), Amount(800));
        assert_eq!(ledger.balance_of(payee), Amount(200));
        assert_eq!(ledger.allowance(owner, spender), Amount(100));
    }

    #[test]
    fn unlimited_allowance_not_decremented() {
        let (mut ledger, owner, spender, payee) = setup();
        ledger.approve(owner, spender, Amount::MAX);
        let receipt = ledger
            .transfer_from(spender, owner, payee, Amount(200))
            .unwrap();
        assert_eq!(receipt.allowance_spent, Amount::ZERO);
        assert_eq!(ledger.allowance(owner, spender), Amount::MAX);
    }

    #[test]
    fn transfer_from_without_allowance_fails() {
        let (mut ledger, owner, spender, payee) = setup();
        let err = ledger
            .transfer_from(spender, owner, payee, Amount(1))
            .unwrap_err();
        assert!(matches!(err, MarketError::AllowanceExceeded { .. }));
        assert_eq!(ledger.balance_of(owner), Amount(1_000));
    }

    #[test]
    fn transfer_from_insufficient_balance_leaves_ledger_unchanged() {
        let (mut ledger, owner, spender, payee) = setup();
        ledger.approve(owner, spender, Amount(5_000));
        let err = ledger
            .transfer_from(spender, owner, payee, Amount(2_000))
            .unwrap_err();
        assert!(matches!(
            err,
            MarketError::InsufficientBalance { needed, available }
                if needed == Amount(2_000) && available == Amount(1_000)
        ));
        assert_eq!(ledger.balance_of(owner), Amount(1_000));
        assert_eq!(ledger.allowance(owner, spender), Amount(5_000));
    }

    #[test]
    fn revert_restores_balances_and_allowance() {
        let (mut ledger, owner, spender, payee) = setup();
        ledger.approve(owner, spender, Amount(300));
        let receipt = ledger
            .transfer_from(spender, owner, payee, Amount(300))
            .unwrap();
        assert_eq!(ledger.allowance(owner, spender), Amount::ZERO);

        ledger.revert(&receipt);
        assert_eq!(ledger.balance_of(owner), Amount(1_000));
        assert_eq!(ledger.balance_of(payee), Amount::ZERO);
        assert_eq!(ledger.allowance(owner, spender), Amount(300));
        assert_eq!(ledger.total_supply(), Amount(1_000));
    }

    #[test]
    fn self_transfer_keeps_balance() {
        let (mut ledger, owner, _, _) = setup();
        ledger.transfer(owner, owner, Amount(400)).unwrap();
        assert_eq!(ledger.balance_of(owner), Amount(1_000));
    }

    #[test]
    fn approve_zero_clears_allowance() {
        let (mut ledger, owner, spender, _) = setup();
        ledger.approve(owner, spender, Amount(10));
        ledger.approve(owner, spender, Amount::ZERO);
        assert_eq!(ledger.allowance(owner, spender), Amount::ZERO);
    }
}
