//! Non-fungible asset ledger.
//!
//! Each asset has exactly one owner, at most one approved address, and the
//! owner may additionally name operators that can move all of its assets.
//! A transfer clears the single approval, so an approval granted by a
//! previous owner never survives a change of hands.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use trimarket_types::{AccountId, AssetId, MarketError, Result, constants};

/// Proof of a completed `transfer_from`, sufficient to undo it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReceipt {
    pub asset_id: AssetId,
    pub from: AccountId,
    pub to: AccountId,
    /// The single approval that the transfer cleared, if any.
    pub cleared_approval: Option<AccountId>,
}

/// What the marketplace needs from a non-fungible asset service.
pub trait AssetLedger {
    /// Current owner, or [`MarketError::AssetNotFound`] if never minted.
    fn owner_of(&self, asset_id: AssetId) -> Result<AccountId>;

    /// Whether `spender` may move `asset_id` right now.
    fn is_approved_or_owner(&self, spender: AccountId, asset_id: AssetId) -> bool;

    /// Move `asset_id` from `from` to `to` on `spender`'s authority.
    fn transfer_from(
        &mut self,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        asset_id: AssetId,
    ) -> Result<AssetReceipt>;

    /// Undo a transfer made by this ledger. Only valid for the most recent
    /// receipts of an operation that has not yet released the ledger.
    fn revert(&mut self, receipt: &AssetReceipt);
}

/// In-memory non-fungible asset registry.
#[derive(Debug, Clone)]
pub struct NftLedger {
    owners: HashMap<AssetId, AccountId>,
    approvals: HashMap<AssetId, AccountId>,
    /// `(owner, operator)` pairs.
    operators: HashSet<(AccountId, AccountId)>,
    next_id: AssetId,
}

impl NftLedger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            owners: HashMap::new(),
            approvals: HashMap::new(),
            operators: HashSet::new(),
            next_id: AssetId(constants::FIRST_ASSET_ID),
        }
    }

    /// Mint the next asset to `to`. Ids start at 1 and increase by one.
    pub fn safe_mint(&mut self, to: AccountId) -> AssetId {
        let asset_id = self.next_id;
        self.next_id = asset_id.next();
        self.owners.insert(asset_id, to);
        tracing::debug!(asset = %asset_id, to = %to, "Asset minted");
        asset_id
    }

    /// Approve `spender` to move `asset_id`. Replaces any earlier approval.
    ///
    /// # Errors
    /// - `AssetNotFound` if the asset was never minted
    /// - `TransferNotAuthorized` if `caller` is neither owner nor operator
    pub fn approve(&mut self, caller: AccountId, spender: AccountId, asset_id: AssetId) -> Result<()> {
        let owner = self.owner_of(asset_id)?;
        if caller != owner && !self.is_operator(owner, caller) {
            return Err(MarketError::TransferNotAuthorized {
                spender: caller,
                asset_id,
            });
        }
        self.approvals.insert(asset_id, spender);
        Ok(())
    }

    /// Clear the single approval on `asset_id`.
    pub fn revoke(&mut self, caller: AccountId, asset_id: AssetId) -> Result<()> {
        let owner = self.owner_of(asset_id)?;
        if caller != owner && !self.is_operator(owner, caller) {
            return Err(MarketError::TransferNotAuthorized {
                spender: caller,
                asset_id,
            });
        }
        self.approvals.remove(&asset_id);
        Ok(())
    }

    /// Grant or withdraw `operator`'s right to move every asset of `owner`.
    pub fn set_approval_for_all(&mut self, owner: AccountId, operator: AccountId, approved: bool) {
        if approved {
            self.operators.insert((owner, operator));
        } else {
            self.operators.remove(&(owner, operator));
        }
    }

    #[must_use]
    pub fn get_approved(&self, asset_id: AssetId) -> Option<AccountId> {
        self.approvals.get(&asset_id).copied()
    }

    #[must_use]
    pub fn is_operator(&self, owner: AccountId, operator: AccountId) -> bool {
        self.operators.contains(&(owner, operator))
    }

    /// Number of assets held by `owner`.
    #[must_use]
    pub fn balance_of(&self, owner: AccountId) -> usize {
        self.owners.values().filter(|o| **o == owner).count()
    }
}

impl Default for NftLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLedger for NftLedger {
    fn owner_of(&self, asset_id: AssetId) -> Result<AccountId> {
        self.owners
            .get(&asset_id)
            .copied()
            .ok_or(MarketError::AssetNotFound(asset_id))
    }

    fn is_approved_or_owner(&self, spender: AccountId, asset_id: AssetId) -> bool {
        let Ok(owner) = self.owner_of(asset_id) else {
            return false;
        };
        spender == owner
            || self.get_approved(asset_id) == Some(spender)
            || self.is_operator(owner, spender)
    }

    fn transfer_from(
        &mut self,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        asset_id: AssetId,
    ) -> Result<AssetReceipt> {
        let owner = self.owner_of(asset_id)?;
        if owner != from {
            return Err(MarketError::WrongOwner {
                asset_id,
                claimed: from,
            });
        }
        if !self.is_approved_or_owner(spender, asset_id) {
            return Err(MarketError::TransferNotAuthorized { spender, asset_id });
        }

        let cleared_approval = self.approvals.remove(&asset_id);
        self.owners.insert(asset_id, to);
        Ok(AssetReceipt {
            asset_id,
            from,
            to,
            cleared_approval,
        })
    }

    fn revert(&mut self, receipt: &AssetReceipt) {
        self.owners.insert(receipt.asset_id, receipt.from);
        match receipt.cleared_approval {
            Some(approved) => {
                self.approvals.insert(receipt.asset_id, approved);
            }
            None => {
                self.approvals.remove(&receipt.asset_id);
            }
        }
    }
}
