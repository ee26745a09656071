//! Error types for the TriMarket marketplace.
//!
//! All errors use the `TM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Listing errors
//! - 2xx: Purchase errors
//! - 3xx: Custody (ledger) errors
//! - 6xx: Settlement errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{AccountId, Amount, AssetId, Timestamp};

/// Central error enum for all TriMarket operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketError {
    // =================================================================
    // Listing Errors (1xx)
    // =================================================================
    /// The caller does not own the asset, or the marketplace may not move it.
    #[error("TM_ERR_100: NFT not approved or not owned: {0}")]
    NotApprovedOrOwned(AssetId),

    /// The requested expiry is inside the minimum listing window.
    #[error("TM_ERR_101: Expiry below range: {expiry} < earliest {earliest}")]
    ExpiryTooSoon { expiry: Timestamp, earliest: Timestamp },

    // =================================================================
    // Purchase Errors (2xx)
    // =================================================================
    /// No live listing exists (absent, or the seller's custody has lapsed).
    #[error("TM_ERR_200: No listing found for {0}")]
    NoListingFound(AssetId),

    /// The listing exists but its expiry has passed.
    #[error("TM_ERR_201: Listing expired at {expiry} (now {now})")]
    ListingExpired { expiry: Timestamp, now: Timestamp },

    /// The buyer has not authorized enough fungible balance to the marketplace.
    #[error("TM_ERR_202: Insufficient allowance: need {needed}, have {allowed}")]
    InsufficientAllowance { needed: Amount, allowed: Amount },

    // =================================================================
    // Custody Errors (3xx)
    // =================================================================
    /// The payer's fungible balance is below the transfer amount.
    #[error("TM_ERR_300: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    /// A spender tried to move more than it was allowed to.
    #[error("TM_ERR_301: Allowance exceeded: need {needed}, have {allowed}")]
    AllowanceExceeded { needed: Amount, allowed: Amount },

    /// The asset id has never been minted.
    #[error("TM_ERR_302: Asset not found: {0}")]
    AssetNotFound(AssetId),

    /// The spender is neither owner, approved address, nor operator.
    #[error("TM_ERR_303: {spender} not authorized to transfer {asset_id}")]
    TransferNotAuthorized { spender: AccountId, asset_id: AssetId },

    /// The `from` account given for a transfer is not the current owner.
    #[error("TM_ERR_304: {asset_id} is not owned by {claimed}")]
    WrongOwner { asset_id: AssetId, claimed: AccountId },

    /// Fungible arithmetic left the `u128` range.
    #[error("TM_ERR_305: Amount overflow")]
    AmountOverflow,

    // =================================================================
    // Settlement Errors (6xx)
    // =================================================================
    /// Fungible supply changed across a settlement. Critical safety alert.
    #[error("TM_ERR_600: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("TM_ERR_900: Internal error: {0}")]
    Internal(String),

    /// A human-readable amount could not be converted to smallest units.
    #[error("TM_ERR_901: Invalid amount: {0}")]
    InvalidAmount(String),

    /// Configuration error (invalid config, missing fields, etc.).
    #[error("TM_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("TM_ERR_903: Serialization error: {0}")]
    Serialization(String),
}

impl MarketError {
    /// The `TM_ERR_` code of this error, e.g. `"TM_ERR_200"`.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotApprovedOrOwned(_) => "TM_ERR_100",
            Self::ExpiryTooSoon { .. } => "TM_ERR_101",
            Self::NoListingFound(_) => "TM_ERR_200",
            Self::ListingExpired { .. } => "TM_ERR_201",
            Self::InsufficientAllowance { .. } => "TM_ERR_202",
            Self::InsufficientBalance { .. } => "TM_ERR_300",
            Self::AllowanceExceeded { .. } => "TM_ERR_301",
            Self::AssetNotFound(_) => "TM_ERR_302",
            Self::TransferNotAuthorized { .. } => "TM_ERR_303",
            Self::WrongOwner { .. } => "TM_ERR_304",
            Self::AmountOverflow => "TM_ERR_305",
            Self::SupplyInvariantViolation { .. } => "TM_ERR_600",
            Self::Internal(_) => "TM_ERR_900",
            Self::InvalidAmount(_) => "TM_ERR_901",
            Self::Configuration(_) => "TM_ERR_902",
            Self::Serialization(_) => "TM_ERR_903",
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, MarketError>;

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
