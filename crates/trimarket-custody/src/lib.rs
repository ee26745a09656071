//! # trimarket-custody
//!
//! **Custody adapters**: the capability contracts the marketplace core needs
//! from the two ledgers it trades between, plus in-memory reference ledgers.
//!
//! ## Contracts
//!
//! - [`FungibleLedger`]: balance transfer on a payer's behalf, allowance lookup
//! - [`AssetLedger`]: ownership lookup, approval check, transfer on an owner's behalf
//!
//! Both `transfer_from` operations return a receipt. Handing the receipt back
//! to `revert` undoes exactly that transfer; the settlement engine uses this
//! to roll back a partially applied purchase.
//!
//! ## Reference ledgers
//!
//! - [`TokenLedger`]: an 18-decimal token with mint, faucet, approve, transfer
//! - [`NftLedger`]: sequentially minted assets with single and operator approvals
//!
//! The core never touches balances or ownership except through these traits.

pub mod fungible;
pub mod non_fungible;

pub use fungible::{FungibleLedger, FungibleReceipt, TokenLedger};
pub use non_fungible::{AssetLedger, AssetReceipt, NftLedger};
