//! # trimarket-settlement
//!
//! **Settlement plane**: the marketplace engine, atomic purchase execution,
//! the settlement journal, and the notification log.
//!
//! ## Architecture
//!
//! The [`Marketplace`] receives `list_token` / `buy_token` calls and:
//! 1. Validates them through the [`ListingValidator`](trimarket_registry::ListingValidator)
//! 2. Stages payment, delivery and delisting in a [`SettlementJournal`]
//! 3. Checks supply conservation
//! 4. Commits one [`JournalEntry`] or rolls every effect back
//! 5. Appends `TokenListed` / `TokenBought` to the [`EventLog`]
//!
//! [`SharedMarketplace`] adds the lock that makes this hold for concurrent
//! callers.

pub mod engine;
pub mod events;
pub mod journal;
pub mod shared;
pub mod supply_conservation;

pub use engine::Marketplace;
pub use events::EventLog;
pub use journal::{Effect, JournalEntry, SettlementJournal, TransactionLog};
pub use shared::SharedMarketplace;
pub use supply_conservation::SupplyConservation;
