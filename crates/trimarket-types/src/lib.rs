//! # trimarket-types
//!
//! Shared types, errors, and configuration for the **TriMarket** fixed-price
//! asset marketplace.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`AssetId`], [`SettlementId`]
//! - **Amounts**: [`Amount`] in smallest fungible units, with decimal unit conversion
//! - **Time**: [`Timestamp`], the [`Clock`] trait, [`SystemClock`], [`ManualClock`]
//! - **Listing model**: [`Listing`]
//! - **Notifications**: [`MarketEvent`], [`EventRecord`]
//! - **Configuration**: [`MarketConfig`]
//! - **Errors**: [`MarketError`] with `TM_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod amount;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod listing;
pub mod time;

pub use amount::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use listing::*;
pub use time::*;

// Constants are accessed via `trimarket_types::constants::FOO`
// (not re-exported to avoid name collisions).
