//! # trimarket-registry
//!
//! **Listing plane**: the registry of active listings and the validator that
//! gates every change to it.
//!
//! ## Architecture
//!
//! 1. **ListingRegistry**: partial map from asset id to at most one [`Listing`]
//! 2. **ListingValidator**: pure predicates over the registry and the custody
//!    ledgers, deciding whether a listing may be created and whether a
//!    purchase may proceed
//!
//! ## Listing Flow
//!
//! ```text
//! seller → ListingValidator.check_listing() → ListingRegistry.insert()
//! buyer  → ListingValidator.check_purchase() → Settlement Engine
//! ```
//!
//! The validator never mutates anything; the registry never validates.
//!
//! [`Listing`]: trimarket_types::Listing

pub mod registry;
pub mod validator;

pub use registry::ListingRegistry;
pub use validator::ListingValidator;
