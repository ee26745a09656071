//! System-wide constants for the TriMarket marketplace.

/// Minimum distance between listing creation and listing expiry (one hour).
pub const MIN_LISTING_WINDOW_SECS: u64 = 3600;

/// Decimals of the fungible payment token (matches 18-decimal ERC-20 style tokens).
pub const DEFAULT_TOKEN_DECIMALS: u32 = 18;

/// Largest decimal scale [`rust_decimal::Decimal`] can represent.
pub const MAX_TOKEN_DECIMALS: u32 = 28;

/// Symbol of the default payment token.
pub const DEFAULT_TOKEN_SYMBOL: &str = "TRI";

/// Committed settlement journal entries retained in memory before the oldest is evicted.
pub const DEFAULT_JOURNAL_CAPACITY: usize = 10_000;

/// First id handed out by the reference asset ledger.
pub const FIRST_ASSET_ID: u64 = 1;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "TriMarket";
