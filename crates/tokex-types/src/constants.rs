//! System-wide constants for the tokex exchange core.

/// Fixed-point decimals of every tradable token (10^18 base units per token).
pub const TOKEN_DECIMALS: u32 = 18;

/// Base units in one whole token.
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// Highest fee percentage accepted by [`crate::ExchangeConfig::validate`].
pub const MAX_FEE_PERCENT: u32 = 100;

/// Divisor applied to `amount_get * fee_percent`.
pub const FEE_DENOMINATOR: u128 = 100;

/// Buffered events per subscriber before slow receivers start lagging.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Whole tokens minted to the deployer of a reference token.
pub const DEFAULT_TOKEN_SUPPLY: u64 = 1_000_000;

/// First id handed out by the order book.
pub const FIRST_ORDER_ID: u64 = 1;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "tokex";
