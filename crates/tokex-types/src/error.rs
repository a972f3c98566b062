//! Error types for the tokex exchange core.
//!
//! All errors use the `TKX_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Order errors
//! - 2xx: Balance / custody errors
//! - 3xx: External token transfer errors
//! - 8xx: Invariant violations
//! - 9xx: Input / configuration / internal errors

use thiserror::Error;

use crate::{Address, Amount, OrderId, OrderStatus};

/// Central error enum for all exchange operations.
///
/// Every variant aborts the triggering operation with no state change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    // =================================================================
    // Order Errors (1xx)
    // =================================================================
    /// No order with this id was ever created.
    #[error("TKX_ERR_100: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Only the creator may cancel an order.
    #[error("TKX_ERR_101: {caller} is not the owner of order {id}")]
    NotOrderOwner { id: OrderId, caller: Address },

    /// The order already reached a terminal state.
    #[error("TKX_ERR_102: Order {id} is not open (status {status})")]
    OrderNotOpen { id: OrderId, status: OrderStatus },

    /// Zero amounts are never accepted.
    #[error("TKX_ERR_103: Amount must be greater than zero")]
    InvalidAmount,

    /// A creator cannot fill their own order.
    #[error("TKX_ERR_104: Order {0} cannot be filled by its creator")]
    CannotFillOwnOrder(OrderId),

    // =================================================================
    // Balance Errors (2xx)
    // =================================================================
    /// Custodial balance too small for a withdrawal or internal transfer.
    #[error(
        "TKX_ERR_200: Insufficient balance of {token} for {account}: need {needed}, have {available}"
    )]
    InsufficientBalance {
        token: Address,
        account: Address,
        needed: Amount,
        available: Amount,
    },

    /// A balance or fee computation would overflow `u128`.
    #[error("TKX_ERR_201: Arithmetic overflow")]
    Overflow,

    /// The ledger's own address tried to deposit into or withdraw from custody.
    #[error("TKX_ERR_202: Custody address {0} cannot deposit or withdraw")]
    SelfCustody(Address),

    // =================================================================
    // Token Transfer Errors (3xx)
    // =================================================================
    /// The external token mechanism refused a pull or a release.
    #[error("TKX_ERR_300: Token transfer failed for {token}: {source}")]
    TransferFailed { token: Address, source: TokenError },

    // =================================================================
    // Invariant Errors (8xx)
    // =================================================================
    /// Sum of balances no longer equals deposits minus withdrawals.
    #[error("TKX_ERR_800: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    /// The ledger's external holding disagrees with its custodial entries.
    #[error("TKX_ERR_801: Custody mismatch for {token}: ledger records {custodied}, holds {held}")]
    CustodyMismatch {
        token: Address,
        custodied: Amount,
        held: Amount,
    },

    // =================================================================
    // Input / Configuration (9xx)
    // =================================================================
    #[error("TKX_ERR_900: Invalid address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("TKX_ERR_901: Invalid token units {input:?}: {reason}")]
    InvalidUnits { input: String, reason: String },

    #[error("TKX_ERR_902: Configuration error: {0}")]
    Configuration(String),

    #[error("TKX_ERR_903: Serialization error: {0}")]
    Serialization(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, ExchangeError>;

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Failure reported by the external fungible token mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("unknown token {0}")]
    UnknownToken(Address),

    #[error("insufficient token balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    #[error("insufficient allowance: need {needed}, allowed {allowed}")]
    InsufficientAllowance { needed: Amount, allowed: Amount },

    #[error("invalid recipient: zero address")]
    InvalidRecipient,

    #[error("token arithmetic overflow")]
    Overflow,
}
