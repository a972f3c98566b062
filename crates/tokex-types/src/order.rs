//! Order types for the tokex order book.
//!
//! An order is a standing all-or-nothing offer: the creator gives
//! `amount_give` of `token_give` in exchange for `amount_get` of `token_get`.
//! Nothing is escrowed at creation; both sides are checked when filled.
//!
//! ## State Machine
//!
//! ```text
//!   ┌──────┐   fill    ┌────────┐
//!   │ OPEN ├──────────▶│ FILLED │
//!   └──┬───┘           └────────┘
//!      │ cancel (creator only)
//!      ▼
//!   ┌───────────┐
//!   │ CANCELLED │
//!   └───────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, Amount, ExchangeError, OrderId, Result};

/// Lifecycle status of an order.
///
/// Transitions are **monotonic**: only `Open → Cancelled` and `Open → Filled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Open,
    Cancelled,
    Filled,
}

impl OrderStatus {
    /// Can an order in this status move to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Open, Self::Cancelled | Self::Filled))
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Open)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Filled => write!(f, "FILLED"),
        }
    }
}

/// A single order record as stored by the order book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Creator of the order.
    pub user: Address,
    pub token_get: Address,
    #[serde(with = "crate::amount::as_string")]
    pub amount_get: Amount,
    pub token_give: Address,
    #[serde(with = "crate::amount::as_string")]
    pub amount_give: Amount,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    pub status: OrderStatus,
}

impl Order {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatus::Cancelled
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.status == OrderStatus::Filled
    }

    /// Move to `target`, enforcing the state machine.
    ///
    /// # Errors
    /// Returns [`ExchangeError::OrderNotOpen`] if the order is terminal.
    pub fn transition(&mut self, target: OrderStatus) -> Result<()> {
        if !self.status.can_transition_to(target) {
            return Err(ExchangeError::OrderNotOpen {
                id: self.id,
                status: self.status,
            });
        }
        self.status = target;
        Ok(())
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    pub fn dummy(
        id: u64,
        user: Address,
        token_get: Address,
        amount_get: Amount,
        token_give: Address,
        amount_give: Amount,
    ) -> Self {
        Self {
            id: OrderId(id),
            user,
            token_get,
            amount_get,
            token_give,
            amount_give,
            timestamp: Utc::now(),
            status: OrderStatus::Open,
        }
    }
}
