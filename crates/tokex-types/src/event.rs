//! Events emitted by the exchange core.
//!
//! External indexers and UIs rebuild balances and the order book from this
//! stream, so the field sets are fixed. JSON field names use camelCase
//! (`tokenGet`, `amountGive`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, Amount, Order, OrderId};

/// Tokens moved into custody.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositEvent {
    pub token: Address,
    pub user: Address,
    #[serde(with = "crate::amount::as_string")]
    pub amount: Amount,
    /// Custodial balance after the deposit.
    #[serde(with = "crate::amount::as_string")]
    pub balance: Amount,
}

/// Tokens released from custody.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawEvent {
    pub token: Address,
    pub user: Address,
    #[serde(with = "crate::amount::as_string")]
    pub amount: Amount,
    /// Custodial balance after the withdrawal.
    #[serde(with = "crate::amount::as_string")]
    pub balance: Amount,
}

/// A new order was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEvent {
    pub id: OrderId,
    pub user: Address,
    pub token_get: Address,
    #[serde(with = "crate::amount::as_string")]
    pub amount_get: Amount,
    pub token_give: Address,
    #[serde(with = "crate::amount::as_string")]
    pub amount_give: Amount,
    pub timestamp: DateTime<Utc>,
}

/// An order was cancelled by its creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelEvent {
    pub id: OrderId,
    pub user: Address,
    pub token_get: Address,
    #[serde(with = "crate::amount::as_string")]
    pub amount_get: Amount,
    pub token_give: Address,
    #[serde(with = "crate::amount::as_string")]
    pub amount_give: Amount,
    pub timestamp: DateTime<Utc>,
}

/// An order was filled. `user` is the filler, `creator` the order's owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeEvent {
    pub id: OrderId,
    pub user: Address,
    pub token_get: Address,
    #[serde(with = "crate::amount::as_string")]
    pub amount_get: Amount,
    pub token_give: Address,
    #[serde(with = "crate::amount::as_string")]
    pub amount_give: Amount,
    pub creator: Address,
    pub timestamp: DateTime<Utc>,
}

impl OrderEvent {
    #[must_use]
    pub fn from_order(order: &Order) -> Self {
        Self {
            id: order.id,
            user: order.user,
            token_get: order.token_get,
            amount_get: order.amount_get,
            token_give: order.token_give,
            amount_give: order.amount_give,
            timestamp: order.timestamp,
        }
    }
}

impl CancelEvent {
    /// Cancel events carry the order's fields and the cancellation time.
    #[must_use]
    pub fn from_order(order: &Order, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: order.id,
            user: order.user,
            token_get: order.token_get,
            amount_get: order.amount_get,
            token_give: order.token_give,
            amount_give: order.amount_give,
            timestamp,
        }
    }
}

impl TradeEvent {
    #[must_use]
    pub fn from_fill(order: &Order, filler: Address, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: order.id,
            user: filler,
            token_get: order.token_get,
            amount_get: order.amount_get,
            token_give: order.token_give,
            amount_give: order.amount_give,
            creator: order.user,
            timestamp,
        }
    }
}

/// Enum wrapper for all exchange events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "args")]
pub enum ExchangeEvent {
    Deposit(DepositEvent),
    Withdraw(WithdrawEvent),
    Order(OrderEvent),
    Cancel(CancelEvent),
    Trade(TradeEvent),
}

impl ExchangeEvent {
    /// Event name as seen by indexers.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Deposit(_) => "Deposit",
            Self::Withdraw(_) => "Withdraw",
            Self::Order(_) => "Order",
            Self::Cancel(_) => "Cancel",
            Self::Trade(_) => "Trade",
        }
    }

    /// The order this event concerns, if any.
    #[must_use]
    pub fn order_id(&self) -> Option<OrderId> {
        match self {
            Self::Order(e) => Some(e.id),
            Self::Cancel(e) => Some(e.id),
            Self::Trade(e) => Some(e.id),
            Self::Deposit(_) | Self::Withdraw(_) => None,
        }
    }
}
