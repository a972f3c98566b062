//! The order book: every order ever created, keyed by id.
//!
//! Orders are never removed. Cancelled and filled orders stay in the book
//! with a terminal status so that ids `1..=order_count()` always enumerate
//! the full history.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tokex_types::constants::FIRST_ORDER_ID;
use tokex_types::{Address, Amount, ExchangeError, Order, OrderId, OrderStatus, Result};

/// Order records and the id counter.
#[derive(Debug)]
pub struct OrderBook {
    orders: BTreeMap<OrderId, Order>,
    /// Id the next created order receives.
    next_id: OrderId,
}

impl OrderBook {
    #[must_use]
    pub fn new() -> Self {
        Self {
            orders: BTreeMap::new(),
            next_id: OrderId(FIRST_ORDER_ID),
        }
    }

    // =================================================================
    // Mutation
    // =================================================================

    /// Record a new open order under the next id.
    ///
    /// Solvency is not checked here; both sides are checked at fill time.
    ///
    /// # Errors
    /// Returns [`ExchangeError::InvalidAmount`] if either amount is zero.
    pub fn insert(
        &mut self,
        user: Address,
        token_get: Address,
        amount_get: Amount,
        token_give: Address,
        amount_give: Amount,
        timestamp: DateTime<Utc>,
    ) -> Result<&Order> {
        if amount_get == 0 || amount_give == 0 {
            return Err(ExchangeError::InvalidAmount);
        }

        let id = self.next_id;
        self.next_id = id.next();
        let order = Order {
            id,
            user,
            token_get,
            amount_get,
            token_give,
            amount_give,
            timestamp,
            status: OrderStatus::Open,
        };
        Ok(&*self.orders.entry(id).or_insert(order))
    }

    /// Cancel an open order on behalf of `caller`.
    ///
    /// # Errors
    /// Checked in order: [`ExchangeError::OrderNotFound`],
    /// [`ExchangeError::NotOrderOwner`], [`ExchangeError::OrderNotOpen`].
    pub fn cancel(&mut self, id: OrderId, caller: Address) -> Result<&Order> {
        let order = self
            .orders
            .get_mut(&id)
            .ok_or(ExchangeError::OrderNotFound(id))?;
        if order.user != caller {
            return Err(ExchangeError::NotOrderOwner { id, caller });
        }
        order.transition(OrderStatus::Cancelled)?;
        Ok(&*order)
    }

    /// Mark an open order as filled. Balance movement is the caller's job.
    pub(crate) fn mark_filled(&mut self, id: OrderId) -> Result<&Order> {
        let order = self
            .orders
            .get_mut(&id)
            .ok_or(ExchangeError::OrderNotFound(id))?;
        order.transition(OrderStatus::Filled)?;
        Ok(&*order)
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Order `id` in any status.
    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    /// The order if it exists and is still open.
    ///
    /// # Errors
    /// [`ExchangeError::OrderNotFound`] or [`ExchangeError::OrderNotOpen`].
    pub fn open_order(&self, id: OrderId) -> Result<&Order> {
        let order = self.orders.get(&id).ok_or(ExchangeError::OrderNotFound(id))?;
        if !order.is_open() {
            return Err(ExchangeError::OrderNotOpen {
                id,
                status: order.status,
            });
        }
        Ok(order)
    }

    /// Number of orders ever created.
    #[must_use]
    pub fn order_count(&self) -> u64 {
        self.next_id.value() - FIRST_ORDER_ID
    }

    /// All orders in id order.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// Orders that can still be cancelled or filled, in id order.
    pub fn open_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values().filter(|o| o.is_open())
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}
