//! The exchange state object.
//!
//! [`Exchange`] ties the custodial [`Ledger`], the [`OrderBook`] and the
//! [`EventBus`] together behind the public operations:
//!
//! ```text
//!   deposit / withdraw ──▶ Ledger ◀── token mechanism (pull / release)
//!   make_order / cancel ─▶ OrderBook
//!   fill_order ──────────▶ OrderBook (check) ─▶ FillPlan ─▶ Ledger (atomic) ─▶ OrderBook (mark)
//!                                       every success ─▶ EventBus
//! ```
//!
//! Every mutating operation takes `&mut self` and runs to completion. A
//! failed operation changes nothing and publishes nothing.

use std::sync::Arc;

use tokex_types::constants;
use tokex_types::{
    Address, Amount, CancelEvent, DepositEvent, ExchangeConfig, ExchangeError, ExchangeEvent,
    FillReceipt, Order, OrderEvent, OrderId, Result, TokenMechanism, TradeEvent, WithdrawEvent,
};
use tokio::sync::broadcast;

use crate::clock::{Clock, SystemClock};
use crate::events::EventBus;
use crate::ledger::Ledger;
use crate::orderbook::OrderBook;
use crate::settlement::FillPlan;

pub struct Exchange {
    config: ExchangeConfig,
    ledger: Ledger,
    book: OrderBook,
    bus: EventBus,
    clock: Arc<dyn Clock>,
}

impl Exchange {
    /// Build an exchange holding custody under `address`, stamped by the wall clock.
    ///
    /// # Errors
    /// Returns [`ExchangeError::Configuration`] for invalid fee settings or
    /// a zero exchange address, or a fee account equal to the exchange
    /// address.
    pub fn new(config: ExchangeConfig, address: Address) -> Result<Self> {
        Self::with_clock(config, address, Arc::new(SystemClock))
    }

    /// Like [`Exchange::new`], reading timestamps from `clock`.
    ///
    /// # Errors
    /// Same as [`Exchange::new`].
    pub fn with_clock(
        config: ExchangeConfig,
        address: Address,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        if address.is_zero() {
            return Err(ExchangeError::Configuration(
                "exchange address must not be the zero address".into(),
            ));
        }
        if config.fee_account == address {
            return Err(ExchangeError::Configuration(
                "fee account must differ from the exchange address".into(),
            ));
        }

        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            %address,
            fee_account = %config.fee_account,
            fee_percent = config.fee_percent,
            clock = clock.name(),
            "Exchange initialized"
        );
        Ok(Self {
            config,
            ledger: Ledger::new(address),
            book: OrderBook::new(),
            bus: EventBus::new(),
            clock,
        })
    }

    // =================================================================
    // Custody
    // =================================================================

    /// Pull `amount` of `token` from `caller` into custody.
    ///
    /// `caller` must have approved [`address`](Self::address) as spender
    /// on the token first.
    pub fn deposit<M: TokenMechanism + ?Sized>(
        &mut self,
        mechanism: &mut M,
        token: Address,
        amount: Amount,
        caller: Address,
    ) -> Result<DepositEvent> {
        let event = self.ledger.deposit(mechanism, token, amount, caller)?;
        self.bus.publish(ExchangeEvent::Deposit(event.clone()));
        Ok(event)
    }

    /// Release `amount` of `token` from custody back to `caller`.
    pub fn withdraw<M: TokenMechanism + ?Sized>(
        &mut self,
        mechanism: &mut M,
        token: Address,
        amount: Amount,
        caller: Address,
    ) -> Result<WithdrawEvent> {
        let event = self.ledger.withdraw(mechanism, token, amount, caller)?;
        self.bus.publish(ExchangeEvent::Withdraw(event.clone()));
        Ok(event)
    }

    #[must_use]
    pub fn balance_of(&self, token: Address, account: Address) -> Amount {
        self.ledger.balance_of(token, account)
    }

    // =================================================================
    // Orders
    // =================================================================

    /// Post a standing offer: `caller` gives `amount_give` of `token_give`
    /// for `amount_get` of `token_get`.
    ///
    /// Nothing is reserved; the creator may not hold `token_give` yet.
    ///
    /// # Errors
    /// Returns [`ExchangeError::InvalidAmount`] if either amount is zero.
    pub fn make_order(
        &mut self,
        token_get: Address,
        amount_get: Amount,
        token_give: Address,
        amount_give: Amount,
        caller: Address,
    ) -> Result<Order> {
        let timestamp = self.clock.now();
        let order = self
            .book
            .insert(caller, token_get, amount_get, token_give, amount_give, timestamp)?
            .clone();

        tracing::info!(
            order = %order.id,
            user = %caller,
            %token_get,
            amount_get,
            %token_give,
            amount_give,
            "Order created"
        );
        self.bus.publish(ExchangeEvent::Order(OrderEvent::from_order(&order)));
        Ok(order)
    }

    /// Cancel an open order. Only its creator may do so.
    ///
    /// # Errors
    /// [`ExchangeError::OrderNotFound`], [`ExchangeError::NotOrderOwner`] or
    /// [`ExchangeError::OrderNotOpen`], checked in that order.
    pub fn cancel_order(&mut self, id: OrderId, caller: Address) -> Result<CancelEvent> {
        let timestamp = self.clock.now();
        let order = self.book.cancel(id, caller).map_err(|err| {
            if matches!(err, ExchangeError::NotOrderOwner { .. }) {
                tracing::warn!(order = %id, caller = %caller, "Cancel by non-owner rejected");
            }
            err
        })?;

        let event = CancelEvent::from_order(order, timestamp);
        tracing::info!(order = %id, user = %caller, "Order cancelled");
        self.bus.publish(ExchangeEvent::Cancel(event.clone()));
        Ok(event)
    }

    /// Fill an open order in full.
    ///
    /// The filler pays `amount_get` of `token_get` to the creator plus the
    /// fee to the fee account, and receives `amount_give` of `token_give`.
    /// All three moves commit together or not at all.
    ///
    /// # Errors
    /// - [`ExchangeError::OrderNotFound`] / [`ExchangeError::OrderNotOpen`]
    /// - [`ExchangeError::CannotFillOwnOrder`] if `caller` created the order
    /// - [`ExchangeError::InsufficientBalance`] if either side is short;
    ///   the order stays open
    pub fn fill_order(&mut self, id: OrderId, caller: Address) -> Result<FillReceipt> {
        let timestamp = self.clock.now();
        let plan = FillPlan::new(self.book.open_order(id)?, caller, &self.config)?;

        plan.execute(&mut self.ledger).map_err(|err| {
            tracing::warn!(order = %id, filler = %caller, error = %err, "Fill rejected");
            err
        })?;
        let order = self.book.mark_filled(id)?;

        let trade = TradeEvent::from_fill(order, caller, timestamp);
        tracing::info!(
            order = %id,
            filler = %caller,
            creator = %plan.creator,
            fee = plan.fee,
            "Order filled"
        );
        self.bus.publish(ExchangeEvent::Trade(trade.clone()));
        Ok(FillReceipt {
            trade,
            fee: plan.fee,
            fee_account: plan.fee_account,
        })
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.book.order(id)
    }

    /// Number of orders ever created; ids `1..=order_count()` are all valid.
    #[must_use]
    pub fn order_count(&self) -> u64 {
        self.book.order_count()
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.book.orders()
    }

    pub fn open_orders(&self) -> impl Iterator<Item = &Order> {
        self.book.open_orders()
    }

    #[must_use]
    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    #[must_use]
    pub fn fee_account(&self) -> Address {
        self.config.fee_account
    }

    #[must_use]
    pub fn fee_percent(&self) -> u32 {
        self.config.fee_percent
    }

    /// Identity holding all custodied tokens in the token mechanism.
    #[must_use]
    pub fn address(&self) -> Address {
        self.ledger.address()
    }

    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    // =================================================================
    // Events
    // =================================================================

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ExchangeEvent> {
        self.bus.subscribe()
    }

    #[must_use]
    pub fn events(&self) -> &[ExchangeEvent] {
        self.bus.events()
    }

    pub fn drain_events(&mut self) -> Vec<ExchangeEvent> {
        self.bus.drain()
    }

    // =================================================================
    // Invariants
    // =================================================================

    /// Custodial total of `token` equals its deposits minus withdrawals.
    pub fn verify_supply(&self, token: Address) -> Result<()> {
        self.ledger.verify_supply(token)
    }

    pub fn verify_all_supplies(&self) -> Result<()> {
        self.ledger.verify_all_supplies()
    }

    /// The exchange's own holding in `mechanism` matches its custodial total.
    pub fn verify_custody<M: TokenMechanism + ?Sized>(
        &self,
        mechanism: &M,
        token: Address,
    ) -> Result<()> {
        self.ledger.verify_custody(mechanism, token)
    }
}

impl std::fmt::Debug for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exchange")
            .field("config", &self.config)
            .field("address", &self.ledger.address())
            .field("order_count", &self.book.order_count())
            .field("clock", &self.clock.name())
            .finish_non_exhaustive()
    }
}
