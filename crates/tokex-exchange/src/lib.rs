//! # tokex-exchange
//!
//! Custodial exchange core: users deposit tokens into the [`Ledger`], post
//! all-or-nothing offers to the [`OrderBook`], and any other user may fill
//! an open offer. The filler pays a percentage fee on top of the price.
//!
//! ## Architecture
//!
//! - [`ledger`]: per-(token, account) custodial balances, deposits pulled
//!   through the token mechanism, atomic internal transfers
//! - [`supply_conservation`]: deposits minus withdrawals per token
//! - [`orderbook`]: order records, id counter, status transitions
//! - [`settlement`]: the three custody moves of a fill as one plan
//! - [`events`]: append-only event log plus broadcast subscribers
//! - [`clock`]: wall or manual time for timestamps
//! - [`exchange`]: the [`Exchange`] state object exposing every operation

pub mod clock;
pub mod events;
pub mod exchange;
pub mod ledger;
pub mod orderbook;
pub mod settlement;
pub mod supply_conservation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use events::EventBus;
pub use exchange::Exchange;
pub use ledger::{BalanceTransfer, Ledger};
pub use orderbook::OrderBook;
pub use settlement::FillPlan;
pub use supply_conservation::SupplyConservation;
