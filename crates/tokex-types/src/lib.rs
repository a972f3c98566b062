//! # tokex-types
//!
//! Shared types, errors, and configuration for the **tokex** exchange core.
//!
//! This crate is the leaf dependency of the workspace. Every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`OrderId`]
//! - **Amounts**: [`Amount`] plus the [`tokens`], [`parse_units`] and [`format_units`] helpers
//! - **Order model**: [`Order`], [`OrderStatus`]
//! - **Events**: [`ExchangeEvent`] and its payloads, [`FillReceipt`]
//! - **Token collaborator**: the [`TokenMechanism`] trait
//! - **Configuration**: [`ExchangeConfig`]
//! - **Errors**: [`ExchangeError`] with `TKX_ERR_` prefix codes, [`TokenError`]
//! - **Constants**: system-wide limits and defaults

pub mod amount;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod mechanism;
pub mod order;
pub mod receipt;

// Re-export all primary types at crate root for ergonomic imports:
//   use tokex_types::{Address, Order, OrderStatus, ExchangeEvent, ...};

pub use amount::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use mechanism::*;
pub use order::*;
pub use receipt::*;

// Constants are accessed via `tokex_types::constants::FOO`
// (not re-exported to avoid name collisions).
