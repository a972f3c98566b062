//! # tokex-token
//!
//! Reference implementation of the fungible token mechanism the exchange
//! custodies against.
//!
//! - [`Token`]: a single fungible token with balances, allowances,
//!   `transfer`, `approve` and `transfer_from`
//! - [`TokenRegistry`]: many deployed tokens addressed by [`Address`],
//!   implementing [`TokenMechanism`] for the ledger
//!
//! [`Address`]: tokex_types::Address
//! [`TokenMechanism`]: tokex_types::TokenMechanism

pub mod registry;
pub mod token;

pub use registry::TokenRegistry;
pub use token::{Token, TokenEvent};
