//! Supply conservation invariant checker.
//!
//! Invariant enforced after every committed operation:
//! ```text
//! ∀ token: Σ balances[token][*] == Σ deposits(token) - Σ withdrawals(token)
//! ```
//!
//! Fills and cancels move no value across the custody boundary, so only
//! deposits and withdrawals change the expected supply.

use std::collections::{BTreeSet, HashMap};

use tokex_types::{Address, Amount, ExchangeError, Result};

/// Per-token deposit and withdrawal totals since the ledger was created.
#[derive(Debug, Default)]
pub struct SupplyConservation {
    deposits: HashMap<Address, Amount>,
    withdrawals: HashMap<Address, Amount>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the running deposit total for `token`.
    pub fn record_deposit(&mut self, token: Address, amount: Amount) {
        let total = self.deposits.entry(token).or_insert(0);
        *total = total.saturating_add(amount);
    }

    /// Add `amount` to the running withdrawal total for `token`.
    pub fn record_withdrawal(&mut self, token: Address, amount: Amount) {
        let total = self.withdrawals.entry(token).or_insert(0);
        *total = total.saturating_add(amount);
    }

    #[must_use]
    pub fn total_deposits(&self, token: Address) -> Amount {
        self.deposits.get(&token).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_withdrawals(&self, token: Address) -> Amount {
        self.withdrawals.get(&token).copied().unwrap_or(0)
    }

    /// Deposits minus withdrawals, or `None` if more left than ever arrived.
    #[must_use]
    pub fn expected_supply(&self, token: Address) -> Option<Amount> {
        self.total_deposits(token)
            .checked_sub(self.total_withdrawals(token))
    }

    /// Compare the ledger's actual custodial total for `token` with the
    /// expected supply.
    ///
    /// # Errors
    /// Returns [`ExchangeError::SupplyInvariantViolation`] on any mismatch.
    pub fn verify(&self, token: Address, actual_supply: Amount) -> Result<()> {
        let deposited = self.total_deposits(token);
        let withdrawn = self.total_withdrawals(token);
        match self.expected_supply(token) {
            Some(expected) if expected == actual_supply => Ok(()),
            Some(expected) => Err(ExchangeError::SupplyInvariantViolation {
                reason: format!(
                    "token {token}: actual supply {actual_supply} != expected {expected} \
                     (deposits={deposited}, withdrawals={withdrawn})"
                ),
            }),
            None => Err(ExchangeError::SupplyInvariantViolation {
                reason: format!(
                    "token {token}: withdrawals {withdrawn} exceed deposits {deposited}"
                ),
            }),
        }
    }

    /// Every token that has ever crossed the custody boundary, in address order.
    #[must_use]
    pub fn tracked_tokens(&self) -> Vec<Address> {
        let tokens: BTreeSet<Address> = self
            .deposits
            .keys()
            .chain(self.withdrawals.keys())
            .copied()
            .collect();
        tokens.into_iter().collect()
    }
}
