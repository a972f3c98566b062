//! A single fungible token: metadata, balances and allowances.
//!
//! The whole supply is minted to the deployer at construction. Transfers
//! to the zero address are rejected. An allowance of `u128::MAX` is treated
//! as unlimited and never decremented.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokex_types::constants::TOKEN_DECIMALS;
use tokex_types::{Address, Amount, TokenError, tokens};

/// Log entries produced by token operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenEvent {
    Transfer {
        from: Address,
        to: Address,
        #[serde(with = "tokex_types::amount::as_string")]
        amount: Amount,
    },
    Approval {
        owner: Address,
        spender: Address,
        #[serde(with = "tokex_types::amount::as_string")]
        amount: Amount,
    },
}

#[derive(Debug)]
pub struct Token {
    address: Address,
    name: String,
    symbol: String,
    total_supply: Amount,
    balances: HashMap<Address, Amount>,
    /// (owner, spender) -> remaining allowance
    allowances: HashMap<(Address, Address), Amount>,
    events: Vec<TokenEvent>,
}

impl Token {
    /// Deploy a token and mint `whole_supply` whole tokens to `deployer`.
    pub fn new(
        address: Address,
        name: impl Into<String>,
        symbol: impl Into<String>,
        whole_supply: u64,
        deployer: Address,
    ) -> Self {
        let total_supply = tokens(whole_supply);
        let mut balances = HashMap::new();
        balances.insert(deployer, total_supply);
        Self {
            address,
            name: name.into(),
            symbol: symbol.into(),
            total_supply,
            balances,
            allowances: HashMap::new(),
            events: vec![TokenEvent::Transfer {
                from: Address::ZERO,
                to: deployer,
                amount: total_supply,
            }],
        }
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub fn decimals(&self) -> u32 {
        TOKEN_DECIMALS
    }

    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    #[must_use]
    pub fn balance_of(&self, account: Address) -> Amount {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    /// Move `amount` from `from` to `to`.
    pub fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<(), TokenError> {
        tracing::trace!(token = %self.symbol, %from, %to, amount, "transfer");
        self.move_balance(from, to, amount)
    }

    /// Set `spender`'s allowance on `owner`'s balance, replacing any previous value.
    pub fn approve(&mut self, owner: Address, spender: Address, amount: Amount) {
        tracing::trace!(token = %self.symbol, %owner, %spender, amount, "approve");
        self.allowances.insert((owner, spender), amount);
        self.events.push(TokenEvent::Approval {
            owner,
            spender,
            amount,
        });
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`.
    ///
    /// Allowance and balances are checked before anything changes.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        tracing::trace!(token = %self.symbol, %spender, %from, %to, amount, "transfer_from");
        let allowed = self.allowance(from, spender);
        if amount > allowed {
            return Err(TokenError::InsufficientAllowance {
                needed: amount,
                allowed,
            });
        }

        self.move_balance(from, to, amount)?;

        if allowed != Amount::MAX {
            self.allowances.insert((from, spender), allowed - amount);
        }
        Ok(())
    }

    /// All events since deployment (or the last drain).
    #[must_use]
    pub fn events(&self) -> &[TokenEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<TokenEvent> {
        std::mem::take(&mut self.events)
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: Amount) -> Result<(), TokenError> {
        if to.is_zero() {
            return Err(TokenError::InvalidRecipient);
        }

        let available = self.balance_of(from);
        if amount > available {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if from != to {
            let credited = self
                .balance_of(to)
                .checked_add(amount)
                .ok_or(TokenError::Overflow)?;
            self.balances.insert(from, available - amount);
            self.balances.insert(to, credited);
        }

        self.events.push(TokenEvent::Transfer { from, to, amount });
        Ok(())
    }
}
