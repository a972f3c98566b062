//! Registry of deployed tokens, addressed by token identity.

use std::collections::BTreeMap;

use tokex_types::{Address, Amount, TokenError, TokenMechanism};

use crate::token::Token;

/// All tokens known to the environment the exchange runs in.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    tokens: BTreeMap<Address, Token>,
}

impl TokenRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploy a new token, minting `whole_supply` whole tokens to `deployer`.
    ///
    /// The token address is derived from the symbol and deployment index, so
    /// the same deployment sequence always yields the same addresses.
    pub fn deploy(
        &mut self,
        name: &str,
        symbol: &str,
        whole_supply: u64,
        deployer: Address,
    ) -> Address {
        let address = Address::from_label(&format!("token:{symbol}:{}", self.tokens.len()));
        tracing::debug!(%address, symbol, whole_supply, %deployer, "token deployed");
        self.tokens
            .insert(address, Token::new(address, name, symbol, whole_supply, deployer));
        address
    }

    #[must_use]
    pub fn token(&self, address: Address) -> Option<&Token> {
        self.tokens.get(&address)
    }

    #[must_use]
    pub fn token_mut(&mut self, address: Address) -> Option<&mut Token> {
        self.tokens.get_mut(&address)
    }

    /// Grant `spender` an allowance on `owner`'s holding of `token`.
    pub fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        self.lookup(token)?.approve(owner, spender, amount);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn lookup(&mut self, token: Address) -> Result<&mut Token, TokenError> {
        self.tokens
            .get_mut(&token)
            .ok_or(TokenError::UnknownToken(token))
    }
}

impl TokenMechanism for TokenRegistry {
    fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        self.lookup(token)?.transfer_from(spender, from, to, amount)
    }

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        self.lookup(token)?.transfer(from, to, amount)
    }

    fn balance_of(&self, token: Address, account: Address) -> Amount {
        self.tokens
            .get(&token)
            .map_or(0, |t| t.balance_of(account))
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> Amount {
        self.tokens
            .get(&token)
            .map_or(0, |t| t.allowance(owner, spender))
    }
}
