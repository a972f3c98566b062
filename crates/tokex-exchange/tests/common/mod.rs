//! Shared fixture for integration tests: a token registry with three
//! deployed tokens, an exchange on a manual clock, and named accounts.

#![allow(dead_code)]

use std::sync::Arc;

use tokex_exchange::{Exchange, ManualClock};
use tokex_token::TokenRegistry;
use tokex_types::constants::DEFAULT_TOKEN_SUPPLY;
use tokex_types::{Address, Amount, ExchangeConfig, TokenMechanism};

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("tokex_exchange=debug")
        .with_test_writer()
        .try_init()
        .ok();
}

pub struct Market {
    pub exchange: Exchange,
    pub registry: TokenRegistry,
    pub clock: Arc<ManualClock>,
    pub deployer: Address,
    pub fee_account: Address,
    pub dapp: Address,
    pub meth: Address,
    pub mdai: Address,
}

impl Market {
    pub fn new(fee_percent: u32) -> Self {
        init_tracing();
        let deployer = Address::from_label("deployer");
        let fee_account = Address::from_label("fee-account");
        let mut registry = TokenRegistry::new();
        let dapp = registry.deploy("Dapp University", "DAPP", DEFAULT_TOKEN_SUPPLY, deployer);
        let meth = registry.deploy("mETH", "mETH", DEFAULT_TOKEN_SUPPLY, deployer);
        let mdai = registry.deploy("mDAI", "mDAI", DEFAULT_TOKEN_SUPPLY, deployer);

        let clock = Arc::new(ManualClock::at_epoch());
        let exchange = Exchange::with_clock(
            ExchangeConfig::new(fee_account, fee_percent),
            Address::from_label("exchange"),
            clock.clone(),
        )
        .unwrap();

        Self {
            exchange,
            registry,
            clock,
            deployer,
            fee_account,
            dapp,
            meth,
            mdai,
        }
    }

    /// Hand `amount` of `token` from the deployer to `user` outside the exchange.
    pub fn airdrop(&mut self, token: Address, user: Address, amount: Amount) {
        self.registry
            .transfer(token, self.deployer, user, amount)
            .unwrap();
    }

    /// Airdrop, approve the exchange, and deposit.
    pub fn fund(&mut self, token: Address, user: Address, amount: Amount) {
        self.airdrop(token, user, amount);
        let spender = self.exchange.address();
        self.registry.approve(token, user, spender, amount).unwrap();
        self.exchange
            .deposit(&mut self.registry, token, amount, user)
            .unwrap();
    }

    /// Sum of every custodial balance `token` has among `accounts`.
    pub fn custodied(&self, token: Address, accounts: &[Address]) -> Amount {
        accounts
            .iter()
            .map(|a| self.exchange.balance_of(token, *a))
            .sum()
    }
}

pub fn user(n: u32) -> Address {
    Address::from_label(&format!("user{n}"))
}
