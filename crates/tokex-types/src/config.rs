//! Construction-time configuration for an exchange.

use serde::{Deserialize, Serialize};

use crate::{Address, Amount, ExchangeError, Result, constants};

/// Fee settings fixed when the exchange is built. Immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeConfig {
    /// Account credited with every fill fee.
    pub fee_account: Address,
    /// Integer percentage of `amount_get` charged to the filler (10 = 10%).
    pub fee_percent: u32,
}

impl ExchangeConfig {
    #[must_use]
    pub fn new(fee_account: Address, fee_percent: u32) -> Self {
        Self {
            fee_account,
            fee_percent,
        }
    }

    /// Parse and validate a JSON document such as
    /// `{"feeAccount": "0x…", "feePercent": 10}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns [`ExchangeError::Configuration`] for a zero fee account or a
    /// fee above [`constants::MAX_FEE_PERCENT`].
    pub fn validate(&self) -> Result<()> {
        if self.fee_account.is_zero() {
            return Err(ExchangeError::Configuration(
                "fee account must not be the zero address".into(),
            ));
        }
        if self.fee_percent > constants::MAX_FEE_PERCENT {
            return Err(ExchangeError::Configuration(format!(
                "fee percent {} exceeds {}",
                self.fee_percent,
                constants::MAX_FEE_PERCENT
            )));
        }
        Ok(())
    }

    /// Fee owed on a fill of `amount_get`: `amount_get * fee_percent / 100`, rounded down.
    ///
    /// # Errors
    /// Returns [`ExchangeError::Overflow`] if the product exceeds `u128`.
    pub fn fee_for(&self, amount_get: Amount) -> Result<Amount> {
        amount_get
            .checked_mul(Amount::from(self.fee_percent))
            .map(|scaled| scaled / constants::FEE_DENOMINATOR)
            .ok_or(ExchangeError::Overflow)
    }
}
