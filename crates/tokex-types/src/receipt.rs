//! Result objects returned synchronously by exchange operations.
//!
//! Most operations return the event payload they emitted. A fill also
//! reports what the filler paid on top of the order price.

use serde::{Deserialize, Serialize};

use crate::{Address, Amount, TradeEvent};

/// Outcome of a successful fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillReceipt {
    /// The emitted `Trade` event.
    pub trade: TradeEvent,
    /// Fee charged to the filler in `token_get`.
    #[serde(with = "crate::amount::as_string")]
    pub fee: Amount,
    /// Account credited with the fee.
    pub fee_account: Address,
}

impl FillReceipt {
    /// Total `token_get` debited from the filler (price plus fee).
    #[must_use]
    pub fn filler_paid(&self) -> Amount {
        self.trade.amount_get.saturating_add(self.fee)
    }
}
