//! Fill settlement.
//!
//! A fill is three custody moves that must happen together:
//! 1. filler → creator: `amount_get` of `token_get`
//! 2. filler → fee account: the fee, also in `token_get`
//! 3. creator → filler: `amount_give` of `token_give`
//!
//! The plan is built first and then handed to the ledger as one atomic
//! batch. If any move lacks funds, nothing moves and the order stays open.

use tokex_types::{Address, Amount, ExchangeConfig, ExchangeError, Order, OrderId, Result};

use crate::ledger::{BalanceTransfer, Ledger};

/// The balance moves that settle one fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillPlan {
    pub order_id: OrderId,
    pub filler: Address,
    pub creator: Address,
    pub fee: Amount,
    pub fee_account: Address,
    transfers: Vec<BalanceTransfer>,
}

impl FillPlan {
    /// Plan a fill of `order` by `filler` under the exchange's fee settings.
    ///
    /// # Errors
    /// - [`ExchangeError::CannotFillOwnOrder`] if `filler` created the order
    /// - [`ExchangeError::Overflow`] if the fee computation overflows
    pub fn new(order: &Order, filler: Address, config: &ExchangeConfig) -> Result<Self> {
        if order.user == filler {
            return Err(ExchangeError::CannotFillOwnOrder(order.id));
        }
        let fee = config.fee_for(order.amount_get)?;

        let mut transfers = vec![BalanceTransfer {
            token: order.token_get,
            from: filler,
            to: order.user,
            amount: order.amount_get,
        }];
        if fee > 0 {
            transfers.push(BalanceTransfer {
                token: order.token_get,
                from: filler,
                to: config.fee_account,
                amount: fee,
            });
        }
        transfers.push(BalanceTransfer {
            token: order.token_give,
            from: order.user,
            to: filler,
            amount: order.amount_give,
        });

        Ok(Self {
            order_id: order.id,
            filler,
            creator: order.user,
            fee,
            fee_account: config.fee_account,
            transfers,
        })
    }

    /// Custody moves of the fill in execution order.
    #[must_use]
    pub fn transfers(&self) -> &[BalanceTransfer] {
        &self.transfers
    }

    /// Total `token_get` the filler needs: price plus fee.
    #[must_use]
    pub fn filler_cost(&self) -> Amount {
        self.transfers
            .iter()
            .filter(|t| t.from == self.filler)
            .fold(0, |acc: Amount, t| acc.saturating_add(t.amount))
    }

    /// Apply every move of the plan to `ledger`, or none of them.
    pub(crate) fn execute(&self, ledger: &mut Ledger) -> Result<()> {
        ledger.apply_transfers(&self.transfers)
    }
}
