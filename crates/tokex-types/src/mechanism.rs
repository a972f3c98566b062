//! The external fungible token mechanism the ledger custodies against.
//!
//! The ledger never owns token supply. It pulls deposits through an
//! allowance the owner granted beforehand and releases withdrawals with a
//! plain transfer from its own holding.

use crate::{Address, Amount, TokenError};

/// Per-token transfer surface exposed by the token collaborator.
///
/// Implementations must leave balances and allowances untouched when they
/// return an error.
pub trait TokenMechanism {
    /// Move `amount` from `from` to `to`, spending `spender`'s allowance on `from`.
    fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TokenError>;

    /// Move `amount` from `from`'s own holding to `to`.
    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TokenError>;

    /// External (non-custodial) holding of `account`.
    fn balance_of(&self, token: Address, account: Address) -> Amount;

    /// Amount `spender` may still pull from `owner`.
    fn allowance(&self, token: Address, owner: Address, spender: Address) -> Amount;
}
