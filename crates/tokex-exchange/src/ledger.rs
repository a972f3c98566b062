//! Custodial balance ledger.
//!
//! Tracks how much of each token the exchange holds on behalf of each
//! account. Tokens enter through [`Ledger::deposit`] (pulled from the
//! owner via a prior allowance) and leave through [`Ledger::withdraw`].
//! Between those two points value only moves between entries, never in
//! or out, which [`SupplyConservation`] verifies.
//!
//! All mutations are atomic: either the full operation succeeds or
//! every entry is unchanged.

use std::collections::HashMap;

use tokex_types::{
    Address, Amount, DepositEvent, ExchangeError, Result, TokenMechanism, WithdrawEvent,
};

use crate::supply_conservation::SupplyConservation;

/// One internal movement of custody between two accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceTransfer {
    pub token: Address,
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
}

/// Per-(token, account) custodial balances.
#[derive(Debug)]
pub struct Ledger {
    /// Identity the ledger holds tokens under in the token mechanism.
    address: Address,
    /// `(token, account) -> amount`. Absent entries are zero.
    balances: HashMap<(Address, Address), Amount>,
    supply: SupplyConservation,
}

impl Ledger {
    /// Empty ledger holding tokens under `address`.
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            balances: HashMap::new(),
            supply: SupplyConservation::new(),
        }
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Pull `amount` of `token` from `caller` into custody.
    ///
    /// The caller must have approved the ledger's address as spender on the
    /// token beforehand.
    ///
    /// # Errors
    /// - [`ExchangeError::InvalidAmount`] for a zero amount
    /// - [`ExchangeError::SelfCustody`] if `caller` is the ledger's own address
    /// - [`ExchangeError::TransferFailed`] if the token mechanism refuses the pull
    /// - [`ExchangeError::Overflow`] if the credited balance would not fit
    pub fn deposit<M: TokenMechanism + ?Sized>(
        &mut self,
        mechanism: &mut M,
        token: Address,
        amount: Amount,
        caller: Address,
    ) -> Result<DepositEvent> {
        if amount == 0 {
            return Err(ExchangeError::InvalidAmount);
        }
        if caller == self.address {
            tracing::warn!(%token, user = %caller, amount, "Deposit from custody address rejected");
            return Err(ExchangeError::SelfCustody(caller));
        }
        let balance = self
            .balance_of(token, caller)
            .checked_add(amount)
            .ok_or(ExchangeError::Overflow)?;

        mechanism
            .transfer_from(token, self.address, caller, self.address, amount)
            .map_err(|source| {
                tracing::warn!(%token, user = %caller, amount, error = %source, "Deposit pull refused");
                ExchangeError::TransferFailed { token, source }
            })?;

        self.balances.insert((token, caller), balance);
        self.supply.record_deposit(token, amount);

        tracing::info!(%token, user = %caller, amount, balance, "Deposit");
        Ok(DepositEvent {
            token,
            user: caller,
            amount,
            balance,
        })
    }

    /// Release `amount` of `token` from `caller`'s custodial balance back to them.
    ///
    /// The entry is debited only after the token mechanism accepted the
    /// release.
    ///
    /// # Errors
    /// - [`ExchangeError::InvalidAmount`] for a zero amount
    /// - [`ExchangeError::SelfCustody`] if `caller` is the ledger's own address
    /// - [`ExchangeError::InsufficientBalance`] if the entry is short
    /// - [`ExchangeError::TransferFailed`] if the release is refused
    pub fn withdraw<M: TokenMechanism + ?Sized>(
        &mut self,
        mechanism: &mut M,
        token: Address,
        amount: Amount,
        caller: Address,
    ) -> Result<WithdrawEvent> {
        if amount == 0 {
            return Err(ExchangeError::InvalidAmount);
        }
        if caller == self.address {
            tracing::warn!(%token, user = %caller, amount, "Withdraw to custody address rejected");
            return Err(ExchangeError::SelfCustody(caller));
        }
        let available = self.balance_of(token, caller);
        if available < amount {
            tracing::warn!(%token, user = %caller, needed = amount, available, "Withdraw exceeds balance");
            return Err(ExchangeError::InsufficientBalance {
                token,
                account: caller,
                needed: amount,
                available,
            });
        }

        mechanism
            .transfer(token, self.address, caller, amount)
            .map_err(|source| {
                tracing::warn!(%token, user = %caller, amount, error = %source, "Withdraw release refused");
                ExchangeError::TransferFailed { token, source }
            })?;

        let balance = available - amount;
        self.balances.insert((token, caller), balance);
        self.supply.record_withdrawal(token, amount);

        tracing::info!(%token, user = %caller, amount, balance, "Withdraw");
        Ok(WithdrawEvent {
            token,
            user: caller,
            amount,
            balance,
        })
    }

    /// Custodial balance of `account` in `token`; zero when never credited.
    #[must_use]
    pub fn balance_of(&self, token: Address, account: Address) -> Amount {
        self.balances.get(&(token, account)).copied().unwrap_or(0)
    }

    /// Move custody of `amount` from one account to another. No external
    /// transfer happens.
    ///
    /// # Errors
    /// Returns [`ExchangeError::InsufficientBalance`] if `from` is short.
    pub fn transfer_balance(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        self.apply_transfers(&[BalanceTransfer {
            token,
            from,
            to,
            amount,
        }])
    }

    /// Apply `transfers` in order, all or nothing.
    ///
    /// Each step sees the effect of the previous ones, so a chain like
    /// "A pays B, B pays C" succeeds even if B started empty. On error no
    /// entry is touched.
    pub(crate) fn apply_transfers(&mut self, transfers: &[BalanceTransfer]) -> Result<()> {
        let mut staged: HashMap<(Address, Address), Amount> = HashMap::new();

        for t in transfers {
            let from_key = (t.token, t.from);
            let available = staged
                .get(&from_key)
                .copied()
                .unwrap_or_else(|| self.balance_of(t.token, t.from));
            if available < t.amount {
                tracing::warn!(
                    token = %t.token,
                    account = %t.from,
                    needed = t.amount,
                    available,
                    "Internal transfer rejected"
                );
                return Err(ExchangeError::InsufficientBalance {
                    token: t.token,
                    account: t.from,
                    needed: t.amount,
                    available,
                });
            }
            staged.insert(from_key, available - t.amount);

            let to_key = (t.token, t.to);
            let current = staged
                .get(&to_key)
                .copied()
                .unwrap_or_else(|| self.balance_of(t.token, t.to));
            let credited = current
                .checked_add(t.amount)
                .ok_or(ExchangeError::Overflow)?;
            staged.insert(to_key, credited);
        }

        for t in transfers {
            tracing::debug!(token = %t.token, from = %t.from, to = %t.to, amount = t.amount, "Custody moved");
        }
        self.balances.extend(staged);
        Ok(())
    }

    /// Sum of every custodial entry for `token`.
    #[must_use]
    pub fn total_supply(&self, token: Address) -> Amount {
        self.balances
            .iter()
            .filter(|((t, _), _)| *t == token)
            .fold(0, |acc: Amount, (_, amount)| acc.saturating_add(*amount))
    }

    /// Check the custodial total for `token` against deposits minus withdrawals.
    ///
    /// # Errors
    /// Returns [`ExchangeError::SupplyInvariantViolation`] on mismatch.
    pub fn verify_supply(&self, token: Address) -> Result<()> {
        self.supply.verify(token, self.total_supply(token))
    }

    /// Check every token that ever crossed the custody boundary.
    pub fn verify_all_supplies(&self) -> Result<()> {
        self.supply
            .tracked_tokens()
            .into_iter()
            .try_for_each(|token| self.verify_supply(token))
    }

    /// Reconcile the ledger's own holding in the token mechanism with the
    /// custodial entries for `token`.
    ///
    /// # Errors
    /// Returns [`ExchangeError::CustodyMismatch`] when they differ.
    pub fn verify_custody<M: TokenMechanism + ?Sized>(
        &self,
        mechanism: &M,
        token: Address,
    ) -> Result<()> {
        let custodied = self.total_supply(token);
        let held = mechanism.balance_of(token, self.address);
        if custodied != held {
            tracing::error!(%token, custodied, held, "Custody mismatch");
            return Err(ExchangeError::CustodyMismatch {
                token,
                custodied,
                held,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn supply(&self) -> &SupplyConservation {
        &self.supply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokex_types::{TokenError, tokens};

    /// Minimal single-token mechanism: balances and allowances keyed by account.
    #[derive(Default)]
    struct MockToken {
        balances: HashMap<Address, Amount>,
        allowances: HashMap<(Address, Address), Amount>,
        refuse_transfers: bool,
    }

    impl TokenMechanism for MockToken {
        fn transfer_from(
            &mut self,
            _token: Address,
            spender: Address,
            from: Address,
            to: Address,
            amount: Amount,
        ) -> std::result::Result<(), TokenError> {
            let allowed = self.allowance(Address::ZERO, from, spender);
            if allowed < amount {
                return Err(TokenError::InsufficientAllowance {
                    needed: amount,
                    allowed,
                });
            }
            self.transfer(Address::ZERO, from, to, amount)?;
            self.allowances.insert((from, spender), allowed - amount);
            Ok(())
        }

        fn transfer(
            &mut self,
            _token: Address,
            from: Address,
            to: Address,
            amount: Amount,
        ) -> std::result::Result<(), TokenError> {
            if self.refuse_transfers {
                return Err(TokenError::InvalidRecipient);
            }
            let available = self.balances.get(&from).copied().unwrap_or(0);
            if available < amount {
                return Err(TokenError::InsufficientBalance {
                    needed: amount,
                    available,
                });
            }
            *self.balances.entry(from).or_insert(0) -= amount;
            *self.balances.entry(to).or_insert(0) += amount;
            Ok(())
        }

        fn balance_of(&self, _token: Address, account: Address) -> Amount {
            self.balances.get(&account).copied().unwrap_or(0)
        }

        fn allowance(&self, _token: Address, owner: Address, spender: Address) -> Amount {
            self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
        }
    }

    struct Fixture {
        ledger: Ledger,
        token: MockToken,
        meth: Address,
        user: Address,
    }

    fn funded() -> Fixture {
        let ledger = Ledger::new(Address::from_label("exchange"));
        let user = Address::from_label("user1");
        let mut token = MockToken::default();
        token.balances.insert(user, tokens(100));
        token
            .allowances
            .insert((user, ledger.address()), tokens(100));
        Fixture {
            ledger,
            token,
            meth: Address::from_label("mETH"),
            user,
        }
    }

    #[test]
    fn deposit_credits_and_pulls() {
        let mut f = funded();
        let event = f
            .ledger
            .deposit(&mut f.token, f.meth, tokens(10), f.user)
            .unwrap();
        assert_eq!(event.amount, tokens(10));
        assert_eq!(event.balance, tokens(10));
        assert_eq!(f.ledger.balance_of(f.meth, f.user), tokens(10));
        assert_eq!(f.token.balance_of(f.meth, f.ledger.address()), tokens(10));
        f.ledger.verify_supply(f.meth).unwrap();
        f.ledger.verify_custody(&f.token, f.meth).unwrap();
    }

    #[test]
    fn deposit_without_allowance_fails_cleanly() {
        let mut f = funded();
        f.token.allowances.clear();
        let err = f
            .ledger
            .deposit(&mut f.token, f.meth, tokens(10), f.user)
            .unwrap_err();
        assert!(matches!(err, ExchangeError::TransferFailed { .. }));
        assert_eq!(f.ledger.balance_of(f.meth, f.user), 0);
        assert_eq!(f.ledger.supply().total_deposits(f.meth), 0);
    }

    #[test]
    fn zero_amounts_rejected() {
        let mut f = funded();
        assert_eq!(
            f.ledger.deposit(&mut f.token, f.meth, 0, f.user).unwrap_err(),
            ExchangeError::InvalidAmount
        );
        assert_eq!(
            f.ledger.withdraw(&mut f.token, f.meth, 0, f.user).unwrap_err(),
            ExchangeError::InvalidAmount
        );
    }

    #[test]
    fn custody_address_cannot_deposit_into_itself() {
        let mut f = funded();
        f.ledger
            .deposit(&mut f.token, f.meth, tokens(10), f.user)
            .unwrap();
        let ex = f.ledger.address();
        f.token.allowances.insert((ex, ex), u128::MAX);

        let err = f
            .ledger
            .deposit(&mut f.token, f.meth, tokens(10), ex)
            .unwrap_err();
        assert_eq!(err, ExchangeError::SelfCustody(ex));
        assert_eq!(f.ledger.balance_of(f.meth, ex), 0);
        assert_eq!(f.ledger.total_supply(f.meth), tokens(10));
        assert_eq!(f.ledger.supply().total_deposits(f.meth), tokens(10));
        f.ledger.verify_supply(f.meth).unwrap();
        f.ledger.verify_custody(&f.token, f.meth).unwrap();
    }

    #[test]
    fn custody_address_cannot_withdraw() {
        let mut f = funded();
        f.ledger
            .deposit(&mut f.token, f.meth, tokens(10), f.user)
            .unwrap();
        let ex = f.ledger.address();
        f.ledger
            .transfer_balance(f.meth, f.user, ex, tokens(4))
            .unwrap();

        let err = f
            .ledger
            .withdraw(&mut f.token, f.meth, tokens(4), ex)
            .unwrap_err();
        assert_eq!(err, ExchangeError::SelfCustody(ex));
        assert_eq!(f.ledger.balance_of(f.meth, ex), tokens(4));
        assert_eq!(f.ledger.supply().total_withdrawals(f.meth), 0);
        assert_eq!(f.token.balance_of(f.meth, ex), tokens(10));
        f.ledger.verify_supply(f.meth).unwrap();
        f.ledger.verify_custody(&f.token, f.meth).unwrap();
    }

    #[test]
    fn withdraw_debits_and_releases() {
        let mut f = funded();
        f.ledger
            .deposit(&mut f.token, f.meth, tokens(10), f.user)
            .unwrap();
        let event = f
            .ledger
            .withdraw(&mut f.token, f.meth, tokens(4), f.user)
            .unwrap();
        assert_eq!(event.balance, tokens(6));
        assert_eq!(f.token.balance_of(f.meth, f.user), tokens(94));
        f.ledger.verify_supply(f.meth).unwrap();
        f.ledger.verify_custody(&f.token, f.meth).unwrap();
    }

    #[test]
    fn withdraw_more_than_balance_fails() {
        let mut f = funded();
        f.ledger
            .deposit(&mut f.token, f.meth, tokens(10), f.user)
            .unwrap();
        let err = f
            .ledger
            .withdraw(&mut f.token, f.meth, tokens(11), f.user)
            .unwrap_err();
        assert_eq!(
            err,
            ExchangeError::InsufficientBalance {
                token: f.meth,
                account: f.user,
                needed: tokens(11),
                available: tokens(10),
            }
        );
    }

    #[test]
    fn refused_release_keeps_balance() {
        let mut f = funded();
        f.ledger
            .deposit(&mut f.token, f.meth, tokens(10), f.user)
            .unwrap();
        f.token.refuse_transfers = true;
        let err = f
            .ledger
            .withdraw(&mut f.token, f.meth, tokens(5), f.user)
            .unwrap_err();
        assert!(matches!(err, ExchangeError::TransferFailed { .. }));
        assert_eq!(f.ledger.balance_of(f.meth, f.user), tokens(10));
        f.ledger.verify_supply(f.meth).unwrap();
    }

    #[test]
    fn transfer_balance_moves_custody() {
        let mut f = funded();
        let other = Address::from_label("user2");
        f.ledger
            .deposit(&mut f.token, f.meth, tokens(10), f.user)
            .unwrap();
        f.ledger
            .transfer_balance(f.meth, f.user, other, tokens(3))
            .unwrap();
        assert_eq!(f.ledger.balance_of(f.meth, f.user), tokens(7));
        assert_eq!(f.ledger.balance_of(f.meth, other), tokens(3));
        f.ledger.verify_supply(f.meth).unwrap();
    }

    #[test]
    fn failed_batch_leaves_no_trace() {
        let mut f = funded();
        let b = Address::from_label("user2");
        let c = Address::from_label("user3");
        f.ledger
            .deposit(&mut f.token, f.meth, tokens(10), f.user)
            .unwrap();
        let err = f
            .ledger
            .apply_transfers(&[
                BalanceTransfer {
                    token: f.meth,
                    from: f.user,
                    to: b,
                    amount: tokens(8),
                },
                BalanceTransfer {
                    token: f.meth,
                    from: f.user,
                    to: c,
                    amount: tokens(3),
                },
            ])
            .unwrap_err();
        assert!(matches!(err, ExchangeError::InsufficientBalance { .. }));
        assert_eq!(f.ledger.balance_of(f.meth, f.user), tokens(10));
        assert_eq!(f.ledger.balance_of(f.meth, b), 0);
    }

    #[test]
    fn chained_transfers_see_earlier_steps() {
        let mut f = funded();
        let b = Address::from_label("user2");
        let c = Address::from_label("user3");
        f.ledger
            .deposit(&mut f.token, f.meth, tokens(10), f.user)
            .unwrap();
        f.ledger
            .apply_transfers(&[
                BalanceTransfer {
                    token: f.meth,
                    from: f.user,
                    to: b,
                    amount: tokens(10),
                },
                BalanceTransfer {
                    token: f.meth,
                    from: b,
                    to: c,
                    amount: tokens(4),
                },
            ])
            .unwrap();
        assert_eq!(f.ledger.balance_of(f.meth, b), tokens(6));
        assert_eq!(f.ledger.balance_of(f.meth, c), tokens(4));
        f.ledger.verify_all_supplies().unwrap();
    }

    #[test]
    fn custody_mismatch_detected() {
        let mut f = funded();
        f.ledger
            .deposit(&mut f.token, f.meth, tokens(10), f.user)
            .unwrap();
        // Tokens sent straight to the ledger's address bypass custody accounting.
        f.token
            .transfer(f.meth, f.user, f.ledger.address(), tokens(1))
            .unwrap();
        let err = f.ledger.verify_custody(&f.token, f.meth).unwrap_err();
        assert_eq!(
            err,
            ExchangeError::CustodyMismatch {
                token: f.meth,
                custodied: tokens(10),
                held: tokens(11),
            }
        );
    }
}
