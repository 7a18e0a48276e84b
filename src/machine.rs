// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! The cash machine.
//!
//! [`AtMachine::withdraw`] runs a fixed sequence; the first failing step ends
//! the attempt and the vault is only touched by the last one.
//!
//! 1. **Currency**: the request must be in the machine currency.
//! 2. **Authorize**: the bank confirms the PIN/card pair.
//! 3. **Charge**: the bank debits the account.
//! 4. **Allocate**: pick notes, largest denomination first, within stock.
//! 5. **Commit**: take the notes out of the vault.
//!
//! # Thread Safety
//!
//! Steps 4 and 5 run under the vault lock, so concurrent withdrawals cannot
//! both claim the same notes. The bank is never called while the lock is held.

use crate::bank::Bank;
use crate::banknote::{Banknote, BanknotesPack};
use crate::base::{Card, Currency, PinCode};
use crate::deposit::MoneyDeposit;
use crate::error::{AtmOperationError, DepositError, ErrorCode};
use crate::money::Money;
use crate::withdrawal::Withdrawal;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

/// A cash machine bound to one bank and one currency.
///
/// Until [`AtMachine::set_deposit`] is called the vault is empty and every
/// withdrawal ends with [`ErrorCode::WrongAmount`].
pub struct AtMachine<B> {
    bank: B,
    currency: Currency,
    deposit: Mutex<MoneyDeposit>,
}

impl<B: Bank> AtMachine<B> {
    pub fn new(bank: B, currency: Currency) -> Self {
        Self {
            bank,
            currency,
            deposit: Mutex::new(MoneyDeposit::empty(currency)),
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    /// Replaces the vault.
    ///
    /// # Errors
    ///
    /// [`DepositError::CurrencyMismatch`] if the deposit is not in the machine
    /// currency; the current vault is kept.
    pub fn set_deposit(&self, deposit: MoneyDeposit) -> Result<(), DepositError> {
        if deposit.currency() != self.currency {
            return Err(DepositError::CurrencyMismatch {
                expected: self.currency,
                actual: deposit.currency(),
            });
        }
        info!(total = %deposit.total(), currency = %self.currency, "vault loaded");
        *self.deposit.lock() = deposit;
        Ok(())
    }

    /// Snapshot of the vault.
    pub fn deposit(&self) -> MoneyDeposit {
        self.deposit.lock().clone()
    }

    /// Withdraws `amount` from the account behind `card`.
    ///
    /// # Errors
    ///
    /// - [`ErrorCode::WrongCurrency`] - `amount` is not in the machine currency.
    /// - [`ErrorCode::Authorization`] - the bank rejected `pin` for `card`.
    /// - [`ErrorCode::NoFundsOnAccount`] - the bank rejected the charge.
    /// - [`ErrorCode::WrongAmount`] - `amount` has a fractional part or the
    ///   vault cannot make it up exactly.
    pub fn withdraw(
        &self,
        pin: &PinCode,
        card: &Card,
        amount: &Money,
    ) -> Result<Withdrawal, AtmOperationError> {
        if amount.currency() != self.currency {
            warn!(%card, %amount, "rejected: wrong currency");
            return Err(AtmOperationError::new(
                ErrorCode::WrongCurrency,
                format!(
                    "machine dispenses {}, requested {}",
                    self.currency,
                    amount.currency()
                ),
            ));
        }

        debug!(%card, "authorizing");
        self.bank.authorize(pin, card).inspect_err(|e| {
            warn!(%card, error = %e, "rejected: authorization");
        })?;

        debug!(%card, %amount, "charging");
        self.bank.charge(card, amount).inspect_err(|e| {
            warn!(%card, error = %e, "rejected: charge");
        })?;

        // The account is debited from here on; a failure below is not reversed.
        let withdrawal = self.dispense(amount).inspect_err(|e| {
            warn!(%card, %amount, error = %e, "charged but nothing dispensed");
        })?;

        info!(%card, %amount, notes = withdrawal.len(), "withdrawal complete");
        Ok(withdrawal)
    }

    /// Allocation and commit, under one lock acquisition.
    fn dispense(&self, amount: &Money) -> Result<Withdrawal, AtmOperationError> {
        let units = amount
            .whole_units()
            .filter(|units| *units > 0)
            .ok_or_else(|| {
                AtmOperationError::new(
                    ErrorCode::WrongAmount,
                    format!("{} is not a positive whole number of units", amount),
                )
            })?;

        let mut deposit = self.deposit.lock();
        let packs = allocate(&deposit, units).ok_or_else(|| {
            AtmOperationError::new(
                ErrorCode::WrongAmount,
                format!("{} cannot be paid out from the vault", amount),
            )
        })?;

        deposit
            .release(&packs)
            .map_err(|e| AtmOperationError::new(ErrorCode::WrongAmount, e.to_string()))?;
        Ok(Withdrawal::from_packs(self.currency, &packs))
    }
}

/// Greedy largest-first allocation bounded by stock.
///
/// Returns one pack per denomination used, in dispensing order, or `None` if
/// the greedy pass leaves a remainder. There is no backtracking: with some
/// denomination sets an amount that a different combination could pay is
/// still rejected.
fn allocate(deposit: &MoneyDeposit, units: u64) -> Option<Vec<BanknotesPack>> {
    let mut remaining = units;
    let mut packs = Vec::new();

    for banknote in Banknote::series(deposit.currency()) {
        if remaining == 0 {
            break;
        }
        let value = u64::from(banknote.value());
        let available = u64::from(deposit.available(banknote));
        let used = (remaining / value).min(available);
        if used > 0 {
            // `used <= available`, which came from a u32.
            packs.push(BanknotesPack::create(used as u32, banknote));
            remaining -= used * value;
        }
    }

    (remaining == 0).then_some(packs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deposit(packs: &[(u32, Banknote)]) -> MoneyDeposit {
        MoneyDeposit::create(
            Currency::Pln,
            packs
                .iter()
                .map(|(count, banknote)| BanknotesPack::create(*count, *banknote)),
        )
        .unwrap()
    }

    #[test]
    fn allocate_prefers_large_notes() {
        let vault = deposit(&[(10, Banknote::Pl200), (10, Banknote::Pl100)]);
        assert_eq!(
            allocate(&vault, 500),
            Some(vec![
                BanknotesPack::create(2, Banknote::Pl200),
                BanknotesPack::create(1, Banknote::Pl100),
            ])
        );
    }

    #[test]
    fn allocate_falls_back_when_large_notes_run_out() {
        let vault = deposit(&[(1, Banknote::Pl200), (10, Banknote::Pl100)]);
        assert_eq!(
            allocate(&vault, 500),
            Some(vec![
                BanknotesPack::create(1, Banknote::Pl200),
                BanknotesPack::create(3, Banknote::Pl100),
            ])
        );
    }

    #[test]
    fn allocate_rejects_amount_above_vault_value() {
        let vault = deposit(&[(10, Banknote::Pl200), (10, Banknote::Pl100)]);
        assert_eq!(allocate(&vault, 5000), None);
    }

    #[test]
    fn allocate_rejects_amount_below_smallest_note() {
        let vault = deposit(&[(10, Banknote::Pl100)]);
        assert_eq!(allocate(&vault, 150), None);
    }

    #[test]
    fn allocate_zero_is_empty() {
        let vault = deposit(&[(10, Banknote::Pl100)]);
        assert_eq!(allocate(&vault, 0), Some(vec![]));
    }

    #[test]
    fn greedy_does_not_backtrack() {
        // 60 = 3 x 20 exists, but the greedy pass takes the 50 first.
        let vault = deposit(&[(1, Banknote::Pl50), (3, Banknote::Pl20)]);
        assert_eq!(allocate(&vault, 60), None);
    }

    #[test]
    fn allocate_ignores_empty_denominations() {
        let vault = deposit(&[(0, Banknote::Pl500), (5, Banknote::Pl50)]);
        assert_eq!(
            allocate(&vault, 100),
            Some(vec![BanknotesPack::create(2, Banknote::Pl50)])
        );
    }
}
