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

//! In-process bank.
//!
//! Accounts live in a [`DashMap`] so several machines (or threads) can share
//! one bank. A bank built with [`InMemoryBank::with_journal`] also appends
//! every call, successful or not, to a lock-free [`SegQueue`] journal in
//! arrival order.

use super::Bank;
use crate::base::{Card, Currency, PinCode};
use crate::error::{AccountError, AuthorizationError};
use crate::money::Money;
use crossbeam::queue::SegQueue;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::debug;

/// A call received by an [`InMemoryBank`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankOperation {
    Authorize { card: Card, accepted: bool },
    Charge { card: Card, amount: Money, accepted: bool },
}

#[derive(Debug)]
struct BankAccount {
    pin: PinCode,
    currency: Currency,
    balance: Decimal,
}

#[derive(Debug, Default)]
pub struct InMemoryBank {
    accounts: DashMap<Card, BankAccount>,
    journal: Option<SegQueue<BankOperation>>,
}

impl InMemoryBank {
    /// A bank that keeps no record of the calls it receives.
    pub fn new() -> Self {
        Self::default()
    }

    /// A bank that journals every call until [`InMemoryBank::take_journal`]
    /// drains it.
    pub fn with_journal() -> Self {
        Self {
            accounts: DashMap::new(),
            journal: Some(SegQueue::new()),
        }
    }

    /// Registers (or replaces) the account behind `card`.
    pub fn open_account(&self, card: Card, pin: PinCode, balance: Money) {
        self.accounts.insert(
            card,
            BankAccount {
                pin,
                currency: balance.currency(),
                balance: balance.amount(),
            },
        );
    }

    /// Current balance of the account behind `card`.
    pub fn balance(&self, card: &Card) -> Option<Money> {
        self.accounts
            .get(card)
            .and_then(|account| Money::new(account.balance, account.currency).ok())
    }

    /// Drains the journal, oldest call first. Always empty without a journal.
    pub fn take_journal(&self) -> Vec<BankOperation> {
        match &self.journal {
            Some(journal) => std::iter::from_fn(|| journal.pop()).collect(),
            None => Vec::new(),
        }
    }

    fn record(&self, operation: BankOperation) {
        if let Some(journal) = &self.journal {
            journal.push(operation);
        }
    }

    fn check_pin(&self, pin: &PinCode, card: &Card) -> Result<(), AuthorizationError> {
        let account = self
            .accounts
            .get(card)
            .ok_or_else(|| AuthorizationError::new(format!("unknown card {}", card)))?;
        if account.pin != *pin {
            return Err(AuthorizationError::new("PIN does not match card"));
        }
        Ok(())
    }

    fn debit(&self, card: &Card, amount: &Money) -> Result<(), AccountError> {
        let mut account = self
            .accounts
            .get_mut(card)
            .ok_or_else(|| AccountError::new(format!("unknown card {}", card)))?;
        if account.currency != amount.currency() {
            return Err(AccountError::new(format!(
                "account is held in {}, charge requested in {}",
                account.currency,
                amount.currency()
            )));
        }
        if account.balance < amount.amount() {
            return Err(AccountError::new("insufficient funds"));
        }
        account.balance -= amount.amount();
        Ok(())
    }
}

impl Bank for InMemoryBank {
    fn authorize(&self, pin: &PinCode, card: &Card) -> Result<(), AuthorizationError> {
        let result = self.check_pin(pin, card);
        debug!(%card, accepted = result.is_ok(), "authorize");
        self.record(BankOperation::Authorize {
            card: card.clone(),
            accepted: result.is_ok(),
        });
        result
    }

    fn charge(&self, card: &Card, amount: &Money) -> Result<(), AccountError> {
        let result = self.debit(card, amount);
        debug!(%card, %amount, accepted = result.is_ok(), "charge");
        self.record(BankOperation::Charge {
            card: card.clone(),
            amount: *amount,
            accepted: result.is_ok(),
        });
        result
    }
}
