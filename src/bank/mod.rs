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

//! Bank collaborator.
//!
//! The machine needs two things from a bank: confirm that a PIN belongs to a
//! card, and debit the card's account. Both calls may have side effects on the
//! bank's side and are made at most once per withdrawal, always in the order
//! authorize then charge.
//!
//! - [`InMemoryBank`]: account registry held in process, with an optional call journal.
//! - [`HttpBank`]: JSON over HTTP against a remote bank service.

mod http;
mod memory;

pub use http::{HttpBank, HttpBankConfig};
pub use memory::{BankOperation, InMemoryBank};

use crate::base::{Card, PinCode};
use crate::error::{AccountError, AuthorizationError};
use crate::money::Money;
use std::sync::Arc;

/// Operations the machine performs against a bank. Calls block.
pub trait Bank: Send + Sync {
    /// Checks that `pin` unlocks `card`.
    fn authorize(&self, pin: &PinCode, card: &Card) -> Result<(), AuthorizationError>;

    /// Debits `amount` from the account behind `card`.
    fn charge(&self, card: &Card, amount: &Money) -> Result<(), AccountError>;
}

impl<B: Bank + ?Sized> Bank for &B {
    fn authorize(&self, pin: &PinCode, card: &Card) -> Result<(), AuthorizationError> {
        (**self).authorize(pin, card)
    }

    fn charge(&self, card: &Card, amount: &Money) -> Result<(), AccountError> {
        (**self).charge(card, amount)
    }
}

impl<B: Bank + ?Sized> Bank for Arc<B> {
    fn authorize(&self, pin: &PinCode, card: &Card) -> Result<(), AuthorizationError> {
        (**self).authorize(pin, card)
    }

    fn charge(&self, card: &Card, amount: &Money) -> Result<(), AccountError> {
        (**self).charge(card, amount)
    }
}

impl<B: Bank + ?Sized> Bank for Box<B> {
    fn authorize(&self, pin: &PinCode, card: &Card) -> Result<(), AuthorizationError> {
        (**self).authorize(pin, card)
    }

    fn charge(&self, card: &Card, amount: &Money) -> Result<(), AccountError> {
        (**self).charge(card, amount)
    }
}
