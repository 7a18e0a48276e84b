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

//! Result of a successful withdrawal.

use crate::base::Currency;
use crate::banknote::{Banknote, BanknotesPack};
use rust_decimal::Decimal;
use serde::Serialize;

/// Banknotes handed out by one withdrawal, in dispensing order
/// (largest denomination first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Withdrawal {
    currency: Currency,
    banknotes: Vec<Banknote>,
}

impl Withdrawal {
    /// Expands allocated packs into individual notes, keeping pack order.
    pub(crate) fn from_packs(currency: Currency, packs: &[BanknotesPack]) -> Self {
        let banknotes = packs
            .iter()
            .flat_map(|pack| std::iter::repeat_n(pack.denomination(), pack.count() as usize))
            .collect();
        Self {
            currency,
            banknotes,
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn banknotes(&self) -> &[Banknote] {
        &self.banknotes
    }

    /// Sum of the face values of every dispensed note.
    pub fn total(&self) -> Decimal {
        self.banknotes
            .iter()
            .map(|banknote| Decimal::from(banknote.value()))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.banknotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banknotes.is_empty()
    }
}
