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

//! Vault bookkeeping.
//!
//! A [`MoneyDeposit`] holds the banknotes loaded into a machine, grouped by
//! denomination. Stock only ever goes down, through [`MoneyDeposit::release`],
//! and never below zero.
//!
//! # Example
//!
//! ```
//! use atm_demo_rs::{Banknote, BanknotesPack, Currency, MoneyDeposit};
//! use rust_decimal_macros::dec;
//!
//! let deposit = MoneyDeposit::create(
//!     Currency::Pln,
//!     [
//!         BanknotesPack::create(10, Banknote::Pl200),
//!         BanknotesPack::create(10, Banknote::Pl100),
//!     ],
//! )
//! .unwrap();
//! assert_eq!(deposit.total(), dec!(3000));
//! assert_eq!(deposit.available(Banknote::Pl200), 10);
//! ```

use crate::banknote::{Banknote, BanknotesPack};
use crate::base::Currency;
use crate::error::DepositError;
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyDeposit {
    currency: Currency,
    /// Count per denomination, keyed in ascending face value.
    stock: BTreeMap<Banknote, u32>,
}

impl MoneyDeposit {
    /// Builds a deposit from packs. Packs of the same denomination are merged.
    ///
    /// # Errors
    ///
    /// [`DepositError::CurrencyMismatch`] if any pack holds notes of another currency,
    /// [`DepositError::StockOverflow`] if merged counts do not fit a `u32`.
    pub fn create(
        currency: Currency,
        packs: impl IntoIterator<Item = BanknotesPack>,
    ) -> Result<Self, DepositError> {
        let mut stock = BTreeMap::new();
        for pack in packs {
            let actual = pack.denomination().currency();
            if actual != currency {
                return Err(DepositError::CurrencyMismatch {
                    expected: currency,
                    actual,
                });
            }
            add_count(&mut stock, pack)?;
        }
        Ok(Self { currency, stock })
    }

    /// A vault with no notes at all.
    pub fn empty(currency: Currency) -> Self {
        Self {
            currency,
            stock: BTreeMap::new(),
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Notes of `banknote` currently in the vault.
    pub fn available(&self, banknote: Banknote) -> u32 {
        self.stock.get(&banknote).copied().unwrap_or(0)
    }

    /// Sum of `value * count` over every denomination.
    pub fn total(&self) -> Decimal {
        self.packs().iter().map(BanknotesPack::value).sum()
    }

    /// Current stock as packs, largest denomination first.
    pub fn packs(&self) -> Vec<BanknotesPack> {
        self.stock
            .iter()
            .rev()
            .map(|(banknote, count)| BanknotesPack::create(*count, *banknote))
            .collect()
    }

    /// Removes the given notes from the vault.
    ///
    /// Either every pack is taken or none is: stock is checked in full before
    /// the first decrement.
    ///
    /// # Errors
    ///
    /// [`DepositError::InsufficientStock`] if any denomination would go below zero,
    /// [`DepositError::StockOverflow`] if the requested counts do not fit a `u32`.
    pub fn release(&mut self, packs: &[BanknotesPack]) -> Result<(), DepositError> {
        let mut requested = BTreeMap::new();
        for pack in packs {
            add_count(&mut requested, *pack)?;
        }

        for (banknote, count) in &requested {
            let available = self.available(*banknote);
            if available < *count {
                return Err(DepositError::InsufficientStock {
                    banknote: *banknote,
                    requested: *count,
                    available,
                });
            }
        }

        for (banknote, count) in requested {
            if let Some(stock) = self.stock.get_mut(&banknote) {
                *stock -= count;
            }
        }
        Ok(())
    }
}

fn add_count(
    counts: &mut BTreeMap<Banknote, u32>,
    pack: BanknotesPack,
) -> Result<(), DepositError> {
    let banknote = pack.denomination();
    let count = counts.entry(banknote).or_insert(0);
    *count = count
        .checked_add(pack.count())
        .ok_or(DepositError::StockOverflow { banknote })?;
    Ok(())
}

impl Serialize for MoneyDeposit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("MoneyDeposit", 3)?;
        state.serialize_field("currency", &self.currency)?;
        state.serialize_field("packs", &self.packs())?;
        state.serialize_field("total", &self.total())?;
        state.end()
    }
}
