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

//! # ATM Demo
//!
//! This library provides the decision core of a cash machine: it validates a
//! withdrawal request, authorizes and charges the card through a bank, and
//! works out which banknotes to hand out from a finite vault.
//!
//! ## Core Components
//!
//! - [`AtMachine`]: Runs a withdrawal against a bank and a vault
//! - [`MoneyDeposit`]: The vault, banknote stock per denomination
//! - [`Banknote`] / [`BanknotesPack`]: Denominations and stock entries
//! - [`Money`]: Amount plus currency
//! - [`Withdrawal`]: Notes dispensed by a successful withdrawal
//! - [`Bank`]: The bank collaborator ([`InMemoryBank`], [`HttpBank`])
//! - [`AtmOperationError`] / [`ErrorCode`]: Why a withdrawal failed
//!
//! ## Example
//!
//! ```
//! use atm_demo_rs::{
//!     AtMachine, Banknote, BanknotesPack, Card, Currency, InMemoryBank, Money, MoneyDeposit,
//!     PinCode,
//! };
//! use rust_decimal_macros::dec;
//!
//! let bank = InMemoryBank::new();
//! let card = Card::create("0000");
//! let pin = PinCode::create([1, 2, 3, 4]).unwrap();
//! bank.open_account(card.clone(), pin, Money::new(dec!(1000), Currency::Pln).unwrap());
//!
//! let machine = AtMachine::new(bank, Currency::Pln);
//! let deposit = MoneyDeposit::create(
//!     Currency::Pln,
//!     [
//!         BanknotesPack::create(10, Banknote::Pl200),
//!         BanknotesPack::create(10, Banknote::Pl100),
//!     ],
//! )
//! .unwrap();
//! machine.set_deposit(deposit).unwrap();
//!
//! let amount = Money::new(dec!(500), Currency::Pln).unwrap();
//! let withdrawal = machine.withdraw(&pin, &card, &amount).unwrap();
//! assert_eq!(
//!     withdrawal.banknotes(),
//!     &[Banknote::Pl200, Banknote::Pl200, Banknote::Pl100]
//! );
//! assert_eq!(machine.deposit().available(Banknote::Pl200), 8);
//! ```
//!
//! ## Thread Safety
//!
//! [`AtMachine::withdraw`] takes `&self`; an `Arc<AtMachine<_>>` can serve
//! withdrawals from several threads while the vault stays consistent.

pub mod bank;
mod banknote;
mod base;
mod deposit;
pub mod error;
mod machine;
mod money;
mod withdrawal;

pub use bank::{Bank, BankOperation, HttpBank, HttpBankConfig, InMemoryBank};
pub use banknote::{Banknote, BanknotesPack};
pub use base::{Card, Currency, PinCode};
pub use deposit::MoneyDeposit;
pub use error::{
    AccountError, AtmOperationError, AuthorizationError, CredentialError, DepositError, ErrorCode,
    MoneyError,
};
pub use machine::AtMachine;
pub use money::Money;
pub use withdrawal::Withdrawal;
