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

//! Identity and credential types passed through to the bank, plus currencies.

use crate::error::{CredentialError, MoneyError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ISO 4217 currency handled by the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Pln,
    Eur,
    Gbp,
    Usd,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Pln => "PLN",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Usd => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PLN" => Ok(Self::Pln),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            "USD" => Ok(Self::Usd),
            other => Err(MoneyError::UnknownCurrency(other.to_string())),
        }
    }
}

/// Four digit personal identification number.
///
/// The machine never inspects the digits; they are handed to the bank as-is.
/// `Debug` output is redacted so PINs do not end up in logs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct PinCode([u8; PinCode::LENGTH]);

impl PinCode {
    pub const LENGTH: usize = 4;

    pub fn create(digits: [u8; Self::LENGTH]) -> Result<Self, CredentialError> {
        if digits.iter().any(|digit| *digit > 9) {
            return Err(CredentialError::InvalidPin);
        }
        Ok(Self(digits))
    }

    pub fn digits(&self) -> [u8; Self::LENGTH] {
        self.0
    }
}

impl fmt::Debug for PinCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PinCode(****)")
    }
}

impl FromStr for PinCode {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != Self::LENGTH {
            return Err(CredentialError::InvalidPin);
        }
        let mut digits = [0u8; Self::LENGTH];
        for (slot, ch) in digits.iter_mut().zip(s.chars()) {
            *slot = ch.to_digit(10).ok_or(CredentialError::InvalidPin)? as u8;
        }
        Self::create(digits)
    }
}

impl TryFrom<String> for PinCode {
    type Error = CredentialError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PinCode> for String {
    fn from(pin: PinCode) -> Self {
        pin.0.iter().map(|digit| char::from(b'0' + digit)).collect()
    }
}

/// Payment card, identified by its number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Card(String);

impl Card {
    pub fn create(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    pub fn number(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_parses_four_digits() {
        let pin: PinCode = "1234".parse().unwrap();
        assert_eq!(pin.digits(), [1, 2, 3, 4]);
        assert_eq!(pin, PinCode::create([1, 2, 3, 4]).unwrap());
    }

    #[test]
    fn pin_rejects_bad_input() {
        assert_eq!("123".parse::<PinCode>(), Err(CredentialError::InvalidPin));
        assert_eq!("12a4".parse::<PinCode>(), Err(CredentialError::InvalidPin));
        assert_eq!(PinCode::create([1, 2, 3, 10]), Err(CredentialError::InvalidPin));
    }

    #[test]
    fn pin_debug_is_redacted() {
        let pin = PinCode::create([9, 8, 7, 6]).unwrap();
        let debug = format!("{:?}", pin);
        assert!(!debug.contains('9'));
        assert_eq!(String::from(pin), "9876");
    }

    #[test]
    fn currency_round_trips_through_code() {
        assert_eq!("pln".parse::<Currency>(), Ok(Currency::Pln));
        assert_eq!(Currency::Gbp.to_string(), "GBP");
        assert!(matches!(
            "XYZ".parse::<Currency>(),
            Err(MoneyError::UnknownCurrency(code)) if code == "XYZ"
        ));
    }

    #[test]
    fn card_keeps_number() {
        let card = Card::create("0000");
        assert_eq!(card.number(), "0000");
        assert_eq!(card.to_string(), "0000");
    }
}
