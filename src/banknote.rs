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

//! Banknote denominations and vault packs.
//!
//! Denominations form a closed set. Each carries a whole face value and the
//! currency it is issued in; the allocator walks a currency's series from the
//! largest face value down.

use crate::base::Currency;
use crate::error::DepositError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Serialized by name (`"PL_200"`); names parse case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String")]
pub enum Banknote {
    #[serde(rename = "PL_10")]
    Pl10,
    #[serde(rename = "PL_20")]
    Pl20,
    #[serde(rename = "PL_50")]
    Pl50,
    #[serde(rename = "PL_100")]
    Pl100,
    #[serde(rename = "PL_200")]
    Pl200,
    #[serde(rename = "PL_500")]
    Pl500,
    #[serde(rename = "EUR_5")]
    Eur5,
    #[serde(rename = "EUR_10")]
    Eur10,
    #[serde(rename = "EUR_20")]
    Eur20,
    #[serde(rename = "EUR_50")]
    Eur50,
    #[serde(rename = "EUR_100")]
    Eur100,
    #[serde(rename = "EUR_200")]
    Eur200,
    #[serde(rename = "EUR_500")]
    Eur500,
}

impl Banknote {
    /// Every denomination, grouped by currency, largest face value first.
    pub const ALL: [Banknote; 13] = [
        Banknote::Pl500,
        Banknote::Pl200,
        Banknote::Pl100,
        Banknote::Pl50,
        Banknote::Pl20,
        Banknote::Pl10,
        Banknote::Eur500,
        Banknote::Eur200,
        Banknote::Eur100,
        Banknote::Eur50,
        Banknote::Eur20,
        Banknote::Eur10,
        Banknote::Eur5,
    ];

    /// Face value in whole units of [`Banknote::currency`].
    pub fn value(&self) -> u32 {
        match self {
            Self::Eur5 => 5,
            Self::Pl10 | Self::Eur10 => 10,
            Self::Pl20 | Self::Eur20 => 20,
            Self::Pl50 | Self::Eur50 => 50,
            Self::Pl100 | Self::Eur100 => 100,
            Self::Pl200 | Self::Eur200 => 200,
            Self::Pl500 | Self::Eur500 => 500,
        }
    }

    pub fn currency(&self) -> Currency {
        match self {
            Self::Pl10 | Self::Pl20 | Self::Pl50 | Self::Pl100 | Self::Pl200 | Self::Pl500 => {
                Currency::Pln
            }
            _ => Currency::Eur,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pl10 => "PL_10",
            Self::Pl20 => "PL_20",
            Self::Pl50 => "PL_50",
            Self::Pl100 => "PL_100",
            Self::Pl200 => "PL_200",
            Self::Pl500 => "PL_500",
            Self::Eur5 => "EUR_5",
            Self::Eur10 => "EUR_10",
            Self::Eur20 => "EUR_20",
            Self::Eur50 => "EUR_50",
            Self::Eur100 => "EUR_100",
            Self::Eur200 => "EUR_200",
            Self::Eur500 => "EUR_500",
        }
    }

    /// Denominations issued in `currency`, largest face value first.
    pub fn series(currency: Currency) -> impl Iterator<Item = Banknote> {
        Self::ALL
            .into_iter()
            .filter(move |banknote| banknote.currency() == currency)
    }
}

impl Ord for Banknote {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value()
            .cmp(&other.value())
            .then_with(|| self.currency().cmp(&other.currency()))
    }
}

impl PartialOrd for Banknote {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Banknote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Banknote {
    type Err = DepositError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|banknote| banknote.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| DepositError::UnknownBanknote(s.to_string()))
    }
}

impl TryFrom<String> for Banknote {
    type Error = DepositError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

/// Stock of a single denomination.
///
/// Packs are values: a changed count means a new pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct BanknotesPack {
    denomination: Banknote,
    count: u32,
}

impl BanknotesPack {
    pub fn create(count: u32, denomination: Banknote) -> Self {
        Self {
            denomination,
            count,
        }
    }

    pub fn denomination(&self) -> Banknote {
        self.denomination
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Combined face value of the pack.
    pub fn value(&self) -> Decimal {
        Decimal::from(self.denomination.value()) * Decimal::from(self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn ordering_follows_face_value() {
        assert!(Banknote::Pl200 > Banknote::Pl100);
        assert!(Banknote::Eur5 < Banknote::Pl10);

        let mut notes = vec![Banknote::Pl100, Banknote::Pl500, Banknote::Pl20];
        notes.sort_by(|a, b| b.cmp(a));
        assert_eq!(notes, vec![Banknote::Pl500, Banknote::Pl100, Banknote::Pl20]);
    }

    #[test]
    fn series_is_descending_and_single_currency() {
        let pln: Vec<_> = Banknote::series(Currency::Pln).collect();
        assert_eq!(
            pln,
            vec![
                Banknote::Pl500,
                Banknote::Pl200,
                Banknote::Pl100,
                Banknote::Pl50,
                Banknote::Pl20,
                Banknote::Pl10,
            ]
        );
        assert!(pln.windows(2).all(|pair| pair[0].value() > pair[1].value()));
        assert_eq!(Banknote::series(Currency::Gbp).count(), 0);
    }

    #[test]
    fn parses_names() {
        assert_eq!("PL_200".parse::<Banknote>(), Ok(Banknote::Pl200));
        assert_eq!(" eur_50 ".parse::<Banknote>(), Ok(Banknote::Eur50));
        assert_eq!(
            "PL_300".parse::<Banknote>(),
            Err(DepositError::UnknownBanknote("PL_300".to_string()))
        );
    }

    #[test]
    fn serde_uses_names() {
        assert_eq!(serde_json::to_string(&Banknote::Eur200).unwrap(), "\"EUR_200\"");
        let parsed: Banknote = serde_json::from_str("\"pl_500\"").unwrap();
        assert_eq!(parsed, Banknote::Pl500);
        assert!(serde_json::from_str::<Banknote>("\"PL_5\"").is_err());

        let pack: BanknotesPack =
            serde_json::from_str(r#"{"denomination":"EUR_20","count":3}"#).unwrap();
        assert_eq!(pack, BanknotesPack::create(3, Banknote::Eur20));
    }

    #[test]
    fn pack_value() {
        let pack = BanknotesPack::create(10, Banknote::Pl200);
        assert_eq!(pack.value(), dec!(2000));
        assert_eq!(pack.count(), 10);
        assert_eq!(pack.denomination(), Banknote::Pl200);
        assert_eq!(BanknotesPack::create(0, Banknote::Pl10).value(), Decimal::ZERO);
    }
}
