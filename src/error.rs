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

//! Error types for withdrawals and machine setup.

use crate::base::Currency;
use crate::banknote::Banknote;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Withdrawal failure classes reported by the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Amount is not a whole number of units or cannot be assembled from the vault
    WrongAmount,
    /// Requested currency differs from the machine currency
    WrongCurrency,
    /// Bank rejected the PIN/card pair
    Authorization,
    /// Bank rejected the charge
    NoFundsOnAccount,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WrongAmount => "WRONG_AMOUNT",
            Self::WrongCurrency => "WRONG_CURRENCY",
            Self::Authorization => "AUTHORIZATION",
            Self::NoFundsOnAccount => "NO_FUNDS_ON_ACCOUNT",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed withdrawal. Carries exactly one [`ErrorCode`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("withdrawal failed ({code}): {detail}")]
pub struct AtmOperationError {
    code: ErrorCode,
    detail: String,
}

impl AtmOperationError {
    pub fn new(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<AuthorizationError> for AtmOperationError {
    fn from(err: AuthorizationError) -> Self {
        Self::new(ErrorCode::Authorization, err.to_string())
    }
}

impl From<AccountError> for AtmOperationError {
    fn from(err: AccountError) -> Self {
        Self::new(ErrorCode::NoFundsOnAccount, err.to_string())
    }
}

/// Bank refused to authorize a card.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("authorization rejected: {reason}")]
pub struct AuthorizationError {
    reason: String,
}

impl AuthorizationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Bank refused to charge an account.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("charge rejected: {reason}")]
pub struct AccountError {
    reason: String,
}

impl AccountError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Invalid monetary values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("amount cannot be negative")]
    NegativeAmount,

    #[error("unknown currency code '{0}'")]
    UnknownCurrency(String),
}

/// Invalid card credentials.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("PIN must be exactly four decimal digits")]
    InvalidPin,
}

/// Vault setup and bookkeeping errors. These never surface from a withdrawal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DepositError {
    /// Pack or deposit currency does not match the expected one
    #[error("currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: Currency, actual: Currency },

    /// Decrement would take a denomination below zero
    #[error("not enough {banknote} notes: requested {requested}, available {available}")]
    InsufficientStock {
        banknote: Banknote,
        requested: u32,
        available: u32,
    },

    /// Merged count of one denomination does not fit a `u32`
    #[error("too many {banknote} notes")]
    StockOverflow { banknote: Banknote },

    /// Unrecognized denomination name in setup data
    #[error("unknown banknote '{0}'")]
    UnknownBanknote(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_display_messages() {
        assert_eq!(ErrorCode::WrongAmount.to_string(), "WRONG_AMOUNT");
        assert_eq!(ErrorCode::WrongCurrency.to_string(), "WRONG_CURRENCY");
        assert_eq!(ErrorCode::Authorization.to_string(), "AUTHORIZATION");
        assert_eq!(ErrorCode::NoFundsOnAccount.to_string(), "NO_FUNDS_ON_ACCOUNT");
    }

    #[test]
    fn bank_errors_map_to_codes() {
        let auth: AtmOperationError = AuthorizationError::new("bad pin").into();
        assert_eq!(auth.code(), ErrorCode::Authorization);
        assert_eq!(auth.detail(), "authorization rejected: bad pin");

        let account: AtmOperationError = AccountError::new("balance too low").into();
        assert_eq!(account.code(), ErrorCode::NoFundsOnAccount);
    }

    #[test]
    fn operation_error_display() {
        let err = AtmOperationError::new(ErrorCode::WrongCurrency, "GBP requested");
        assert_eq!(err.to_string(), "withdrawal failed (WRONG_CURRENCY): GBP requested");
    }

    #[test]
    fn deposit_error_display() {
        let err = DepositError::InsufficientStock {
            banknote: Banknote::Pl100,
            requested: 3,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "not enough PL_100 notes: requested 3, available 1"
        );
        assert_eq!(
            DepositError::CurrencyMismatch {
                expected: Currency::Pln,
                actual: Currency::Eur
            }
            .to_string(),
            "currency mismatch: expected PLN, got EUR"
        );
    }

    #[test]
    fn errors_are_cloneable() {
        let error = AtmOperationError::new(ErrorCode::WrongAmount, "too large");
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}
