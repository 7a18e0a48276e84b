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

//! Remote bank reached over HTTP.
//!
//! ## Endpoints
//!
//! - `POST {base}/authorize` with `{"card": "0000", "pin": "1234"}`
//! - `POST {base}/charge` with `{"card": "0000", "amount": "500", "currency": "PLN"}`
//!
//! Any 2xx answer is success. Everything else, including transport failures
//! and timeouts, is a rejection: the machine never dispenses on an unknown
//! outcome.

use super::Bank;
use crate::base::{Card, Currency, PinCode};
use crate::error::{AccountError, AuthorizationError};
use crate::money::Money;
use reqwest::blocking::Client;
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpBankConfig {
    /// Base URL, e.g. `http://127.0.0.1:3000`. A trailing `/` is ignored.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpBankConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

/// Request body for `POST /authorize`.
#[derive(Debug, Serialize)]
struct AuthorizeRequest<'a> {
    card: &'a Card,
    pin: PinCode,
}

/// Request body for `POST /charge`.
#[derive(Debug, Serialize)]
struct ChargeRequest<'a> {
    card: &'a Card,
    amount: Decimal,
    currency: Currency,
}

#[derive(Debug)]
pub struct HttpBank {
    client: Client,
    base_url: String,
}

impl HttpBank {
    pub fn new(config: HttpBankConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Posts `body` and reduces the outcome to accepted or a rejection reason.
    fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<(), String> {
        let url = self.endpoint(path);
        let response = self.client.post(&url).json(body).send().map_err(|e| {
            warn!(%url, error = %e, "bank unreachable");
            format!("bank unreachable: {}", e)
        })?;

        let status = response.status();
        debug!(%url, %status, "bank answered");
        if status.is_success() {
            Ok(())
        } else {
            Err(format!("bank answered {}", status))
        }
    }
}

impl Bank for HttpBank {
    fn authorize(&self, pin: &PinCode, card: &Card) -> Result<(), AuthorizationError> {
        self.post("authorize", &AuthorizeRequest { card, pin: *pin })
            .map_err(AuthorizationError::new)
    }

    fn charge(&self, card: &Card, amount: &Money) -> Result<(), AccountError> {
        let request = ChargeRequest {
            card,
            amount: amount.amount(),
            currency: amount.currency(),
        };
        self.post("charge", &request).map_err(AccountError::new)
    }
}
