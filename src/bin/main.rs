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

use atm_demo_rs::{
    AtMachine, Bank, Banknote, BanknotesPack, Card, Currency, DepositError, HttpBank,
    HttpBankConfig, InMemoryBank, Money, MoneyDeposit, PinCode,
};
use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// ATM - Replay withdrawal requests against a cash machine
///
/// Loads a vault from CSV, connects to a bank (remote or seeded in memory),
/// runs every withdrawal request and writes the outcomes to stdout.
#[derive(Parser, Debug)]
#[command(name = "atm")]
#[command(about = "Runs withdrawal requests through a cash machine", long_about = None)]
struct Args {
    /// Path to CSV file with withdrawal requests
    ///
    /// Expected format: card,pin,amount,currency
    #[arg(value_name = "REQUESTS")]
    requests: PathBuf,

    /// Currency the machine dispenses
    #[arg(long, env = "ATM_CURRENCY", default_value = "PLN")]
    currency: Currency,

    /// Path to CSV file with the initial vault
    ///
    /// Expected format: denomination,count (e.g. PL_200,10)
    #[arg(long, env = "ATM_VAULT", value_name = "FILE")]
    vault: PathBuf,

    /// Base URL of a remote bank
    #[arg(long, env = "ATM_BANK_URL", conflicts_with = "accounts")]
    bank_url: Option<String>,

    /// Request timeout for the remote bank, in seconds
    #[arg(long, env = "ATM_BANK_TIMEOUT", default_value_t = 10)]
    bank_timeout: u64,

    /// Path to CSV file seeding an in-memory bank
    ///
    /// Expected format: card,pin,balance,currency
    #[arg(long, env = "ATM_ACCOUNTS", value_name = "FILE")]
    accounts: Option<PathBuf>,
}

/// Failures that stop the machine from starting.
#[derive(Debug, Error)]
enum SetupError {
    #[error("cannot open '{path}': {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Deposit(#[from] DepositError),

    #[error("cannot build bank client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("either --bank-url or --accounts is required")]
    NoBank,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), SetupError> {
    let bank = connect_bank(args)?;
    let machine = AtMachine::new(bank, args.currency);

    let deposit = load_vault(open(&args.vault)?, args.currency)?;
    machine.set_deposit(deposit)?;

    process_requests(&machine, open(&args.requests)?, std::io::stdout())?;

    info!(remaining = %machine.deposit().total(), "all requests processed");
    Ok(())
}

fn open(path: &Path) -> Result<BufReader<File>, SetupError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| SetupError::Open {
            path: path.to_path_buf(),
            source,
        })
}

fn connect_bank(args: &Args) -> Result<Box<dyn Bank>, SetupError> {
    if let Some(base_url) = &args.bank_url {
        let config = HttpBankConfig {
            base_url: base_url.clone(),
            timeout: Duration::from_secs(args.bank_timeout),
        };
        info!(%base_url, "using remote bank");
        return Ok(Box::new(HttpBank::new(config)?));
    }

    let path = args.accounts.as_ref().ok_or(SetupError::NoBank)?;
    info!(path = %path.display(), "using in-memory bank");
    Ok(Box::new(load_accounts(open(path)?)?))
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .has_headers(true)
        .from_reader(reader)
}

/// Vault CSV row.
#[derive(Debug, Deserialize)]
struct VaultRecord {
    denomination: Banknote,
    count: u32,
}

/// Builds the initial vault. Any malformed row aborts setup.
fn load_vault<R: Read>(reader: R, currency: Currency) -> Result<MoneyDeposit, SetupError> {
    let packs = csv_reader(reader)
        .deserialize::<VaultRecord>()
        .map(|row| row.map(|r| BanknotesPack::create(r.count, r.denomination)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MoneyDeposit::create(currency, packs)?)
}

/// Account CSV row.
#[derive(Debug, Deserialize)]
struct AccountRecord {
    card: Card,
    pin: PinCode,
    balance: Decimal,
    currency: Currency,
}

/// Seeds an in-memory bank. Malformed rows are skipped.
fn load_accounts<R: Read>(reader: R) -> Result<InMemoryBank, csv::Error> {
    let bank = InMemoryBank::new();
    for result in csv_reader(reader).deserialize::<AccountRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "skipping malformed account row");
                continue;
            }
        };
        match Money::new(record.balance, record.currency) {
            Ok(balance) => bank.open_account(record.card, record.pin, balance),
            Err(e) => warn!(card = %record.card, error = %e, "skipping account"),
        }
    }
    Ok(bank)
}

/// Withdrawal request CSV row.
#[derive(Debug, Deserialize)]
struct RequestRecord {
    card: Card,
    pin: PinCode,
    amount: Decimal,
    currency: Currency,
}

/// Outcome CSV row.
#[derive(Debug, Serialize)]
struct OutcomeRecord {
    card: Card,
    amount: Decimal,
    currency: Currency,
    status: String,
    banknotes: String,
}

/// Runs every request through the machine and writes one outcome per request.
///
/// # CSV Format
///
/// Input columns: `card, pin, amount, currency`
/// Output columns: `card, amount, currency, status, banknotes`
///
/// ```csv
/// card,amount,currency,status,banknotes
/// 0000,500,PLN,OK,PL_200 PL_200 PL_100
/// 0000,5000,PLN,WRONG_AMOUNT,
/// ```
///
/// Malformed request rows are skipped.
///
/// # Errors
///
/// Returns a CSV error if the reader fails or writing fails.
fn process_requests<B: Bank, R: Read, W: Write>(
    machine: &AtMachine<B>,
    reader: R,
    writer: W,
) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for result in csv_reader(reader).deserialize::<RequestRecord>() {
        let request = match result {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "skipping malformed request row");
                continue;
            }
        };
        let amount = match Money::new(request.amount, request.currency) {
            Ok(amount) => amount,
            Err(e) => {
                warn!(card = %request.card, error = %e, "skipping request");
                continue;
            }
        };

        let (status, banknotes) = match machine.withdraw(&request.pin, &request.card, &amount) {
            Ok(withdrawal) => (
                "OK".to_string(),
                withdrawal
                    .banknotes()
                    .iter()
                    .map(Banknote::to_string)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            Err(e) => (e.code().to_string(), String::new()),
        };

        wtr.serialize(OutcomeRecord {
            card: request.card,
            amount: request.amount,
            currency: request.currency,
            status,
            banknotes,
        })?;
    }

    wtr.flush()?;
    Ok(())
}
