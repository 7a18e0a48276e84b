//! Bank service for the ATM's HTTP collaborator.
//!
//! Run with: `cargo run --example bank_server -- --port 3000`
//!
//! ## Endpoints
//!
//! - `POST /authorize` - Check a PIN against a card (401 on rejection)
//! - `POST /charge` - Debit an account (402 on rejection)
//! - `GET /accounts/{card}` - Current balance
//!
//! Two demo accounts are opened at startup: card `0000` (PIN `1234`,
//! 10000 PLN) and card `1111` (PIN `4321`, 100 PLN).
//!
//! ## Example Usage
//!
//! ```bash
//! curl -X POST http://localhost:3000/authorize \
//!   -H "Content-Type: application/json" \
//!   -d '{"card": "0000", "pin": "1234"}'
//!
//! curl -X POST http://localhost:3000/charge \
//!   -H "Content-Type: application/json" \
//!   -d '{"card": "0000", "amount": "500", "currency": "PLN"}'
//!
//! cargo run --bin atm -- --bank-url http://localhost:3000 --vault vault.csv requests.csv
//! ```

use atm_demo_rs::{Bank, Card, Currency, InMemoryBank, Money, PinCode};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bank_server")]
struct Args {
    /// Port to listen on
    #[arg(long, env = "BANK_PORT", default_value_t = 3000)]
    port: u16,
}

// === Request/Response DTOs ===

/// Request body for `POST /authorize`.
#[derive(Debug, Deserialize)]
struct AuthorizeRequest {
    card: Card,
    pin: PinCode,
}

/// Request body for `POST /charge`.
#[derive(Debug, Deserialize)]
struct ChargeRequest {
    card: Card,
    amount: Decimal,
    currency: Currency,
}

/// Response body for account balances.
#[derive(Debug, Serialize)]
struct BalanceResponse {
    card: Card,
    balance: Decimal,
    currency: Currency,
}

/// Response body for errors.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

// === Application State ===

#[derive(Clone)]
struct AppState {
    bank: Arc<InMemoryBank>,
}

// === Error Handling ===

struct AppError(StatusCode, String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.0, Json(ErrorResponse { error: self.1 })).into_response()
    }
}

// === Handlers ===

/// POST /authorize
async fn authorize(
    State(state): State<AppState>,
    Json(request): Json<AuthorizeRequest>,
) -> Result<StatusCode, AppError> {
    state
        .bank
        .authorize(&request.pin, &request.card)
        .map_err(|e| AppError(StatusCode::UNAUTHORIZED, e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /charge
async fn charge(
    State(state): State<AppState>,
    Json(request): Json<ChargeRequest>,
) -> Result<StatusCode, AppError> {
    let amount = Money::new(request.amount, request.currency)
        .map_err(|e| AppError(StatusCode::BAD_REQUEST, e.to_string()))?;
    state
        .bank
        .charge(&request.card, &amount)
        .map_err(|e| AppError(StatusCode::PAYMENT_REQUIRED, e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /accounts/{card}
async fn balance(
    State(state): State<AppState>,
    Path(card): Path<String>,
) -> Result<Json<BalanceResponse>, AppError> {
    let card = Card::create(card);
    let balance = state
        .bank
        .balance(&card)
        .ok_or_else(|| AppError(StatusCode::NOT_FOUND, "account not found".to_string()))?;
    Ok(Json(BalanceResponse {
        card,
        balance: balance.amount(),
        currency: balance.currency(),
    }))
}

// === Router ===

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/authorize", post(authorize))
        .route("/charge", post(charge))
        .route("/accounts/{card}", get(balance))
        .with_state(state)
}

fn seed_accounts(bank: &InMemoryBank) -> Result<(), Box<dyn std::error::Error>> {
    bank.open_account(
        Card::create("0000"),
        "1234".parse()?,
        Money::new(dec!(10000), Currency::Pln)?,
    );
    bank.open_account(
        Card::create("1111"),
        "4321".parse()?,
        Money::new(dec!(100), Currency::Pln)?,
    );
    Ok(())
}

// === Main ===

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let bank = Arc::new(InMemoryBank::new());
    seed_accounts(&bank)?;

    let app = create_router(AppState { bank });

    let listener = TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!(port = args.port, "bank server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
