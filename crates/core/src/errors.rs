//! Core error types for the portfolio ledger engine.
//!
//! This module defines storage-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage
//! collaborator before they cross into the core.

use chrono::{DateTime, ParseError as ChronoParseError, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the ledger engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Ledger state violation: {0}")]
    State(#[from] StateError),

    #[error("Holding calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Quote provider error: {0}")]
    Quote(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Validation errors for user input. Rejected before any mutation; the
/// message is passed through to callers verbatim.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Unknown transaction kind: {0}")]
    UnknownKind(String),

    #[error("Transaction date {0} is in the future")]
    FutureDated(DateTime<Utc>),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

/// Violations of ledger invariants given the existing history.
/// Never silently clamped or auto-repaired.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Insufficient shares for {symbol}: requested {requested}, held {held}")]
    InsufficientShares {
        symbol: String,
        requested: Decimal,
        held: Decimal,
    },

    #[error("No open position cycle for {symbol}: cannot sell with zero held shares")]
    NoOpenCycle { symbol: String },

    #[error("Position cycle gap for {symbol}: expected cycle {expected}, found {found}")]
    CycleGap {
        symbol: String,
        expected: i32,
        found: i32,
    },
}

/// Errors that occur while replaying transactions or deriving metrics.
///
/// Division-by-zero cases are NOT errors; each formula documents its
/// zero-denominator policy value and returns it directly.
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("Invalid transaction data: {0}")]
    InvalidTransaction(String),

    #[error("Invalid corporate action ratio {ratio} on transaction {transaction_id}")]
    InvalidRatio {
        transaction_id: String,
        ratio: Decimal,
    },

    #[error("Calculation failed: {0}")]
    Calculation(String),
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
