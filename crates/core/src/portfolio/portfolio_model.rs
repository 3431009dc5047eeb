//! Portfolio-level domain models.

use crate::errors::ValidationError;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a cash transfer in or out of the portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashTransferKind {
    Deposit,
    Withdrawal,
}

impl CashTransferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CashTransferKind::Deposit => "DEPOSIT",
            CashTransferKind::Withdrawal => "WITHDRAWAL",
        }
    }
}

impl FromStr for CashTransferKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "DEPOSIT" => Ok(CashTransferKind::Deposit),
            "WITHDRAWAL" => Ok(CashTransferKind::Withdrawal),
            other => Err(ValidationError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for CashTransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the cash transfer ledger (deposits/withdrawals), kept apart
/// from the per-symbol transaction log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashTransfer {
    pub id: String,
    pub portfolio_id: String,
    pub kind: CashTransferKind,
    pub amount: Decimal,
    pub transferred_at: DateTime<Utc>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CashTransfer {
    /// Signed effect on the portfolio's cash balance.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            CashTransferKind::Deposit => self.amount,
            CashTransferKind::Withdrawal => -self.amount,
        }
    }
}

/// Input model for recording a cash transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCashTransfer {
    pub portfolio_id: String,
    /// Kind wire code (`DEPOSIT` or `WITHDRAWAL`).
    pub kind: String,
    pub amount: Decimal,
    /// ISO 8601/RFC3339 timestamp or a plain `YYYY-MM-DD` date.
    pub transferred_at: String,
    pub comment: Option<String>,
}

impl NewCashTransfer {
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.portfolio_id.trim().is_empty() {
            return Err(ValidationError::MissingField("portfolioId".to_string()));
        }
        CashTransferKind::from_str(&self.kind)?;
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::InvalidInput(format!(
                "Transfer amount must be positive, got {}",
                self.amount
            )));
        }
        let transferred_at = self.parse_transferred_at()?;
        if transferred_at > Utc::now() {
            return Err(ValidationError::FutureDated(transferred_at));
        }
        Ok(())
    }

    pub fn parse_transferred_at(&self) -> std::result::Result<DateTime<Utc>, ValidationError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.transferred_at) {
            return Ok(dt.with_timezone(&Utc));
        }
        match NaiveDate::parse_from_str(&self.transferred_at, "%Y-%m-%d") {
            Ok(date) => Ok(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())),
            Err(e) => Err(ValidationError::DateTimeParse(e)),
        }
    }
}

/// Portfolio-level rollup: every active holding valued against one quote,
/// plus cash derived from the transfer ledger netted against trading flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioOverview {
    pub portfolio_id: String,
    pub total_assets: Decimal,
    pub market_value: Decimal,
    pub cash: Decimal,
    /// Net external contributions: deposits minus withdrawals.
    pub principal: Decimal,
    pub float_amount: Decimal,
    pub accum_amount: Decimal,
    pub day_float_amount: Decimal,
}
