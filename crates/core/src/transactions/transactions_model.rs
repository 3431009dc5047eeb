//! Transaction domain models.

use crate::errors::ValidationError;
use crate::transactions::transactions_constants::*;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of supported transaction kinds.
///
/// Dispatch over kinds is always an exhaustive `match`; adding a kind is a
/// compile-time event, not a runtime fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Buy,
    Sell,
    Merge,
    Split,
    Dividend,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Buy => TRANSACTION_KIND_BUY,
            TransactionKind::Sell => TRANSACTION_KIND_SELL,
            TransactionKind::Merge => TRANSACTION_KIND_MERGE,
            TransactionKind::Split => TRANSACTION_KIND_SPLIT,
            TransactionKind::Dividend => TRANSACTION_KIND_DIVIDEND,
        }
    }

    pub fn is_trade(&self) -> bool {
        matches!(self, TransactionKind::Buy | TransactionKind::Sell)
    }

    pub fn is_corporate_action(&self) -> bool {
        matches!(
            self,
            TransactionKind::Merge | TransactionKind::Split | TransactionKind::Dividend
        )
    }
}

impl FromStr for TransactionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            TRANSACTION_KIND_BUY => Ok(TransactionKind::Buy),
            TRANSACTION_KIND_SELL => Ok(TransactionKind::Sell),
            TRANSACTION_KIND_MERGE => Ok(TransactionKind::Merge),
            TRANSACTION_KIND_SPLIT => Ok(TransactionKind::Split),
            TRANSACTION_KIND_DIVIDEND => Ok(TransactionKind::Dividend),
            other => Err(ValidationError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable ledger fact for one (portfolio, symbol).
///
/// `amount` is always the gross trade value (`shares x price` for trades,
/// the absolute cash figure for dividend events); fees are itemized in
/// their own fields and never netted into `amount`.
///
/// Edits and deletes replace the fact set for a symbol; derived state is
/// never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub portfolio_id: String,
    pub symbol: String,
    pub kind: TransactionKind,
    pub transacted_at: DateTime<Utc>,

    pub shares: Decimal,
    pub price: Decimal,
    pub amount: Decimal,

    pub commission: Decimal,
    pub tax: Decimal,
    pub transfer_fee: Decimal,

    /// Rescale ratio for MERGE/SPLIT events.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<Decimal>,

    /// Cash dividend per 10 held shares.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per10_dividend: Option<Decimal>,

    /// Bonus shares per 10 held shares.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per10_bonus: Option<Decimal>,

    /// Capitalization-transfer shares per 10 held shares.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per10_transfer: Option<Decimal>,

    /// Position cycle this transaction belongs to.
    pub cycle: i32,

    pub comment: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn effective_date(&self) -> NaiveDate {
        self.transacted_at.naive_utc().date()
    }

    /// Total fees on this record.
    pub fn total_fees(&self) -> Decimal {
        self.commission + self.tax + self.transfer_fee
    }

    pub fn ratio_value(&self) -> Decimal {
        self.ratio.unwrap_or(Decimal::ZERO)
    }

    pub fn per10_dividend_value(&self) -> Decimal {
        self.per10_dividend.unwrap_or(Decimal::ZERO)
    }

    pub fn per10_bonus_value(&self) -> Decimal {
        self.per10_bonus.unwrap_or(Decimal::ZERO)
    }

    pub fn per10_transfer_value(&self) -> Decimal {
        self.per10_transfer.unwrap_or(Decimal::ZERO)
    }
}

/// Input model for recording a new transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub portfolio_id: String,
    pub symbol: String,
    /// Kind wire code (`BUY`, `SELL`, `MERGE`, `SPLIT`, `DIVIDEND`).
    pub kind: String,
    /// ISO 8601/RFC3339 timestamp or a plain `YYYY-MM-DD` date.
    pub transacted_at: String,
    pub shares: Option<Decimal>,
    pub price: Option<Decimal>,
    pub commission: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub transfer_fee: Option<Decimal>,
    pub ratio: Option<Decimal>,
    pub per10_dividend: Option<Decimal>,
    pub per10_bonus: Option<Decimal>,
    pub per10_transfer: Option<Decimal>,
    pub comment: Option<String>,
}

impl NewTransaction {
    /// Structural validation, independent of existing history.
    /// Kind-specific requirements are checked by the matching handler.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.portfolio_id.trim().is_empty() {
            return Err(ValidationError::MissingField("portfolioId".to_string()));
        }
        if self.symbol.trim().is_empty() {
            return Err(ValidationError::MissingField("symbol".to_string()));
        }
        TransactionKind::from_str(&self.kind)?;

        let transacted_at = self.parse_transacted_at()?;
        if transacted_at > Utc::now() {
            return Err(ValidationError::FutureDated(transacted_at));
        }

        for (name, value) in [
            ("shares", self.shares),
            ("price", self.price),
            ("commission", self.commission),
            ("tax", self.tax),
            ("transferFee", self.transfer_fee),
            ("per10Dividend", self.per10_dividend),
            ("per10Bonus", self.per10_bonus),
            ("per10Transfer", self.per10_transfer),
        ] {
            if let Some(v) = value {
                if v.is_sign_negative() {
                    return Err(ValidationError::InvalidInput(format!(
                        "Field '{}' must not be negative, got {}",
                        name, v
                    )));
                }
            }
        }

        if let Some(ratio) = self.ratio {
            if ratio <= Decimal::ZERO {
                return Err(ValidationError::InvalidInput(format!(
                    "Field 'ratio' must be positive, got {}",
                    ratio
                )));
            }
        }

        Ok(())
    }

    /// Parses the transaction timestamp, accepting RFC3339 or `YYYY-MM-DD`.
    pub fn parse_transacted_at(&self) -> std::result::Result<DateTime<Utc>, ValidationError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.transacted_at) {
            return Ok(dt.with_timezone(&Utc));
        }
        match NaiveDate::parse_from_str(&self.transacted_at, "%Y-%m-%d") {
            Ok(date) => Ok(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())),
            Err(e) => Err(ValidationError::DateTimeParse(e)),
        }
    }

    pub fn parsed_kind(&self) -> std::result::Result<TransactionKind, ValidationError> {
        TransactionKind::from_str(&self.kind)
    }
}

/// Input model for editing an existing transaction. The edited record fully
/// replaces the old fact; derived state is rebuilt by replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    pub id: String,
    #[serde(flatten)]
    pub fields: NewTransaction,
}

impl TransactionUpdate {
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingField("id".to_string()));
        }
        self.fields.validate()
    }
}

/// Outcome summary for a bulk import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,
    pub recomputed_symbols: Vec<String>,
}
