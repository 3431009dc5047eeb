//! Transaction kind handlers.
//!
//! One handler per family of kinds, dispatched by an exhaustive match over
//! the closed `TransactionKind` enum. Handlers are pure: input plus context
//! in, canonical record or validation failure out. They never persist and
//! never mutate shared state.

use crate::errors::{Result, ValidationError};
use crate::fees::{calculate_fees, FeeConfig, SymbolClassifier, TradeSide};
use crate::transactions::transactions_model::{NewTransaction, Transaction, TransactionKind};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Everything a handler may need beyond the raw input.
pub struct HandlerContext<'a> {
    pub kind: TransactionKind,
    /// Shares currently held for the (portfolio, symbol) pair.
    pub held_shares: Decimal,
    /// Cycle id assigned by the cycle manager.
    pub cycle: i32,
    pub fee_config: &'a FeeConfig,
    pub classifier: &'a SymbolClassifier,
    pub now: DateTime<Utc>,
}

pub trait TransactionHandler: Send + Sync {
    fn supports(&self, kind: TransactionKind) -> bool;
    fn handle(&self, input: &NewTransaction, context: &HandlerContext<'_>) -> Result<Transaction>;
}

/// Picks the handler for a kind. The match is exhaustive over the closed
/// enum, so an unsupported kind cannot reach runtime dispatch.
pub fn handler_for(kind: TransactionKind) -> &'static dyn TransactionHandler {
    match kind {
        TransactionKind::Buy | TransactionKind::Sell => &TradeHandler,
        TransactionKind::Merge | TransactionKind::Split => &RatioHandler,
        TransactionKind::Dividend => &DividendHandler,
    }
}

fn base_record(input: &NewTransaction, context: &HandlerContext<'_>) -> Result<Transaction> {
    let transacted_at = input.parse_transacted_at()?;
    Ok(Transaction {
        id: input
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        portfolio_id: input.portfolio_id.clone(),
        symbol: input.symbol.clone(),
        kind: context.kind,
        transacted_at,
        shares: Decimal::ZERO,
        price: Decimal::ZERO,
        amount: Decimal::ZERO,
        commission: Decimal::ZERO,
        tax: Decimal::ZERO,
        transfer_fee: Decimal::ZERO,
        ratio: None,
        per10_dividend: None,
        per10_bonus: None,
        per10_transfer: None,
        cycle: context.cycle,
        comment: input.comment.clone(),
        created_at: context.now,
        updated_at: context.now,
    })
}

fn required_positive(
    value: Option<Decimal>,
    field: &str,
) -> std::result::Result<Decimal, ValidationError> {
    match value {
        Some(v) if v > Decimal::ZERO => Ok(v),
        Some(v) => Err(ValidationError::InvalidInput(format!(
            "Field '{}' must be positive, got {}",
            field, v
        ))),
        None => Err(ValidationError::MissingField(field.to_string())),
    }
}

/// BUY/SELL: gross amount plus itemized fees.
///
/// Fees explicitly supplied on the input win over the schedule, so imports
/// can carry broker-confirmed figures; anything absent is computed from
/// the portfolio's fee configuration.
pub struct TradeHandler;

impl TransactionHandler for TradeHandler {
    fn supports(&self, kind: TransactionKind) -> bool {
        kind.is_trade()
    }

    fn handle(&self, input: &NewTransaction, context: &HandlerContext<'_>) -> Result<Transaction> {
        let shares = required_positive(input.shares, "shares")?;
        let price = required_positive(input.price, "price")?;
        let amount = shares * price;

        let side = match context.kind {
            TransactionKind::Buy => TradeSide::Buy,
            _ => TradeSide::Sell,
        };
        let computed = calculate_fees(
            context.classifier.classify(&input.symbol),
            side,
            amount,
            context.fee_config,
        );

        let mut record = base_record(input, context)?;
        record.shares = shares;
        record.price = price;
        record.amount = amount;
        record.commission = input.commission.unwrap_or(computed.commission);
        record.tax = input.tax.unwrap_or(computed.tax);
        record.transfer_fee = input.transfer_fee.unwrap_or(computed.transfer_fee);
        Ok(record)
    }
}

/// MERGE/SPLIT: records the rescale ratio; all monetary fields stay zero.
pub struct RatioHandler;

impl TransactionHandler for RatioHandler {
    fn supports(&self, kind: TransactionKind) -> bool {
        matches!(kind, TransactionKind::Merge | TransactionKind::Split)
    }

    fn handle(&self, input: &NewTransaction, context: &HandlerContext<'_>) -> Result<Transaction> {
        let ratio = required_positive(input.ratio, "ratio")?;

        let mut record = base_record(input, context)?;
        record.ratio = Some(ratio);
        Ok(record)
    }
}

/// DIVIDEND: converts the per-10-shares cash leg into an absolute figure
/// using the currently held share count; stock legs stay as per-10 ratios
/// and are resolved by the replay engine against the share count at their
/// point in history.
pub struct DividendHandler;

impl TransactionHandler for DividendHandler {
    fn supports(&self, kind: TransactionKind) -> bool {
        kind == TransactionKind::Dividend
    }

    fn handle(&self, input: &NewTransaction, context: &HandlerContext<'_>) -> Result<Transaction> {
        let per10_dividend = input.per10_dividend.unwrap_or(Decimal::ZERO);
        let per10_bonus = input.per10_bonus.unwrap_or(Decimal::ZERO);
        let per10_transfer = input.per10_transfer.unwrap_or(Decimal::ZERO);

        if per10_dividend.is_zero() && per10_bonus.is_zero() && per10_transfer.is_zero() {
            return Err(ValidationError::InvalidInput(
                "Dividend requires at least one per-10-shares leg".to_string(),
            )
            .into());
        }

        let mut record = base_record(input, context)?;
        record.amount = context.held_shares * per10_dividend / Decimal::TEN;
        record.per10_dividend = input.per10_dividend;
        record.per10_bonus = input.per10_bonus;
        record.per10_transfer = input.per10_transfer;
        record.commission = input.commission.unwrap_or(Decimal::ZERO);
        record.tax = input.tax.unwrap_or(Decimal::ZERO);
        record.transfer_fee = input.transfer_fee.unwrap_or(Decimal::ZERO);
        Ok(record)
    }
}
