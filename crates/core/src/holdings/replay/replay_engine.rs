use crate::constants::{is_quantity_significant, ROUNDING_SCALE};
use crate::errors::{CalculatorError, Error, Result, StateError};
use crate::holdings::replay::state::SharesAggregate;
use crate::transactions::{Transaction, TransactionKind};

use rust_decimal::Decimal;

/// Folds an ordered transaction slice into a `SharesAggregate`.
///
/// The caller controls the slice: the all-history slice feeds diluted cost
/// and lifetime P&L, the current-cycle slice feeds hold cost. Running the
/// fold twice over the same input yields identical output.
pub fn replay<'a, I>(transactions: I) -> Result<SharesAggregate>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut aggregate = SharesAggregate::default();
    for transaction in transactions {
        apply_transaction(&mut aggregate, transaction)?;
    }
    Ok(aggregate)
}

/// Applies a single transaction to the running aggregate.
///
/// An over-sell here means the slice itself is inconsistent (possible after
/// historical edits); it is reported as a `StateError`, never clamped.
pub fn apply_transaction(aggregate: &mut SharesAggregate, transaction: &Transaction) -> Result<()> {
    match transaction.kind {
        TransactionKind::Buy => {
            aggregate.shares += transaction.shares;
            aggregate.buy_shares += transaction.shares;
            aggregate.buy_amount += transaction.amount;
            aggregate.buy_commission += transaction.commission;
            aggregate.buy_tax += transaction.tax + transaction.transfer_fee;
            if aggregate.opened_at.is_none() {
                aggregate.opened_at = Some(transaction.transacted_at);
            }
        }
        TransactionKind::Sell => {
            if transaction.shares > aggregate.shares {
                return Err(Error::State(StateError::InsufficientShares {
                    symbol: transaction.symbol.clone(),
                    requested: transaction.shares,
                    held: aggregate.shares,
                }));
            }
            aggregate.shares -= transaction.shares;
            aggregate.sell_amount += transaction.amount;
            aggregate.sell_commission += transaction.commission;
            aggregate.sell_tax += transaction.tax + transaction.transfer_fee;
            if !is_quantity_significant(&aggregate.shares) {
                aggregate.shares = Decimal::ZERO;
                aggregate.liquidated_at = Some(transaction.transacted_at);
            }
        }
        TransactionKind::Merge => {
            let ratio = positive_ratio(transaction)?;
            aggregate.shares = (aggregate.shares / ratio).round_dp(ROUNDING_SCALE);
            aggregate.buy_shares = (aggregate.buy_shares / ratio).round_dp(ROUNDING_SCALE);
            aggregate.other_fee += transaction.total_fees();
        }
        TransactionKind::Split => {
            let ratio = positive_ratio(transaction)?;
            aggregate.shares = (aggregate.shares * ratio).round_dp(ROUNDING_SCALE);
            aggregate.buy_shares = (aggregate.buy_shares * ratio).round_dp(ROUNDING_SCALE);
            aggregate.other_fee += transaction.total_fees();
        }
        TransactionKind::Dividend => {
            // Every leg is evaluated against the share count immediately
            // before the event.
            let held = aggregate.shares;

            aggregate.dividend_amount +=
                transaction.per10_dividend_value() / Decimal::TEN * held;

            let bonus_shares = transaction.per10_bonus_value() / Decimal::TEN * held;
            let transfer_shares = transaction.per10_transfer_value() / Decimal::TEN * held;
            let stock_shares = (bonus_shares + transfer_shares).round_dp(ROUNDING_SCALE);

            aggregate.shares += stock_shares;
            aggregate.buy_shares += stock_shares;
            aggregate.other_fee += transaction.total_fees();
        }
    }
    Ok(())
}

fn positive_ratio(transaction: &Transaction) -> Result<Decimal> {
    match transaction.ratio {
        Some(ratio) if ratio > Decimal::ZERO => Ok(ratio),
        other => Err(Error::Calculation(CalculatorError::InvalidRatio {
            transaction_id: transaction.id.clone(),
            ratio: other.unwrap_or(Decimal::ZERO),
        })),
    }
}
