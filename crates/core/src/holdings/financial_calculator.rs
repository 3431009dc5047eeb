//! Cost-basis and profit/loss formulas.
//!
//! All functions are pure over aggregates and an externally supplied quote.
//! No formula divides by zero: every zero-denominator case resolves to the
//! documented policy value `Decimal::ZERO`.

use crate::constants::DECIMAL_PRECISION;
use crate::holdings::replay::SharesAggregate;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A profit/loss amount with its normalized rate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PnL {
    pub amount: Decimal,
    pub rate: Decimal,
}

/// Inputs for the day P&L computation that come from the transaction log
/// rather than the quote.
#[derive(Debug, Clone, Copy, Default)]
pub struct DayTradeContext {
    /// Share count held at the prior session's close.
    pub yesterday_shares: Decimal,
    /// The prior session's closing price.
    pub yesterday_close: Decimal,
    /// Gross amount bought today.
    pub today_buy_amount: Decimal,
    /// Gross amount sold today.
    pub today_sell_amount: Decimal,
}

/// Average cost per share of the currently open cycle, including buy-side
/// commission. Zero when the cycle has no buy shares.
pub fn hold_cost(current_cycle: &SharesAggregate) -> Decimal {
    if current_cycle.buy_shares.is_zero() {
        return Decimal::ZERO;
    }
    ((current_cycle.buy_amount + current_cycle.buy_commission) / current_cycle.buy_shares)
        .round_dp(DECIMAL_PRECISION)
}

/// Lifetime average cost per share netting all buys, sells, fees, and cash
/// dividends across every cycle. Zero when no shares are currently held.
pub fn diluted_cost(all_history: &SharesAggregate, current_shares: Decimal) -> Decimal {
    if current_shares.is_zero() {
        return Decimal::ZERO;
    }
    let net_cost = all_history.buy_amount - all_history.sell_amount
        + all_history.buy_commission
        + all_history.sell_commission
        + all_history.buy_tax
        + all_history.sell_tax
        + all_history.other_fee
        - all_history.dividend_amount;
    (net_cost / current_shares).round_dp(DECIMAL_PRECISION)
}

pub fn market_value(shares: Decimal, price: Decimal) -> Decimal {
    shares * price
}

/// Unrealized P&L of the open position measured against hold cost.
/// Rate normalizes by the position's cost value; zero when costless.
pub fn float_pnl(price: Decimal, hold_cost: Decimal, shares: Decimal) -> PnL {
    let amount = (price - hold_cost) * shares;
    let cost_value = hold_cost * shares;
    let rate = if cost_value.is_zero() {
        Decimal::ZERO
    } else {
        (amount / cost_value).round_dp(DECIMAL_PRECISION)
    };
    PnL { amount, rate }
}

/// Lifetime P&L: market value of what is still held, minus everything ever
/// paid (gross buys plus all fees), plus everything ever received (sells
/// and cash dividends). Rate normalizes by lifetime buy cost including
/// buy-side commission; zero when nothing was ever bought.
pub fn accum_pnl(all_history: &SharesAggregate, market_value: Decimal) -> PnL {
    let total_cost_basis = all_history.buy_amount + all_history.total_fees();
    let amount =
        market_value - total_cost_basis + all_history.sell_amount + all_history.dividend_amount;

    let buy_cost = all_history.buy_amount + all_history.buy_commission;
    let rate = if buy_cost.is_zero() {
        Decimal::ZERO
    } else {
        (amount / buy_cost).round_dp(DECIMAL_PRECISION)
    };
    PnL { amount, rate }
}

/// Day P&L, two branches.
///
/// When a prior close exists for the position, today's move is the change
/// in market value adjusted for today's trades. When the position was
/// opened today there is no prior close; the move is measured against hold
/// cost instead. Rates normalize by the capital exposed at the start of
/// the day (prior close value plus today's buys, or just today's buys).
pub fn day_float(
    market_value: Decimal,
    shares: Decimal,
    price: Decimal,
    hold_cost: Decimal,
    context: &DayTradeContext,
) -> PnL {
    let yesterday_market_value = context.yesterday_shares * context.yesterday_close;

    let (amount, base) = if yesterday_market_value > Decimal::ZERO {
        (
            market_value - yesterday_market_value + context.today_sell_amount
                - context.today_buy_amount,
            yesterday_market_value + context.today_buy_amount,
        )
    } else {
        (
            (price - hold_cost) * shares + context.today_sell_amount - context.today_buy_amount,
            context.today_buy_amount,
        )
    };

    let rate = if base.is_zero() {
        Decimal::ZERO
    } else {
        (amount / base).round_dp(DECIMAL_PRECISION)
    };
    PnL { amount, rate }
}
