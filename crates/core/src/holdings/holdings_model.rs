//! Holding domain models.

use crate::holdings::financial_calculator::PnL;
use crate::holdings::replay::SharesAggregate;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Materialized position snapshot, one row per (portfolio, symbol).
///
/// Always fully derivable by replaying the symbol's transactions; never
/// independently mutated. Rows for fully liquidated symbols stay around
/// (inactive) to carry lifetime totals until the history itself is gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    pub portfolio_id: String,
    pub symbol: String,

    pub shares: Decimal,
    /// Average cost of the currently open cycle, buy-side fees included.
    pub hold_cost: Decimal,
    /// Lifetime average cost netting sells, fees, and cash dividends.
    pub diluted_cost: Decimal,

    pub buy_amount: Decimal,
    pub sell_amount: Decimal,
    pub dividend_amount: Decimal,
    pub buy_commission: Decimal,
    pub sell_commission: Decimal,
    pub buy_tax: Decimal,
    pub sell_tax: Decimal,
    pub other_fee: Decimal,

    pub active: bool,
    pub opened_at: Option<DateTime<Utc>>,
    pub liquidated_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Holding {
    pub fn holding_id(portfolio_id: &str, symbol: &str) -> String {
        format!("{}_{}", portfolio_id, symbol)
    }

    /// Total fees across all buckets.
    pub fn total_fees(&self) -> Decimal {
        self.buy_commission + self.sell_commission + self.buy_tax + self.sell_tax + self.other_fee
    }

    /// Net cash this holding has consumed: buys plus all fees, minus sell
    /// proceeds and cash dividends. Feeds the portfolio cash ledger.
    pub fn net_cash_outflow(&self) -> Decimal {
        self.buy_amount + self.total_fees() - self.sell_amount - self.dividend_amount
    }

    /// Rebuilds lifetime totals from a replayed aggregate.
    pub fn apply_aggregate(&mut self, all_history: &SharesAggregate) {
        self.shares = all_history.shares;
        self.buy_amount = all_history.buy_amount;
        self.sell_amount = all_history.sell_amount;
        self.dividend_amount = all_history.dividend_amount;
        self.buy_commission = all_history.buy_commission;
        self.sell_commission = all_history.sell_commission;
        self.buy_tax = all_history.buy_tax;
        self.sell_tax = all_history.sell_tax;
        self.other_fee = all_history.other_fee;
    }
}

/// Valuation view of one holding against a live quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingDetail {
    pub portfolio_id: String,
    pub symbol: String,
    pub shares: Decimal,
    pub hold_cost: Decimal,
    pub diluted_cost: Decimal,
    pub market_value: Decimal,
    pub float_pnl: PnL,
    pub accum_pnl: PnL,
    pub day_pnl: PnL,
}
