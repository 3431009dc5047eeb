use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Running totals produced by replaying a transaction slice.
///
/// `buy_shares` tracks shares acquired through buys and stock-dividend legs
/// (rescaled by merges/splits alongside `shares`); it is the denominator
/// for the current hold cost. The fee buckets attribute commission and
/// taxes to the side of the originating trade; fees carried on corporate
/// action records land in `other_fee`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharesAggregate {
    pub shares: Decimal,
    pub buy_shares: Decimal,

    pub buy_amount: Decimal,
    pub sell_amount: Decimal,
    pub dividend_amount: Decimal,

    pub buy_commission: Decimal,
    pub sell_commission: Decimal,
    pub buy_tax: Decimal,
    pub sell_tax: Decimal,
    pub other_fee: Decimal,

    /// Timestamp of the first BUY seen in the slice.
    pub opened_at: Option<DateTime<Utc>>,
    /// Timestamp of the most recent full liquidation, if any.
    pub liquidated_at: Option<DateTime<Utc>>,
}

impl SharesAggregate {
    /// Total fees across all buckets.
    pub fn total_fees(&self) -> Decimal {
        self.buy_commission + self.sell_commission + self.buy_tax + self.sell_tax + self.other_fee
    }

    /// Lifetime acquisition cost: gross buy amount plus buy-side fees.
    pub fn total_buy_cost(&self) -> Decimal {
        self.buy_amount + self.buy_commission + self.buy_tax
    }
}
