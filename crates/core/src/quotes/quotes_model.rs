use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single current quote for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    /// Latest traded price.
    pub price: Decimal,
    /// Absolute change against the prior session's close.
    pub change: Decimal,
    /// Percentage change against the prior session's close.
    pub change_percent: Decimal,
}

impl Quote {
    /// The prior session's closing price implied by price and change.
    pub fn yesterday_close(&self) -> Decimal {
        self.price - self.change
    }
}
