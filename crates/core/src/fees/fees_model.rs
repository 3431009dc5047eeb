use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Exchange venue a symbol is listed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Exchange {
    Shanghai,
    Shenzhen,
}

/// Coarse instrument classification. Funds and equities face different
/// tax treatment, so the split matters to the fee schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstrumentKind {
    Equity,
    Fund,
}

/// Result of classifying a symbol: where it trades and what it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentClass {
    pub exchange: Exchange,
    pub kind: InstrumentKind,
}

impl InstrumentClass {
    pub fn is_equity(&self) -> bool {
        self.kind == InstrumentKind::Equity
    }
}

/// Direction of a trade, as the fee schedule sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Commission schedule for one instrument tier: proportional rate with a
/// per-trade floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionTier {
    pub rate: Decimal,
    pub minimum: Decimal,
}

/// Portfolio-level fee configuration.
///
/// Stamp tax applies only to sells of equity-like instruments; the transfer
/// levy applies only to equity-like trades on the Shanghai venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeConfig {
    pub equity_commission: CommissionTier,
    pub fund_commission: CommissionTier,
    pub stamp_tax_rate: Decimal,
    pub transfer_fee_rate: Decimal,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            equity_commission: CommissionTier {
                rate: dec!(0.0003),
                minimum: dec!(5),
            },
            fund_commission: CommissionTier {
                rate: dec!(0.0003),
                minimum: dec!(5),
            },
            stamp_tax_rate: dec!(0.0005),
            transfer_fee_rate: dec!(0.00001),
        }
    }
}

impl FeeConfig {
    /// The commission tier applicable to the given instrument kind.
    pub fn commission_tier(&self, kind: InstrumentKind) -> &CommissionTier {
        match kind {
            InstrumentKind::Equity => &self.equity_commission,
            InstrumentKind::Fund => &self.fund_commission,
        }
    }
}

/// Itemized fee breakdown for a single trade.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeBreakdown {
    pub commission: Decimal,
    pub tax: Decimal,
    pub transfer_fee: Decimal,
}

impl FeeBreakdown {
    pub fn total(&self) -> Decimal {
        self.commission + self.tax + self.transfer_fee
    }

    /// Human-readable itemization.
    pub fn describe(&self) -> String {
        format!(
            "commission {}, stamp tax {}, transfer fee {} (total {})",
            self.commission,
            self.tax,
            self.transfer_fee,
            self.total()
        )
    }
}
