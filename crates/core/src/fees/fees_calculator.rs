use crate::fees::fees_model::{
    Exchange, FeeBreakdown, FeeConfig, InstrumentClass, InstrumentKind, TradeSide,
};
use crate::utils::cache::CacheTrait;

use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Classifies a symbol by its code pattern.
///
/// Six-digit A-share convention: codes starting with `6` are Shanghai
/// equities and `5` Shanghai funds; `0` and `3` are Shenzhen equities and
/// `1` Shenzhen funds. Unrecognized prefixes fall back to Shenzhen equity,
/// which attracts no venue-specific levy.
pub fn classify_symbol(symbol: &str) -> InstrumentClass {
    let (exchange, kind) = match symbol.chars().next() {
        Some('6') => (Exchange::Shanghai, InstrumentKind::Equity),
        Some('5') => (Exchange::Shanghai, InstrumentKind::Fund),
        Some('0') | Some('3') => (Exchange::Shenzhen, InstrumentKind::Equity),
        Some('1') => (Exchange::Shenzhen, InstrumentKind::Fund),
        _ => {
            debug!(
                "Unrecognized symbol pattern '{}'. Classifying as Shenzhen equity.",
                symbol
            );
            (Exchange::Shenzhen, InstrumentKind::Equity)
        }
    };
    InstrumentClass { exchange, kind }
}

/// Symbol classifier memoizing through a caller-injected cache.
#[derive(Clone)]
pub struct SymbolClassifier {
    cache: Arc<dyn CacheTrait<InstrumentClass>>,
}

impl SymbolClassifier {
    pub fn new(cache: Arc<dyn CacheTrait<InstrumentClass>>) -> Self {
        Self { cache }
    }

    pub fn classify(&self, symbol: &str) -> InstrumentClass {
        if let Some(class) = self.cache.get(symbol) {
            return class;
        }
        let class = classify_symbol(symbol);
        self.cache.set(symbol, class);
        class
    }
}

/// Computes the itemized fees for one trade.
///
/// Commission is `max(amount x rate, minimum)` per the instrument's tier.
/// Stamp tax applies to equity sells only; the transfer levy applies to
/// equity trades on the Shanghai venue, both sides, proportional to amount.
/// Pure function: no I/O, no side effects.
pub fn calculate_fees(
    class: InstrumentClass,
    side: TradeSide,
    amount: Decimal,
    config: &FeeConfig,
) -> FeeBreakdown {
    let tier = config.commission_tier(class.kind);
    let commission = (amount * tier.rate).max(tier.minimum);

    let tax = if class.is_equity() && side == TradeSide::Sell {
        amount * config.stamp_tax_rate
    } else {
        Decimal::ZERO
    };

    let transfer_fee = if class.is_equity() && class.exchange == Exchange::Shanghai {
        amount * config.transfer_fee_rate
    } else {
        Decimal::ZERO
    };

    FeeBreakdown {
        commission,
        tax,
        transfer_fee,
    }
}
