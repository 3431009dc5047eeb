//! Fee calculation - commission, stamp tax, and transfer levy for trades.

mod fees_calculator;
mod fees_model;

pub use fees_calculator::{calculate_fees, classify_symbol, SymbolClassifier};
pub use fees_model::{
    CommissionTier, Exchange, FeeBreakdown, FeeConfig, InstrumentClass, InstrumentKind, TradeSide,
};
