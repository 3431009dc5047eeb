//! Holdings module - derived position snapshots and their recompute path.

mod financial_calculator;
mod holdings_model;
mod holdings_service;
mod holdings_traits;
pub mod replay;


pub use financial_calculator::{
    accum_pnl, day_float, diluted_cost, float_pnl, hold_cost, market_value, DayTradeContext, PnL,
};
pub use holdings_model::{Holding, HoldingDetail};
pub use holdings_service::HoldingService;
pub use holdings_traits::{HoldingRepositoryTrait, HoldingServiceTrait};
