//! Position cycle tracking.
//!
//! A cycle is one maximal interval during which a (portfolio, symbol) pair
//! holds more than zero shares, bounded by full liquidations. Cost basis for
//! the currently open position must never blend in a prior, fully-closed
//! cycle's buys; cycle ids are what keep those slices apart.

mod cycles_manager;
mod cycles_model;

pub use cycles_manager::{assign_cycle, derive_cycles, verify_cycle_contiguity};
pub use cycles_model::PositionCycle;
