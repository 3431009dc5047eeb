//! Stockfolio Core - Portfolio ledger and position calculation engine.
//!
//! Turns an append-only, per-symbol transaction history into a consistent,
//! replayable snapshot of shares held, cost basis, and realized/unrealized
//! performance. Storage and price quotes are external collaborators behind
//! the traits defined here.

pub mod constants;
pub mod cycles;
pub mod errors;
pub mod fees;
pub mod holdings;
pub mod portfolio;
pub mod quotes;
pub mod transactions;
pub mod utils;

// Re-export common types
pub use errors::Error;
pub use errors::Result;
pub use holdings::{Holding, HoldingDetail, HoldingService};
pub use portfolio::{PortfolioOverview, PortfolioService};
pub use transactions::{Transaction, TransactionKind, TransactionService};
