use crate::cycles::PositionCycle;
use crate::errors::Result;
use crate::holdings::holdings_model::{Holding, HoldingDetail};
use crate::quotes::Quote;

use async_trait::async_trait;

/// Trait defining the contract for Holding persistence.
///
/// Implemented by the storage collaborator; single-statement atomicity is
/// assumed for each call.
#[async_trait]
pub trait HoldingRepositoryTrait: Send + Sync {
    fn get_holding(&self, portfolio_id: &str, symbol: &str) -> Result<Option<Holding>>;
    fn list_holdings(&self, portfolio_id: &str) -> Result<Vec<Holding>>;
    async fn upsert_holding(&self, holding: Holding) -> Result<Holding>;
    async fn delete_holding(&self, portfolio_id: &str, symbol: &str) -> Result<()>;
}

/// Trait defining the contract for Holding service operations.
#[async_trait]
pub trait HoldingServiceTrait: Send + Sync {
    fn get_holding(&self, portfolio_id: &str, symbol: &str) -> Result<Option<Holding>>;
    fn list_holdings(&self, portfolio_id: &str) -> Result<Vec<Holding>>;

    /// Rebuilds the Holding for one symbol by full replay of its history.
    /// Returns None when no history remains and the row was deleted.
    async fn recompute_holding(&self, portfolio_id: &str, symbol: &str)
        -> Result<Option<Holding>>;

    /// Recomputes every symbol with any transaction history in a portfolio.
    async fn recompute_portfolio(&self, portfolio_id: &str) -> Result<Vec<Holding>>;

    /// Valuation view of one holding against a caller-supplied quote.
    async fn compute_holding_detail(
        &self,
        portfolio_id: &str,
        symbol: &str,
        quote: &Quote,
    ) -> Result<Option<HoldingDetail>>;

    /// Open/close intervals of every ownership cycle for display.
    fn list_cycles(&self, portfolio_id: &str, symbol: &str) -> Result<Vec<PositionCycle>>;
}
