use super::portfolio_model::{CashTransfer, NewCashTransfer, PortfolioOverview};
use crate::errors::Result;

use async_trait::async_trait;

/// Trait defining the contract for cash transfer persistence.
#[async_trait]
pub trait CashTransferRepositoryTrait: Send + Sync {
    fn list_transfers(&self, portfolio_id: &str) -> Result<Vec<CashTransfer>>;
    async fn create_transfer(&self, transfer: CashTransfer) -> Result<CashTransfer>;
    async fn delete_transfer(&self, transfer_id: &str) -> Result<CashTransfer>;
}

/// Trait defining the contract for portfolio-level operations.
#[async_trait]
pub trait PortfolioServiceTrait: Send + Sync {
    fn list_transfers(&self, portfolio_id: &str) -> Result<Vec<CashTransfer>>;
    async fn record_transfer(&self, input: NewCashTransfer) -> Result<CashTransfer>;
    async fn delete_transfer(&self, transfer_id: String) -> Result<CashTransfer>;

    /// Rolls all holdings and the cash ledger up into one overview.
    async fn compute_overview(&self, portfolio_id: &str) -> Result<PortfolioOverview>;
}
