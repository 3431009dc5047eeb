use super::transactions_model::*;
use crate::errors::Result;
use crate::fees::FeeBreakdown;

use async_trait::async_trait;
use rust_decimal::Decimal;

/// Trait defining the contract for Transaction persistence.
///
/// Implemented by the storage collaborator. `list_transactions` must return
/// records ordered by transaction date, ties broken by insertion order;
/// replay correctness depends on that ordering.
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction>;
    fn list_transactions(&self, portfolio_id: &str, symbol: &str) -> Result<Vec<Transaction>>;
    fn list_portfolio_transactions(&self, portfolio_id: &str) -> Result<Vec<Transaction>>;
    /// Distinct symbols with at least one transaction in the portfolio.
    fn list_symbols_with_history(&self, portfolio_id: &str) -> Result<Vec<String>>;
    async fn create_transaction(&self, transaction: Transaction) -> Result<Transaction>;
    async fn create_transactions(&self, transactions: Vec<Transaction>) -> Result<usize>;
    async fn update_transaction(&self, transaction: Transaction) -> Result<Transaction>;
    async fn delete_transaction(&self, transaction_id: &str) -> Result<Transaction>;
}

/// Trait defining the contract for Transaction service operations.
#[async_trait]
pub trait TransactionServiceTrait: Send + Sync {
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction>;
    fn list_transactions(&self, portfolio_id: &str, symbol: &str) -> Result<Vec<Transaction>>;
    fn list_portfolio_transactions(&self, portfolio_id: &str) -> Result<Vec<Transaction>>;

    /// Itemized fee preview for a prospective trade.
    fn preview_fees(
        &self,
        symbol: &str,
        kind: &str,
        shares: Decimal,
        price: Decimal,
    ) -> Result<FeeBreakdown>;

    async fn create_transaction(&self, input: NewTransaction) -> Result<Transaction>;
    async fn update_transaction(&self, update: TransactionUpdate) -> Result<Transaction>;
    async fn delete_transaction(&self, transaction_id: String) -> Result<Transaction>;

    /// Bulk import: groups by symbol, orders by (date, input order),
    /// persists everything, then triggers exactly one recompute per symbol.
    async fn import_transactions(&self, inputs: Vec<NewTransaction>) -> Result<ImportSummary>;
}
