//! Transactions module - the append-only ledger and its write path.

mod handlers;
mod transactions_constants;
mod transactions_model;
mod transactions_service;
mod transactions_traits;

#[cfg(test)]
mod transactions_service_tests;

pub use handlers::{handler_for, HandlerContext, TransactionHandler};
pub use transactions_constants::*;
pub use transactions_model::{
    ImportSummary, NewTransaction, Transaction, TransactionKind, TransactionUpdate,
};
pub use transactions_service::TransactionService;
pub use transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
