//! Portfolio module - cash transfer ledger and portfolio-level rollup.

mod portfolio_model;
mod portfolio_service;
mod portfolio_traits;


pub use portfolio_model::{
    CashTransfer, CashTransferKind, NewCashTransfer, PortfolioOverview,
};
pub use portfolio_service::PortfolioService;
pub use portfolio_traits::{CashTransferRepositoryTrait, PortfolioServiceTrait};
