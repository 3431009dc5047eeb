use crate::constants::is_quantity_significant;
use crate::errors::Result;
use crate::holdings::HoldingServiceTrait;
use crate::portfolio::portfolio_model::{CashTransfer, NewCashTransfer, PortfolioOverview};
use crate::portfolio::portfolio_traits::{CashTransferRepositoryTrait, PortfolioServiceTrait};
use crate::quotes::QuoteProviderTrait;

use async_trait::async_trait;
use chrono::Utc;
use log::warn;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Rolls all holdings plus the cash ledger up into a portfolio overview.
pub struct PortfolioService {
    holding_service: Arc<dyn HoldingServiceTrait>,
    transfer_repository: Arc<dyn CashTransferRepositoryTrait>,
    quote_provider: Arc<dyn QuoteProviderTrait>,
}

impl PortfolioService {
    pub fn new(
        holding_service: Arc<dyn HoldingServiceTrait>,
        transfer_repository: Arc<dyn CashTransferRepositoryTrait>,
        quote_provider: Arc<dyn QuoteProviderTrait>,
    ) -> Self {
        Self {
            holding_service,
            transfer_repository,
            quote_provider,
        }
    }
}

#[async_trait]
impl PortfolioServiceTrait for PortfolioService {
    fn list_transfers(&self, portfolio_id: &str) -> Result<Vec<CashTransfer>> {
        self.transfer_repository.list_transfers(portfolio_id)
    }

    async fn record_transfer(&self, input: NewCashTransfer) -> Result<CashTransfer> {
        input.validate()?;
        let now = Utc::now();
        let transfer = CashTransfer {
            id: Uuid::new_v4().to_string(),
            portfolio_id: input.portfolio_id.clone(),
            kind: crate::portfolio::CashTransferKind::from_str(&input.kind)?,
            amount: input.amount,
            transferred_at: input.parse_transferred_at()?,
            comment: input.comment.clone(),
            created_at: now,
        };
        self.transfer_repository.create_transfer(transfer).await
    }

    async fn delete_transfer(&self, transfer_id: String) -> Result<CashTransfer> {
        self.transfer_repository.delete_transfer(&transfer_id).await
    }

    async fn compute_overview(&self, portfolio_id: &str) -> Result<PortfolioOverview> {
        let transfers = self.transfer_repository.list_transfers(portfolio_id)?;
        let principal: Decimal = transfers.iter().map(|t| t.signed_amount()).sum();

        let holdings = self.holding_service.list_holdings(portfolio_id)?;

        let mut cash = principal;
        let mut market_value = Decimal::ZERO;
        let mut float_amount = Decimal::ZERO;
        let mut accum_amount = Decimal::ZERO;
        let mut day_float_amount = Decimal::ZERO;

        for holding in &holdings {
            // Trading cash flow: buys and fees consumed cash, sells and
            // cash dividends returned it. Inactive rows still count.
            cash -= holding.net_cash_outflow();

            if !holding.active || !is_quantity_significant(&holding.shares) {
                // Fully liquidated: market value is zero, lifetime P&L is
                // realized sells plus dividends minus everything paid.
                accum_amount += holding.sell_amount + holding.dividend_amount
                    - holding.buy_amount
                    - holding.total_fees();
                continue;
            }

            match self.quote_provider.get_quote(&holding.symbol).await {
                Ok(quote) => {
                    if let Some(detail) = self
                        .holding_service
                        .compute_holding_detail(portfolio_id, &holding.symbol, &quote)
                        .await?
                    {
                        market_value += detail.market_value;
                        float_amount += detail.float_pnl.amount;
                        accum_amount += detail.accum_pnl.amount;
                        day_float_amount += detail.day_pnl.amount;
                    }
                }
                Err(e) => {
                    // Degrade to cost-valued market value rather than
                    // failing the whole overview for one missing quote.
                    warn!(
                        "Quote unavailable for {}: {}. Valuing position at hold cost.",
                        holding.symbol, e
                    );
                    let cost_value = holding.shares * holding.hold_cost;
                    market_value += cost_value;
                    accum_amount += cost_value + holding.sell_amount + holding.dividend_amount
                        - holding.buy_amount
                        - holding.total_fees();
                }
            }
        }

        Ok(PortfolioOverview {
            portfolio_id: portfolio_id.to_string(),
            total_assets: market_value + cash,
            market_value,
            cash,
            principal,
            float_amount,
            accum_amount,
            day_float_amount,
        })
    }
}
