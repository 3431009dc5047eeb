use crate::constants::is_quantity_significant;
use crate::cycles::{derive_cycles, verify_cycle_contiguity, PositionCycle};
use crate::errors::Result;
use crate::holdings::financial_calculator::{
    self, accum_pnl, day_float, diluted_cost, float_pnl, hold_cost, market_value, DayTradeContext,
};
use crate::holdings::holdings_model::{Holding, HoldingDetail};
use crate::holdings::holdings_traits::{HoldingRepositoryTrait, HoldingServiceTrait};
use crate::holdings::replay::{replay, SharesAggregate};
use crate::quotes::Quote;
use crate::transactions::{Transaction, TransactionKind, TransactionRepositoryTrait};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Recomputes and persists the derived Holding snapshot per symbol whenever
/// its transaction history changes.
///
/// There is no incremental path: full per-symbol replay is the consistency
/// mechanism, and it is idempotent, so a failed recompute is always safe to
/// retry. Recomputes for the same (portfolio, symbol) key are serialized
/// through a per-key lock; concurrent writers would otherwise race on the
/// upsert and on cycle-id allocation.
pub struct HoldingService {
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    holding_repository: Arc<dyn HoldingRepositoryTrait>,
    recompute_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl HoldingService {
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        holding_repository: Arc<dyn HoldingRepositoryTrait>,
    ) -> Self {
        Self {
            transaction_repository,
            holding_repository,
            recompute_locks: DashMap::new(),
        }
    }

    fn lock_for(&self, portfolio_id: &str, symbol: &str) -> Arc<Mutex<()>> {
        let key = format!("{}:{}", portfolio_id, symbol);
        self.recompute_locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Replays both slices and assembles the Holding row.
    fn build_holding(
        portfolio_id: &str,
        symbol: &str,
        transactions: &[Transaction],
    ) -> Result<Holding> {
        verify_cycle_contiguity(symbol, transactions)?;

        let all_history = replay(transactions)?;
        let current_cycle_id = transactions.iter().map(|t| t.cycle).max().unwrap_or(0);
        let current_cycle: SharesAggregate =
            replay(transactions.iter().filter(|t| t.cycle == current_cycle_id))?;

        let active = is_quantity_significant(&all_history.shares);
        let hold_cost_value = if active {
            hold_cost(&current_cycle)
        } else {
            Decimal::ZERO
        };

        let mut holding = Holding {
            id: Holding::holding_id(portfolio_id, symbol),
            portfolio_id: portfolio_id.to_string(),
            symbol: symbol.to_string(),
            shares: Decimal::ZERO,
            hold_cost: hold_cost_value,
            diluted_cost: diluted_cost(&all_history, all_history.shares),
            buy_amount: Decimal::ZERO,
            sell_amount: Decimal::ZERO,
            dividend_amount: Decimal::ZERO,
            buy_commission: Decimal::ZERO,
            sell_commission: Decimal::ZERO,
            buy_tax: Decimal::ZERO,
            sell_tax: Decimal::ZERO,
            other_fee: Decimal::ZERO,
            active,
            opened_at: if active {
                current_cycle.opened_at.or(all_history.opened_at)
            } else {
                all_history.opened_at
            },
            liquidated_at: if active {
                None
            } else {
                all_history.liquidated_at
            },
            updated_at: Utc::now(),
        };
        holding.apply_aggregate(&all_history);
        Ok(holding)
    }
}

#[async_trait]
impl HoldingServiceTrait for HoldingService {
    fn get_holding(&self, portfolio_id: &str, symbol: &str) -> Result<Option<Holding>> {
        self.holding_repository.get_holding(portfolio_id, symbol)
    }

    fn list_holdings(&self, portfolio_id: &str) -> Result<Vec<Holding>> {
        self.holding_repository.list_holdings(portfolio_id)
    }

    async fn recompute_holding(
        &self,
        portfolio_id: &str,
        symbol: &str,
    ) -> Result<Option<Holding>> {
        let lock = self.lock_for(portfolio_id, symbol);
        let _guard = lock.lock().await;

        let transactions = self
            .transaction_repository
            .list_transactions(portfolio_id, symbol)?;

        if transactions.is_empty() {
            debug!(
                "No transactions remain for {}:{}. Deleting holding.",
                portfolio_id, symbol
            );
            self.holding_repository
                .delete_holding(portfolio_id, symbol)
                .await?;
            return Ok(None);
        }

        let holding = Self::build_holding(portfolio_id, symbol, &transactions)?;

        // A holding row disappears only when replay yields zero shares AND
        // zero lifetime buy amount, i.e. the history is economically empty.
        if !is_quantity_significant(&holding.shares) && holding.buy_amount.is_zero() {
            self.holding_repository
                .delete_holding(portfolio_id, symbol)
                .await?;
            return Ok(None);
        }

        let persisted = self.holding_repository.upsert_holding(holding).await?;
        Ok(Some(persisted))
    }

    async fn recompute_portfolio(&self, portfolio_id: &str) -> Result<Vec<Holding>> {
        let symbols = self
            .transaction_repository
            .list_symbols_with_history(portfolio_id)?;

        let mut holdings = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if let Some(holding) = self.recompute_holding(portfolio_id, &symbol).await? {
                holdings.push(holding);
            }
        }
        Ok(holdings)
    }

    async fn compute_holding_detail(
        &self,
        portfolio_id: &str,
        symbol: &str,
        quote: &Quote,
    ) -> Result<Option<HoldingDetail>> {
        let transactions = self
            .transaction_repository
            .list_transactions(portfolio_id, symbol)?;
        if transactions.is_empty() {
            return Ok(None);
        }

        let all_history = replay(&transactions)?;
        let current_cycle_id = transactions.iter().map(|t| t.cycle).max().unwrap_or(0);
        let current_cycle =
            replay(transactions.iter().filter(|t| t.cycle == current_cycle_id))?;

        let shares = all_history.shares;
        let hold_cost_value = if is_quantity_significant(&shares) {
            hold_cost(&current_cycle)
        } else {
            Decimal::ZERO
        };
        let market_value_now = market_value(shares, quote.price);

        let today = Utc::now().date_naive();
        let yesterday_aggregate = replay(
            transactions
                .iter()
                .filter(|t| t.effective_date() < today),
        )?;
        let mut today_buy_amount = Decimal::ZERO;
        let mut today_sell_amount = Decimal::ZERO;
        for transaction in transactions.iter().filter(|t| t.effective_date() == today) {
            match transaction.kind {
                TransactionKind::Buy => today_buy_amount += transaction.amount,
                TransactionKind::Sell => today_sell_amount += transaction.amount,
                _ => {}
            }
        }

        let day_context = DayTradeContext {
            yesterday_shares: yesterday_aggregate.shares,
            yesterday_close: quote.yesterday_close(),
            today_buy_amount,
            today_sell_amount,
        };

        Ok(Some(HoldingDetail {
            portfolio_id: portfolio_id.to_string(),
            symbol: symbol.to_string(),
            shares,
            hold_cost: hold_cost_value,
            diluted_cost: financial_calculator::diluted_cost(&all_history, shares),
            market_value: market_value_now,
            float_pnl: float_pnl(quote.price, hold_cost_value, shares),
            accum_pnl: accum_pnl(&all_history, market_value_now),
            day_pnl: day_float(
                market_value_now,
                shares,
                quote.price,
                hold_cost_value,
                &day_context,
            ),
        }))
    }

    fn list_cycles(&self, portfolio_id: &str, symbol: &str) -> Result<Vec<PositionCycle>> {
        let transactions = self
            .transaction_repository
            .list_transactions(portfolio_id, symbol)?;
        verify_cycle_contiguity(symbol, &transactions)?;
        Ok(derive_cycles(&transactions))
    }
}
