use crate::cycles::{assign_cycle, verify_cycle_contiguity};
use crate::errors::{Error, Result, StateError, ValidationError};
use crate::fees::{calculate_fees, FeeBreakdown, FeeConfig, SymbolClassifier, TradeSide};
use crate::holdings::replay::{apply_transaction, replay};
use crate::holdings::HoldingServiceTrait;
use crate::transactions::handlers::{handler_for, HandlerContext};
use crate::transactions::transactions_model::*;
use crate::transactions::transactions_traits::{
    TransactionRepositoryTrait, TransactionServiceTrait,
};

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Write path for the transaction ledger.
///
/// Every mutation is validated against the existing history before anything
/// is persisted, then triggers a full per-symbol Holding recompute. The
/// recompute is not atomic with the write: a recompute failure leaves the
/// Holding stale (and logged) rather than rolling back the committed
/// transaction, because the Holding is a pure function of history and can
/// be rebuilt at any time.
pub struct TransactionService {
    repository: Arc<dyn TransactionRepositoryTrait>,
    holding_service: Arc<dyn HoldingServiceTrait>,
    fee_config: FeeConfig,
    classifier: SymbolClassifier,
}

impl TransactionService {
    pub fn new(
        repository: Arc<dyn TransactionRepositoryTrait>,
        holding_service: Arc<dyn HoldingServiceTrait>,
        fee_config: FeeConfig,
        classifier: SymbolClassifier,
    ) -> Self {
        Self {
            repository,
            holding_service,
            fee_config,
            classifier,
        }
    }

    /// Replays the hypothetical post-write history and rejects the write if
    /// any invariant would break (over-sell mid-history, cycle gap). The
    /// sort is stable, so same-date records keep their insertion order.
    fn preflight(symbol: &str, transactions: &mut Vec<Transaction>) -> Result<()> {
        transactions.sort_by_key(|t| t.transacted_at);
        verify_cycle_contiguity(symbol, transactions)?;
        replay(transactions.iter())?;
        Ok(())
    }

    /// Held shares for a dividend conversion: the persisted Holding when
    /// one exists, otherwise recomputed by full replay.
    fn held_shares_for_dividend(
        &self,
        portfolio_id: &str,
        symbol: &str,
        replayed_shares: Decimal,
    ) -> Result<Decimal> {
        match self.holding_service.get_holding(portfolio_id, symbol)? {
            Some(holding) => Ok(holding.shares),
            None => {
                debug!(
                    "No persisted holding for {}:{}. Using replayed share count for dividend.",
                    portfolio_id, symbol
                );
                Ok(replayed_shares)
            }
        }
    }

    async fn trigger_recompute(&self, operation: &str, portfolio_id: &str, symbol: &str) {
        if let Err(e) = self
            .holding_service
            .recompute_holding(portfolio_id, symbol)
            .await
        {
            error!(
                "Holding recompute failed after {} for {}:{}: {}. The write is committed; \
                 recompute is idempotent and safe to retry.",
                operation, portfolio_id, symbol, e
            );
        }
    }

    fn build_record(
        &self,
        input: &NewTransaction,
        held_shares: Decimal,
        cycle: i32,
    ) -> Result<Transaction> {
        let kind = input.parsed_kind()?;
        let context = HandlerContext {
            kind,
            held_shares,
            cycle,
            fee_config: &self.fee_config,
            classifier: &self.classifier,
            now: Utc::now(),
        };
        handler_for(kind).handle(input, &context)
    }
}

#[async_trait]
impl TransactionServiceTrait for TransactionService {
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        self.repository.get_transaction(transaction_id)
    }

    fn list_transactions(&self, portfolio_id: &str, symbol: &str) -> Result<Vec<Transaction>> {
        self.repository.list_transactions(portfolio_id, symbol)
    }

    fn list_portfolio_transactions(&self, portfolio_id: &str) -> Result<Vec<Transaction>> {
        self.repository.list_portfolio_transactions(portfolio_id)
    }

    fn preview_fees(
        &self,
        symbol: &str,
        kind: &str,
        shares: Decimal,
        price: Decimal,
    ) -> Result<FeeBreakdown> {
        let side = match kind.parse::<TransactionKind>()? {
            TransactionKind::Buy => TradeSide::Buy,
            TransactionKind::Sell => TradeSide::Sell,
            other => {
                return Err(ValidationError::InvalidInput(format!(
                    "Fee preview applies to trades only, got {}",
                    other
                ))
                .into())
            }
        };
        Ok(calculate_fees(
            self.classifier.classify(symbol),
            side,
            shares * price,
            &self.fee_config,
        ))
    }

    async fn create_transaction(&self, input: NewTransaction) -> Result<Transaction> {
        input.validate()?;
        let kind = input.parsed_kind()?;

        let history = self
            .repository
            .list_transactions(&input.portfolio_id, &input.symbol)?;
        let held_shares = replay(&history)?.shares;
        let max_cycle = history.iter().map(|t| t.cycle).max().unwrap_or(0);

        if kind == TransactionKind::Sell {
            let requested = input.shares.unwrap_or(Decimal::ZERO);
            if requested > held_shares {
                return Err(Error::State(StateError::InsufficientShares {
                    symbol: input.symbol.clone(),
                    requested,
                    held: held_shares,
                }));
            }
        }

        let cycle = assign_cycle(kind, &input.symbol, held_shares, max_cycle)?;

        let handler_held = if kind == TransactionKind::Dividend {
            self.held_shares_for_dividend(&input.portfolio_id, &input.symbol, held_shares)?
        } else {
            held_shares
        };
        let record = self.build_record(&input, handler_held, cycle)?;

        let mut hypothetical = history;
        hypothetical.push(record.clone());
        Self::preflight(&input.symbol, &mut hypothetical)?;

        let created = self.repository.create_transaction(record).await?;
        self.trigger_recompute("create", &created.portfolio_id, &created.symbol)
            .await;
        Ok(created)
    }

    async fn update_transaction(&self, update: TransactionUpdate) -> Result<Transaction> {
        update.validate()?;
        let existing = self.repository.get_transaction(&update.id)?;

        if update.fields.portfolio_id != existing.portfolio_id
            || update.fields.symbol != existing.symbol
        {
            return Err(ValidationError::InvalidInput(
                "Portfolio and symbol of an existing transaction cannot be changed".to_string(),
            )
            .into());
        }

        let others: Vec<Transaction> = self
            .repository
            .list_transactions(&existing.portfolio_id, &existing.symbol)?
            .into_iter()
            .filter(|t| t.id != existing.id)
            .collect();
        let held_shares = replay(&others)?.shares;

        // The edited fact keeps its identity and cycle; replay rebuilds
        // everything derived from it.
        let mut record = self.build_record(&update.fields, held_shares, existing.cycle)?;
        record.id = existing.id.clone();
        record.created_at = existing.created_at;

        let mut hypothetical = others;
        hypothetical.push(record.clone());
        Self::preflight(&existing.symbol, &mut hypothetical)?;

        let updated = self.repository.update_transaction(record).await?;
        self.trigger_recompute("update", &updated.portfolio_id, &updated.symbol)
            .await;
        Ok(updated)
    }

    async fn delete_transaction(&self, transaction_id: String) -> Result<Transaction> {
        let existing = self.repository.get_transaction(&transaction_id)?;

        let mut remaining: Vec<Transaction> = self
            .repository
            .list_transactions(&existing.portfolio_id, &existing.symbol)?
            .into_iter()
            .filter(|t| t.id != existing.id)
            .collect();
        Self::preflight(&existing.symbol, &mut remaining)?;

        let deleted = self.repository.delete_transaction(&transaction_id).await?;
        self.trigger_recompute("delete", &deleted.portfolio_id, &deleted.symbol)
            .await;
        Ok(deleted)
    }

    async fn import_transactions(&self, inputs: Vec<NewTransaction>) -> Result<ImportSummary> {
        for input in &inputs {
            input.validate()?;
        }

        // Group by (portfolio, symbol), keeping input order within a group.
        let mut groups: BTreeMap<(String, String), Vec<NewTransaction>> = BTreeMap::new();
        for input in inputs {
            groups
                .entry((input.portfolio_id.clone(), input.symbol.clone()))
                .or_default()
                .push(input);
        }

        let mut records: Vec<Transaction> = Vec::new();
        let mut symbols: Vec<(String, String)> = Vec::new();

        for ((portfolio_id, symbol), mut group) in groups {
            // Stable sort by date preserves input order for same-date rows,
            // so a sell never precedes its chronologically-earlier buy.
            group.sort_by_key(|input| input.parse_transacted_at().unwrap_or_default());

            let existing = self.repository.list_transactions(&portfolio_id, &symbol)?;
            let mut aggregate = replay(&existing)?;
            let mut max_cycle = existing.iter().map(|t| t.cycle).max().unwrap_or(0);

            for input in &group {
                let kind = input.parsed_kind()?;
                if kind == TransactionKind::Sell {
                    let requested = input.shares.unwrap_or(Decimal::ZERO);
                    if requested > aggregate.shares {
                        return Err(Error::State(StateError::InsufficientShares {
                            symbol: symbol.clone(),
                            requested,
                            held: aggregate.shares,
                        }));
                    }
                }

                let cycle = assign_cycle(kind, &symbol, aggregate.shares, max_cycle)?;
                max_cycle = max_cycle.max(cycle);

                let record = self.build_record(input, aggregate.shares, cycle)?;
                apply_transaction(&mut aggregate, &record)?;
                records.push(record);
            }
            symbols.push((portfolio_id, symbol));
        }

        // Nothing was persisted before this point; a failure above rejects
        // the import wholesale.
        let imported = self.repository.create_transactions(records).await?;

        let mut recomputed_symbols = Vec::with_capacity(symbols.len());
        for (portfolio_id, symbol) in symbols {
            self.trigger_recompute("import", &portfolio_id, &symbol)
                .await;
            recomputed_symbols.push(symbol);
        }

        Ok(ImportSummary {
            imported,
            recomputed_symbols,
        })
    }
}
