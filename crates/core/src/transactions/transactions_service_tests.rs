use crate::cycles::PositionCycle;
use crate::errors::{Error, Result, StateError, ValidationError};
use crate::fees::{FeeConfig, SymbolClassifier};
use crate::holdings::{Holding, HoldingDetail, HoldingServiceTrait};
use crate::quotes::Quote;
use crate::transactions::transactions_model::*;
use crate::transactions::transactions_service::TransactionService;
use crate::transactions::transactions_traits::{
    TransactionRepositoryTrait, TransactionServiceTrait,
};
use crate::utils::cache::MemoryCache;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};

// --- Mock TransactionRepository ---

#[derive(Default)]
struct MockTransactionRepository {
    transactions: Mutex<Vec<Transaction>>,
}

impl MockTransactionRepository {
    fn with_transactions(transactions: Vec<Transaction>) -> Arc<Self> {
        Arc::new(Self {
            transactions: Mutex::new(transactions),
        })
    }
}

#[async_trait]
impl TransactionRepositoryTrait for MockTransactionRepository {
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        self.transactions
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == transaction_id)
            .cloned()
            .ok_or_else(|| Error::Repository(format!("Transaction not found: {}", transaction_id)))
    }

    fn list_transactions(&self, portfolio_id: &str, symbol: &str) -> Result<Vec<Transaction>> {
        let mut matching: Vec<Transaction> = self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.portfolio_id == portfolio_id && t.symbol == symbol)
            .cloned()
            .collect();
        matching.sort_by_key(|t| t.transacted_at);
        Ok(matching)
    }

    fn list_portfolio_transactions(&self, portfolio_id: &str) -> Result<Vec<Transaction>> {
        Ok(self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.portfolio_id == portfolio_id)
            .cloned()
            .collect())
    }

    fn list_symbols_with_history(&self, portfolio_id: &str) -> Result<Vec<String>> {
        let mut symbols: Vec<String> = self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.portfolio_id == portfolio_id)
            .map(|t| t.symbol.clone())
            .collect();
        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }

    async fn create_transaction(&self, transaction: Transaction) -> Result<Transaction> {
        self.transactions.lock().unwrap().push(transaction.clone());
        Ok(transaction)
    }

    async fn create_transactions(&self, transactions: Vec<Transaction>) -> Result<usize> {
        let count = transactions.len();
        self.transactions.lock().unwrap().extend(transactions);
        Ok(count)
    }

    async fn update_transaction(&self, transaction: Transaction) -> Result<Transaction> {
        let mut guard = self.transactions.lock().unwrap();
        let slot = guard
            .iter_mut()
            .find(|t| t.id == transaction.id)
            .ok_or_else(|| Error::Repository(format!("Transaction not found: {}", transaction.id)))?;
        *slot = transaction.clone();
        Ok(transaction)
    }

    async fn delete_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        let mut guard = self.transactions.lock().unwrap();
        let index = guard
            .iter()
            .position(|t| t.id == transaction_id)
            .ok_or_else(|| Error::Repository(format!("Transaction not found: {}", transaction_id)))?;
        Ok(guard.remove(index))
    }
}

// --- Mock HoldingService ---

#[derive(Default)]
struct MockHoldingService {
    recompute_calls: Mutex<Vec<String>>,
    fail_recompute: bool,
    holding: Option<Holding>,
}

#[async_trait]
impl HoldingServiceTrait for MockHoldingService {
    fn get_holding(&self, _portfolio_id: &str, _symbol: &str) -> Result<Option<Holding>> {
        Ok(self.holding.clone())
    }

    fn list_holdings(&self, _portfolio_id: &str) -> Result<Vec<Holding>> {
        Ok(Vec::new())
    }

    async fn recompute_holding(
        &self,
        portfolio_id: &str,
        symbol: &str,
    ) -> Result<Option<Holding>> {
        if self.fail_recompute {
            return Err(Error::Repository("Recompute unavailable".to_string()));
        }
        self.recompute_calls
            .lock()
            .unwrap()
            .push(format!("{}:{}", portfolio_id, symbol));
        Ok(None)
    }

    async fn recompute_portfolio(&self, _portfolio_id: &str) -> Result<Vec<Holding>> {
        unimplemented!("Not needed for tests")
    }

    async fn compute_holding_detail(
        &self,
        _portfolio_id: &str,
        _symbol: &str,
        _quote: &Quote,
    ) -> Result<Option<HoldingDetail>> {
        unimplemented!("Not needed for tests")
    }

    fn list_cycles(&self, _portfolio_id: &str, _symbol: &str) -> Result<Vec<PositionCycle>> {
        unimplemented!("Not needed for tests")
    }
}

// --- Fixtures ---

fn persisted_buy(shares: Decimal, price: Decimal, cycle: i32, day: u32) -> Transaction {
    let transacted_at = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
    Transaction {
        id: format!("t{}", day),
        portfolio_id: "p1".to_string(),
        symbol: "600036".to_string(),
        kind: TransactionKind::Buy,
        transacted_at,
        shares,
        price,
        amount: shares * price,
        commission: Decimal::ZERO,
        tax: Decimal::ZERO,
        transfer_fee: Decimal::ZERO,
        ratio: None,
        per10_dividend: None,
        per10_bonus: None,
        per10_transfer: None,
        cycle,
        comment: None,
        created_at: transacted_at,
        updated_at: transacted_at,
    }
}

fn input(kind: &str, symbol: &str, date: &str) -> NewTransaction {
    NewTransaction {
        id: None,
        portfolio_id: "p1".to_string(),
        symbol: symbol.to_string(),
        kind: kind.to_string(),
        transacted_at: date.to_string(),
        shares: None,
        price: None,
        commission: None,
        tax: None,
        transfer_fee: None,
        ratio: None,
        per10_dividend: None,
        per10_bonus: None,
        per10_transfer: None,
        comment: None,
    }
}

fn trade_input(kind: &str, symbol: &str, date: &str, shares: Decimal, price: Decimal) -> NewTransaction {
    let mut t = input(kind, symbol, date);
    t.shares = Some(shares);
    t.price = Some(price);
    t
}

fn service_with(
    transactions: Vec<Transaction>,
    holding_service: Arc<MockHoldingService>,
) -> (TransactionService, Arc<MockTransactionRepository>) {
    let repository = MockTransactionRepository::with_transactions(transactions);
    let service = TransactionService::new(
        repository.clone(),
        holding_service,
        FeeConfig::default(),
        SymbolClassifier::new(Arc::new(MemoryCache::<crate::fees::InstrumentClass>::new())),
    );
    (service, repository)
}

// --- Tests ---

#[tokio::test]
async fn test_create_buy_opens_first_cycle_and_recomputes() {
    let holding_service = Arc::new(MockHoldingService::default());
    let (service, repository) = service_with(vec![], holding_service.clone());

    let created = service
        .create_transaction(trade_input("BUY", "600036", "2024-03-01", dec!(1000), dec!(10)))
        .await
        .unwrap();

    assert_eq!(created.cycle, 1);
    assert_eq!(created.amount, dec!(10000));
    assert_eq!(repository.list_transactions("p1", "600036").unwrap().len(), 1);
    assert_eq!(
        holding_service.recompute_calls.lock().unwrap().as_slice(),
        ["p1:600036"]
    );
}

#[tokio::test]
async fn test_buy_after_liquidation_opens_next_cycle() {
    let holding_service = Arc::new(MockHoldingService::default());
    let (service, _) = service_with(vec![], holding_service);

    service
        .create_transaction(trade_input("BUY", "600036", "2024-03-01", dec!(100), dec!(5)))
        .await
        .unwrap();
    service
        .create_transaction(trade_input("SELL", "600036", "2024-03-02", dec!(100), dec!(6)))
        .await
        .unwrap();
    let reopened = service
        .create_transaction(trade_input("BUY", "600036", "2024-03-03", dec!(50), dec!(7)))
        .await
        .unwrap();

    assert_eq!(reopened.cycle, 2);
}

#[tokio::test]
async fn test_sell_without_open_cycle_is_rejected() {
    let holding_service = Arc::new(MockHoldingService::default());
    let (service, repository) = service_with(vec![], holding_service.clone());

    let err = service
        .create_transaction(input("SELL", "600036", "2024-03-01"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::State(StateError::NoOpenCycle { .. })));
    assert!(repository.list_transactions("p1", "600036").unwrap().is_empty());
    assert!(holding_service.recompute_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_oversell_is_rejected_before_commit() {
    let holding_service = Arc::new(MockHoldingService::default());
    let (service, repository) = service_with(
        vec![persisted_buy(dec!(100), dec!(10), 1, 1)],
        holding_service,
    );

    let err = service
        .create_transaction(trade_input("SELL", "600036", "2024-03-01", dec!(101), dec!(10)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::State(StateError::InsufficientShares { .. })
    ));
    assert_eq!(repository.list_transactions("p1", "600036").unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_kind_is_rejected() {
    let holding_service = Arc::new(MockHoldingService::default());
    let (service, _) = service_with(vec![], holding_service);

    let err = service
        .create_transaction(input("SHORT", "600036", "2024-03-01"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::UnknownKind(_))
    ));
}

#[tokio::test]
async fn test_future_dated_transaction_is_rejected() {
    let holding_service = Arc::new(MockHoldingService::default());
    let (service, _) = service_with(vec![], holding_service);

    let err = service
        .create_transaction(trade_input("BUY", "600036", "2999-01-01", dec!(100), dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::FutureDated(_))
    ));
}

#[tokio::test]
async fn test_recompute_failure_does_not_roll_back_the_write() {
    let holding_service = Arc::new(MockHoldingService {
        fail_recompute: true,
        ..Default::default()
    });
    let (service, repository) = service_with(vec![], holding_service);

    let created = service
        .create_transaction(trade_input("BUY", "600036", "2024-03-01", dec!(1000), dec!(10)))
        .await
        .unwrap();

    assert_eq!(created.amount, dec!(10000));
    assert_eq!(repository.list_transactions("p1", "600036").unwrap().len(), 1);
}

#[tokio::test]
async fn test_dividend_reads_held_shares_from_persisted_holding() {
    let now = Utc::now();
    let holding = Holding {
        id: Holding::holding_id("p1", "600036"),
        portfolio_id: "p1".to_string(),
        symbol: "600036".to_string(),
        shares: dec!(1000),
        hold_cost: dec!(10),
        diluted_cost: dec!(10),
        buy_amount: dec!(10000),
        sell_amount: Decimal::ZERO,
        dividend_amount: Decimal::ZERO,
        buy_commission: Decimal::ZERO,
        sell_commission: Decimal::ZERO,
        buy_tax: Decimal::ZERO,
        sell_tax: Decimal::ZERO,
        other_fee: Decimal::ZERO,
        active: true,
        opened_at: Some(now),
        liquidated_at: None,
        updated_at: now,
    };
    let holding_service = Arc::new(MockHoldingService {
        holding: Some(holding),
        ..Default::default()
    });
    let (service, _) = service_with(
        vec![persisted_buy(dec!(1000), dec!(10), 1, 1)],
        holding_service,
    );

    let mut dividend = input("DIVIDEND", "600036", "2024-03-01");
    dividend.per10_dividend = Some(dec!(2));

    let created = service.create_transaction(dividend).await.unwrap();
    assert_eq!(created.amount, dec!(200));
    assert_eq!(created.cycle, 1);
}

#[tokio::test]
async fn test_dividend_falls_back_to_replayed_shares() {
    let holding_service = Arc::new(MockHoldingService::default());
    let (service, _) = service_with(
        vec![persisted_buy(dec!(500), dec!(10), 1, 1)],
        holding_service,
    );

    let mut dividend = input("DIVIDEND", "600036", "2024-03-01");
    dividend.per10_dividend = Some(dec!(2));

    let created = service.create_transaction(dividend).await.unwrap();
    assert_eq!(created.amount, dec!(100));
}

#[tokio::test]
async fn test_update_preserves_identity_and_cycle() {
    let holding_service = Arc::new(MockHoldingService::default());
    let (service, _) = service_with(
        vec![persisted_buy(dec!(1000), dec!(10), 1, 1)],
        holding_service.clone(),
    );

    let update = TransactionUpdate {
        id: "t1".to_string(),
        fields: trade_input("BUY", "600036", "2024-01-01", dec!(1000), dec!(11)),
    };
    let updated = service.update_transaction(update).await.unwrap();

    assert_eq!(updated.id, "t1");
    assert_eq!(updated.cycle, 1);
    assert_eq!(updated.amount, dec!(11000));
    assert_eq!(
        holding_service.recompute_calls.lock().unwrap().as_slice(),
        ["p1:600036"]
    );
}

#[tokio::test]
async fn test_update_cannot_move_transaction_across_symbols() {
    let holding_service = Arc::new(MockHoldingService::default());
    let (service, _) = service_with(
        vec![persisted_buy(dec!(1000), dec!(10), 1, 1)],
        holding_service,
    );

    let update = TransactionUpdate {
        id: "t1".to_string(),
        fields: trade_input("BUY", "000001", "2024-01-01", dec!(1000), dec!(10)),
    };
    assert!(service.update_transaction(update).await.is_err());
}

#[tokio::test]
async fn test_delete_that_would_break_replay_is_rejected() {
    let holding_service = Arc::new(MockHoldingService::default());
    let (service, repository) = service_with(
        vec![
            persisted_buy(dec!(100), dec!(10), 1, 1),
            {
                let mut t = persisted_buy(dec!(100), dec!(10), 1, 2);
                t.kind = TransactionKind::Sell;
                t
            },
        ],
        holding_service,
    );

    // Removing the buy leaves a sell with nothing to sell.
    let err = service.delete_transaction("t1".to_string()).await.unwrap_err();
    assert!(matches!(err, Error::State(_)));
    assert_eq!(repository.list_transactions("p1", "600036").unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_last_transaction_triggers_recompute() {
    let holding_service = Arc::new(MockHoldingService::default());
    let (service, repository) = service_with(
        vec![persisted_buy(dec!(100), dec!(10), 1, 1)],
        holding_service.clone(),
    );

    let deleted = service.delete_transaction("t1".to_string()).await.unwrap();
    assert_eq!(deleted.id, "t1");
    assert!(repository.list_transactions("p1", "600036").unwrap().is_empty());
    assert_eq!(
        holding_service.recompute_calls.lock().unwrap().as_slice(),
        ["p1:600036"]
    );
}

#[tokio::test]
async fn test_import_sorts_by_date_and_recomputes_once_per_symbol() {
    let holding_service = Arc::new(MockHoldingService::default());
    let (service, repository) = service_with(vec![], holding_service.clone());

    // Input order puts the sell first; its buy carries an earlier date.
    let summary = service
        .import_transactions(vec![
            trade_input("SELL", "600036", "2024-03-02", dec!(500), dec!(12)),
            trade_input("BUY", "600036", "2024-03-01", dec!(1000), dec!(10)),
            trade_input("BUY", "000001", "2024-03-01", dec!(200), dec!(8)),
        ])
        .await
        .unwrap();

    assert_eq!(summary.imported, 3);
    assert_eq!(summary.recomputed_symbols.len(), 2);

    let recomputes = holding_service.recompute_calls.lock().unwrap();
    assert_eq!(recomputes.len(), 2);
    assert!(recomputes.contains(&"p1:600036".to_string()));
    assert!(recomputes.contains(&"p1:000001".to_string()));

    let history = repository.list_transactions("p1", "600036").unwrap();
    assert_eq!(history[0].kind, TransactionKind::Buy);
    assert_eq!(history[1].kind, TransactionKind::Sell);
    assert_eq!(history[1].cycle, 1);
}

#[tokio::test]
async fn test_import_rejects_wholesale_on_invalid_group() {
    let holding_service = Arc::new(MockHoldingService::default());
    let (service, repository) = service_with(vec![], holding_service.clone());

    let err = service
        .import_transactions(vec![
            trade_input("BUY", "600036", "2024-03-01", dec!(100), dec!(10)),
            trade_input("SELL", "600036", "2024-03-02", dec!(200), dec!(12)),
        ])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::State(StateError::InsufficientShares { .. })
    ));
    assert!(repository.list_transactions("p1", "600036").unwrap().is_empty());
    assert!(holding_service.recompute_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_preview_fees_for_prospective_sell() {
    let holding_service = Arc::new(MockHoldingService::default());
    let (service, _) = service_with(vec![], holding_service);

    let fees = service
        .preview_fees("600036", "SELL", dec!(1000), dec!(10))
        .unwrap();
    assert_eq!(fees.commission, dec!(5));
    assert_eq!(fees.tax, dec!(5));
    assert_eq!(fees.transfer_fee, dec!(0.1));
}
