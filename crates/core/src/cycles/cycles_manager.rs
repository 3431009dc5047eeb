use crate::constants::is_quantity_significant;
use crate::cycles::PositionCycle;
use crate::errors::StateError;
use crate::transactions::{Transaction, TransactionKind};

use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Assigns the cycle id for a new transaction given the current held shares
/// and the highest cycle id already allocated for the symbol.
///
/// - BUY with zero held shares opens the next cycle (`max_cycle + 1`).
/// - BUY with held shares reuses the latest cycle.
/// - SELL must reuse the latest cycle; selling with no open cycle is a
///   state violation, never auto-corrected.
/// - MERGE/SPLIT/DIVIDEND always reuse the latest cycle and never open one.
pub fn assign_cycle(
    kind: TransactionKind,
    symbol: &str,
    held_shares: Decimal,
    max_cycle: i32,
) -> std::result::Result<i32, StateError> {
    let position_open = is_quantity_significant(&held_shares) && held_shares > Decimal::ZERO;

    match kind {
        TransactionKind::Buy => {
            if position_open {
                Ok(max_cycle.max(1))
            } else {
                Ok(max_cycle + 1)
            }
        }
        TransactionKind::Sell => {
            if position_open && max_cycle >= 1 {
                Ok(max_cycle)
            } else {
                Err(StateError::NoOpenCycle {
                    symbol: symbol.to_string(),
                })
            }
        }
        TransactionKind::Merge | TransactionKind::Split | TransactionKind::Dividend => {
            if max_cycle >= 1 {
                Ok(max_cycle)
            } else {
                Err(StateError::NoOpenCycle {
                    symbol: symbol.to_string(),
                })
            }
        }
    }
}

/// Verifies that a symbol's cycle ids form the contiguous sequence 1..N.
///
/// A gap means corrupted or partially-replayed history (e.g. the opening
/// buy of a cycle was deleted) and must fail loudly rather than be papered
/// over by a recompute.
pub fn verify_cycle_contiguity(
    symbol: &str,
    transactions: &[Transaction],
) -> std::result::Result<(), StateError> {
    let cycles: BTreeSet<i32> = transactions.iter().map(|t| t.cycle).collect();

    let mut expected = 1;
    for found in cycles {
        if found != expected {
            return Err(StateError::CycleGap {
                symbol: symbol.to_string(),
                expected,
                found,
            });
        }
        expected += 1;
    }
    Ok(())
}

/// Derives the open/close intervals of every cycle in a symbol's ordered
/// history, for display.
pub fn derive_cycles(transactions: &[Transaction]) -> Vec<PositionCycle> {
    let mut cycles: Vec<PositionCycle> = Vec::new();
    let mut shares = Decimal::ZERO;

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Buy => {
                if !is_quantity_significant(&shares) {
                    cycles.push(PositionCycle {
                        cycle: transaction.cycle,
                        opened_at: transaction.transacted_at,
                        closed_at: None,
                    });
                }
                shares += transaction.shares;
            }
            TransactionKind::Sell => {
                shares -= transaction.shares;
                if !is_quantity_significant(&shares) {
                    shares = Decimal::ZERO;
                    if let Some(current) = cycles.last_mut() {
                        current.closed_at = Some(transaction.transacted_at);
                    }
                }
            }
            TransactionKind::Merge => {
                if let Some(ratio) = transaction.ratio.filter(|r| *r > Decimal::ZERO) {
                    shares /= ratio;
                }
            }
            TransactionKind::Split => {
                if let Some(ratio) = transaction.ratio.filter(|r| *r > Decimal::ZERO) {
                    shares *= ratio;
                }
            }
            TransactionKind::Dividend => {
                let per10_stock =
                    transaction.per10_bonus_value() + transaction.per10_transfer_value();
                shares += per10_stock / Decimal::TEN * shares;
            }
        }
    }

    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn transaction(kind: TransactionKind, cycle: i32, shares: Decimal, day: u32) -> Transaction {
        let transacted_at = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
        Transaction {
            id: format!("t{}", day),
            portfolio_id: "p1".to_string(),
            symbol: "600036".to_string(),
            kind,
            transacted_at,
            shares,
            price: dec!(10),
            amount: shares * dec!(10),
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

    #[test]
    fn test_buy_from_zero_opens_next_cycle() {
        assert_eq!(
            assign_cycle(TransactionKind::Buy, "600036", Decimal::ZERO, 0).unwrap(),
            1
        );
        assert_eq!(
            assign_cycle(TransactionKind::Buy, "600036", Decimal::ZERO, 3).unwrap(),
            4
        );
    }

    #[test]
    fn test_buy_into_open_position_reuses_cycle() {
        assert_eq!(
            assign_cycle(TransactionKind::Buy, "600036", dec!(100), 2).unwrap(),
            2
        );
    }

    #[test]
    fn test_sell_with_no_open_cycle_is_state_error() {
        assert!(matches!(
            assign_cycle(TransactionKind::Sell, "600036", Decimal::ZERO, 1),
            Err(StateError::NoOpenCycle { .. })
        ));
        assert!(matches!(
            assign_cycle(TransactionKind::Sell, "600036", dec!(100), 0),
            Err(StateError::NoOpenCycle { .. })
        ));
    }

    #[test]
    fn test_corporate_actions_reuse_latest_cycle() {
        for kind in [
            TransactionKind::Merge,
            TransactionKind::Split,
            TransactionKind::Dividend,
        ] {
            assert_eq!(assign_cycle(kind, "600036", dec!(100), 2).unwrap(), 2);
            assert!(matches!(
                assign_cycle(kind, "600036", Decimal::ZERO, 0),
                Err(StateError::NoOpenCycle { .. })
            ));
        }
    }

    #[test]
    fn test_contiguity_accepts_1_to_n() {
        let history = vec![
            transaction(TransactionKind::Buy, 1, dec!(100), 1),
            transaction(TransactionKind::Sell, 1, dec!(100), 2),
            transaction(TransactionKind::Buy, 2, dec!(50), 3),
        ];
        assert!(verify_cycle_contiguity("600036", &history).is_ok());
    }

    #[test]
    fn test_contiguity_rejects_gap() {
        let history = vec![
            transaction(TransactionKind::Buy, 1, dec!(100), 1),
            transaction(TransactionKind::Buy, 3, dec!(50), 2),
        ];
        let err = verify_cycle_contiguity("600036", &history).unwrap_err();
        assert!(matches!(
            err,
            StateError::CycleGap {
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_contiguity_accepts_empty_history() {
        assert!(verify_cycle_contiguity("600036", &[]).is_ok());
    }

    #[test]
    fn test_derive_cycles_liquidate_and_reopen() {
        let history = vec![
            transaction(TransactionKind::Buy, 1, dec!(100), 1),
            transaction(TransactionKind::Sell, 1, dec!(100), 2),
            transaction(TransactionKind::Buy, 2, dec!(50), 3),
        ];
        let cycles = derive_cycles(&history);
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].cycle, 1);
        assert!(!cycles[0].is_open());
        assert_eq!(cycles[1].cycle, 2);
        assert!(cycles[1].is_open());
    }
}
