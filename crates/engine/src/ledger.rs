//! Balance arithmetic over the transaction log.
//!
//! A wallet row holds a checkpoint (`balance` at `last_snapshot`). The current
//! balance is that checkpoint plus the signed sum of every transaction
//! created after it. These functions are the pure half of that rule; the
//! engine operations in `ops::ledger` feed them rows read under the wallet
//! lock.

use chrono::{DateTime, Utc};

use crate::{EngineError, ResultEngine, Transaction, Wallet};

/// Signed sum of a transaction tail.
pub fn signed_sum<'a, I>(transactions: I) -> ResultEngine<i64>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .try_fold(0i64, |acc, tx| acc.checked_add(tx.signed_amount()))
        .ok_or_else(|| EngineError::InvalidAmount("balance overflow".to_string()))
}

/// Checkpoint balance plus every transaction strictly after `last_snapshot`.
///
/// Rows at or before the checkpoint are already folded into `balance` and are
/// ignored even if the caller passes them.
pub fn current_balance(wallet: &Wallet, transactions: &[Transaction]) -> ResultEngine<i64> {
    let tail = signed_sum(
        transactions
            .iter()
            .filter(|tx| tx.created_at > wallet.last_snapshot),
    )?;
    wallet
        .balance
        .checked_add(tail)
        .ok_or_else(|| EngineError::InvalidAmount("balance overflow".to_string()))
}

/// An expense equal to the balance is allowed and leaves the wallet at zero.
#[must_use]
pub fn can_afford(balance: i64, expense_minor: i64) -> bool {
    expense_minor <= balance
}

/// Timestamp for a transaction about to be appended.
///
/// It must land strictly after the wallet's checkpoint, otherwise the next
/// balance read would treat it as already folded in.
#[must_use]
pub fn next_created_at(last_snapshot: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let floor = last_snapshot + chrono::Duration::microseconds(1);
    now.max(floor)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn wallet(balance: i64, last_snapshot: DateTime<Utc>) -> Wallet {
        Wallet {
            balance,
            last_snapshot,
            ..Wallet::new("Trip".to_string(), "EUR".to_string(), at(0))
        }
    }

    fn tx(wallet: &Wallet, amount: i64, is_deposit: bool, created_at: DateTime<Utc>) -> Transaction {
        Transaction::new(
            wallet.id,
            amount,
            is_deposit,
            "test".to_string(),
            Uuid::new_v4(),
            created_at,
        )
        .unwrap()
    }

    #[test]
    fn tail_is_added_to_checkpoint() {
        let w = wallet(500, at(10));
        let txs = vec![tx(&w, 100, true, at(11)), tx(&w, 30, false, at(12))];
        assert_eq!(current_balance(&w, &txs).unwrap(), 570);
    }

    #[test]
    fn rows_at_or_before_checkpoint_are_not_counted_twice() {
        let w = wallet(500, at(10));
        let txs = vec![
            tx(&w, 999, true, at(5)),
            tx(&w, 999, true, at(10)),
            tx(&w, 1, true, at(11)),
        ];
        assert_eq!(current_balance(&w, &txs).unwrap(), 501);
    }

    #[test]
    fn affordability_boundary() {
        assert!(can_afford(70, 70));
        assert!(!can_afford(70, 71));
        assert!(can_afford(70, 0));
        assert!(!can_afford(-5, 1));
    }

    #[test]
    fn overflow_is_reported() {
        let w = wallet(i64::MAX, at(0));
        let txs = vec![tx(&w, 1, true, at(1))];
        assert!(matches!(
            current_balance(&w, &txs),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn new_rows_land_after_checkpoint() {
        let snapshot = at(10);
        assert!(next_created_at(snapshot, at(5)) > snapshot);
        assert!(next_created_at(snapshot, snapshot) > snapshot);
        assert_eq!(next_created_at(snapshot, at(20)), at(20));
    }
}
