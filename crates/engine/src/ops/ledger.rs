use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Transaction, Wallet, WalletRole, ledger, transactions,
    util::normalize_category, wallets,
};

use super::{Engine, with_tx};

/// Input of [`Engine::record_transaction`].
#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub wallet_id: Uuid,
    /// Must hold the admin role on the wallet.
    pub creator_id: Uuid,
    /// Positive magnitude in the wallet currency's minor units.
    pub amount_minor: i64,
    pub is_deposit: bool,
    pub category: String,
}

/// Outcome of one [`Engine::compact_snapshot`] run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotReport {
    pub wallet_id: Uuid,
    /// Number of transactions folded into the checkpoint.
    pub folded: usize,
    /// Signed sum of the folded transactions.
    pub delta_minor: i64,
    pub balance_minor: i64,
    pub last_snapshot: DateTime<Utc>,
}

impl Engine {
    /// Takes the write lock for one wallet and returns its current row.
    ///
    /// The no-op `UPDATE` must be the first statement of the transaction. On
    /// SQLite it takes the database write lock before anything is read, on
    /// row-locking backends it locks the wallet row. A concurrent
    /// read-balance-then-insert on the same wallet waits until this
    /// transaction ends.
    pub(super) async fn lock_wallet(
        &self,
        db: &DatabaseTransaction,
        wallet_id: Uuid,
    ) -> ResultEngine<wallets::Model> {
        let touched = wallets::Entity::update_many()
            .col_expr(
                wallets::Column::Balance,
                Expr::col(wallets::Column::Balance).into(),
            )
            .filter(wallets::Column::Id.eq(wallet_id.to_string()))
            .exec(db)
            .await?;
        if touched.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("wallet not exists".to_string()));
        }
        self.require_wallet(db, wallet_id).await
    }

    /// Transactions recorded after the wallet checkpoint.
    async fn transaction_tail(
        &self,
        db: &DatabaseTransaction,
        wallet: &Wallet,
        until: Option<DateTime<Utc>>,
    ) -> ResultEngine<Vec<Transaction>> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::WalletId.eq(wallet.id.to_string()))
            .filter(transactions::Column::CreatedAt.gt(wallet.last_snapshot));
        if let Some(until) = until {
            query = query.filter(transactions::Column::CreatedAt.lte(until));
        }
        query
            .all(db)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    pub(super) async fn balance_of(
        &self,
        db: &DatabaseTransaction,
        wallet: &Wallet,
    ) -> ResultEngine<i64> {
        let tail = self.transaction_tail(db, wallet, None).await?;
        ledger::current_balance(wallet, &tail)
    }

    /// Current balance of a wallet in minor units: checkpoint plus every
    /// transaction recorded after it.
    pub async fn current_balance(&self, wallet_id: Uuid) -> ResultEngine<i64> {
        with_tx!(self, |db_tx| {
            let wallet = Wallet::try_from(self.require_wallet(&db_tx, wallet_id).await?)?;
            self.balance_of(&db_tx, &wallet).await
        })
    }

    /// `true` when the wallet can pay `expense_minor` right now.
    ///
    /// Advisory only: [`Engine::record_transaction`] repeats the check under
    /// the wallet lock.
    pub async fn can_afford(&self, wallet_id: Uuid, expense_minor: i64) -> ResultEngine<bool> {
        let balance = self.current_balance(wallet_id).await?;
        Ok(ledger::can_afford(balance, expense_minor))
    }

    /// Appends a deposit or an expense to the wallet log.
    ///
    /// The wallet is locked first, then the creator must be an admin, then an
    /// expense must fit in the current balance. The row lands strictly after
    /// the wallet checkpoint.
    pub async fn record_transaction(&self, input: NewTransaction) -> ResultEngine<Transaction> {
        if input.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        let category = normalize_category(&input.category);

        with_tx!(self, |db_tx| {
            let wallet = Wallet::try_from(self.lock_wallet(&db_tx, input.wallet_id).await?)?;
            self.require_wallet_role(&db_tx, wallet.id, input.creator_id, WalletRole::Admin)
                .await?;

            let created_at = ledger::next_created_at(wallet.last_snapshot, Utc::now());
            let tx = Transaction::new(
                wallet.id,
                input.amount_minor,
                input.is_deposit,
                category,
                input.creator_id,
                created_at,
            )?;

            let balance = self.balance_of(&db_tx, &wallet).await?;
            if !tx.is_deposit && !ledger::can_afford(balance, tx.amount_minor) {
                return Err(EngineError::InsufficientFunds(format!(
                    "balance {balance} is lower than {}",
                    tx.amount_minor
                )));
            }
            balance
                .checked_add(tx.signed_amount())
                .ok_or_else(|| EngineError::InvalidAmount("balance overflow".to_string()))?;

            let model: transactions::ActiveModel = (&tx).into();
            model.insert(&db_tx).await?;
            tracing::debug!(
                wallet = %wallet.id,
                amount_minor = tx.amount_minor,
                is_deposit = tx.is_deposit,
                "transaction recorded"
            );
            Ok(tx)
        })
    }

    /// Full transaction history of a wallet, newest first. Any member can read it.
    pub async fn list_transactions(
        &self,
        wallet_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, wallet_id, user_id).await?;
            transactions::Entity::find()
                .filter(transactions::Column::WalletId.eq(wallet_id.to_string()))
                .order_by_desc(transactions::Column::CreatedAt)
                .order_by_desc(transactions::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Transaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Folds the transaction tail into the wallet checkpoint.
    ///
    /// A single boundary is taken when the call starts: transactions created
    /// at or before it are summed into `balance` and `last_snapshot` moves to
    /// the boundary, all under the wallet lock. Rows recorded later stay in the
    /// tail, so the current balance is the same before and after the run.
    pub async fn compact_snapshot(&self, wallet_id: Uuid) -> ResultEngine<SnapshotReport> {
        let started_at = Utc::now();
        with_tx!(self, |db_tx| {
            let model = self.lock_wallet(&db_tx, wallet_id).await?;
            let wallet = Wallet::try_from(model.clone())?;
            let boundary = started_at.max(wallet.last_snapshot);

            let folded = self.transaction_tail(&db_tx, &wallet, Some(boundary)).await?;
            let delta_minor = ledger::signed_sum(&folded)?;
            let balance_minor = wallet
                .balance
                .checked_add(delta_minor)
                .ok_or_else(|| EngineError::InvalidAmount("balance overflow".to_string()))?;

            let update = wallets::ActiveModel {
                id: ActiveValue::Unchanged(model.id),
                balance: ActiveValue::Set(balance_minor),
                last_snapshot: ActiveValue::Set(boundary),
                ..Default::default()
            };
            update.update(&db_tx).await?;

            tracing::info!(
                wallet = %wallet.id,
                folded = folded.len(),
                delta_minor,
                balance_minor,
                "snapshot compacted"
            );
            Ok(SnapshotReport {
                wallet_id: wallet.id,
                folded: folded.len(),
                delta_minor,
                balance_minor,
                last_snapshot: boundary,
            })
        })
    }
}
