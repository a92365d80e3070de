use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    CurrencyMetadata, Money, ResultEngine, Wallet, WalletMembership, WalletRole, normalize_code,
    transactions,
    util::{normalize_required_name, parse_uuid},
    wallet_memberships, wallets,
};

use super::{Engine, with_tx};

/// A wallet as seen by one of its members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletDetail {
    pub wallet: Wallet,
    pub currency: CurrencyMetadata,
    /// Role of the user who asked.
    pub role: WalletRole,
    pub balance: Money,
}

impl Engine {
    /// Creates a wallet with zero balance and makes `creator_id` its admin.
    ///
    /// Both rows are written in the same DB transaction.
    pub async fn create_wallet(
        &self,
        name: &str,
        currency: &str,
        creator_id: Uuid,
    ) -> ResultEngine<Wallet> {
        let name = normalize_required_name(name, "wallet")?;
        let code = normalize_code(currency)?;
        let now = Utc::now();

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, creator_id).await?;
            self.require_currency(&db_tx, &code).await?;

            let wallet = Wallet::new(name, code, now);
            let wallet_model: wallets::ActiveModel = (&wallet).into();
            wallet_model.insert(&db_tx).await?;

            let membership = WalletMembership {
                wallet_id: wallet.id,
                user_id: creator_id,
                role: WalletRole::Admin,
                created_at: now,
            };
            let membership_model: wallet_memberships::ActiveModel = (&membership).into();
            membership_model.insert(&db_tx).await?;

            tracing::info!(wallet = %wallet.id, currency = %wallet.currency, "wallet created");
            Ok(wallet)
        })
    }

    /// Return a wallet with its current balance. Any member can read it.
    pub async fn wallet(&self, wallet_id: Uuid, user_id: Uuid) -> ResultEngine<WalletDetail> {
        with_tx!(self, |db_tx| {
            let role = self.require_member(&db_tx, wallet_id, user_id).await?;
            let wallet = Wallet::try_from(self.require_wallet(&db_tx, wallet_id).await?)?;
            let currency = self.require_currency(&db_tx, &wallet.currency).await?;
            let balance = self.balance_of(&db_tx, &wallet).await?;
            Ok(WalletDetail {
                balance: Money::new(balance, currency.decimal_places),
                wallet,
                currency,
                role,
            })
        })
    }

    /// Deletes a wallet with its memberships and transaction log (admin only).
    pub async fn delete_wallet(&self, wallet_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.lock_wallet(&db_tx, wallet_id).await?;
            self.require_wallet_role(&db_tx, wallet_id, user_id, WalletRole::Admin)
                .await?;

            let id = wallet_id.to_string();
            transactions::Entity::delete_many()
                .filter(transactions::Column::WalletId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            wallet_memberships::Entity::delete_many()
                .filter(wallet_memberships::Column::WalletId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            wallets::Entity::delete_by_id(id).exec(&db_tx).await?;

            tracing::info!(wallet = %wallet_id, "wallet deleted");
            Ok(())
        })
    }

    /// Ids of every wallet, oldest first. Used by maintenance jobs.
    pub async fn wallet_ids(&self) -> ResultEngine<Vec<Uuid>> {
        let models = wallets::Entity::find()
            .order_by_asc(wallets::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models
            .iter()
            .map(|model| parse_uuid(&model.id, "wallet"))
            .collect()
    }
}
