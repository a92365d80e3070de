use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    CurrencyMetadata, EngineError, ResultEngine, WalletRole, currency, users, wallet_memberships,
    wallets,
};

use super::{Engine, with_tx};

impl Engine {
    pub(super) async fn require_wallet(
        &self,
        db: &DatabaseTransaction,
        wallet_id: Uuid,
    ) -> ResultEngine<wallets::Model> {
        wallets::Entity::find_by_id(wallet_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("wallet not exists".to_string()))
    }

    /// A user that exists and is not soft-deleted.
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .filter(users::Column::IsDeleted.eq(false))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    pub(super) async fn find_user_by_username(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .filter(users::Column::IsDeleted.eq(false))
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn require_currency(
        &self,
        db: &DatabaseTransaction,
        code: &str,
    ) -> ResultEngine<CurrencyMetadata> {
        let model = currency::Entity::find_by_id(code.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::InvalidInput(format!("unsupported currency: {code}")))?;
        CurrencyMetadata::try_from(model)
    }

    pub(super) async fn wallet_role(
        &self,
        db: &DatabaseTransaction,
        wallet_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Option<WalletRole>> {
        let row = wallet_memberships::Entity::find_by_id((wallet_id.to_string(), user_id.to_string()))
            .one(db)
            .await?;
        row.as_ref()
            .map(|m| WalletRole::try_from(m.role.as_str()))
            .transpose()
    }

    /// Any role is enough. A non-member cannot tell a foreign wallet from a
    /// missing one.
    pub(super) async fn require_member(
        &self,
        db: &DatabaseTransaction,
        wallet_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<WalletRole> {
        self.wallet_role(db, wallet_id, user_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("wallet not exists".to_string()))
    }

    /// Exact match: holding a different role is `Forbidden`, whatever it is.
    pub(super) async fn require_wallet_role(
        &self,
        db: &DatabaseTransaction,
        wallet_id: Uuid,
        user_id: Uuid,
        required: WalletRole,
    ) -> ResultEngine<()> {
        let role = self.require_member(db, wallet_id, user_id).await?;
        if role != required {
            return Err(EngineError::Forbidden(format!(
                "{required} role required, user has {role}"
            )));
        }
        Ok(())
    }

    /// Checks that `user_id` holds exactly `required` on `wallet_id`.
    ///
    /// Fails with `KeyNotFound` when the user is not a member at all and with
    /// `Forbidden` when the user holds another role.
    pub async fn require_role(
        &self,
        user_id: Uuid,
        wallet_id: Uuid,
        required: WalletRole,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_wallet_role(&db_tx, wallet_id, user_id, required)
                .await
        })
    }
}
