use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, SqlErr, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Money, ResultEngine, User, Wallet, WalletRole, convert_minor, normalize_code,
    users, util::normalize_required_name, wallet_memberships, wallets,
};

use super::{Engine, with_tx};

/// Input of [`Engine::create_user`]. The password is hashed by the caller.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub base_currency: String,
}

/// One entry of a user's wallet list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserWallet {
    pub wallet: Wallet,
    pub role: WalletRole,
    /// Current balance in the wallet currency.
    pub balance: Money,
    /// Current balance in the user's base currency, `None` while no exchange
    /// rate is stored for the pair.
    pub converted: Option<Money>,
}

impl Engine {
    /// Registers a user. Usernames are unique among non-deleted users.
    pub async fn create_user(&self, input: NewUser) -> ResultEngine<User> {
        let username = normalize_required_name(&input.username, "user")?;
        let base_currency = normalize_code(&input.base_currency)?;
        if input.password_hash.is_empty() {
            return Err(EngineError::InvalidInput(
                "password hash must not be empty".to_string(),
            ));
        }

        self.currency(&base_currency).await?;

        // The insert is the first statement: it takes the write lock, and the
        // partial unique index on active usernames settles concurrent sign-ups.
        with_tx!(self, |db_tx| {
            let user = User {
                id: Uuid::new_v4(),
                username,
                password_hash: input.password_hash,
                base_currency,
                created_at: Utc::now(),
            };
            users::ActiveModel {
                id: ActiveValue::Set(user.id.to_string()),
                username: ActiveValue::Set(user.username.clone()),
                password_hash: ActiveValue::Set(user.password_hash.clone()),
                base_currency: ActiveValue::Set(user.base_currency.clone()),
                created_at: ActiveValue::Set(user.created_at),
                is_deleted: ActiveValue::Set(false),
                deleted_at: ActiveValue::Set(None),
            }
            .insert(&db_tx)
            .await
            .map_err(|err| match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    EngineError::ExistingKey(user.username.clone())
                }
                _ => err.into(),
            })?;

            tracing::info!(user = %user.id, "user created");
            Ok(user)
        })
    }

    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            User::try_from(self.require_user(&db_tx, user_id).await?)
        })
    }

    pub async fn user_by_username(&self, username: &str) -> ResultEngine<User> {
        let username = username.trim();
        with_tx!(self, |db_tx| {
            let model = self
                .find_user_by_username(&db_tx, username)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            User::try_from(model)
        })
    }

    /// Soft-deletes a user and drops all of their wallet memberships.
    pub async fn delete_user(&self, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;

            let revoked = wallet_memberships::Entity::delete_many()
                .filter(wallet_memberships::Column::UserId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;

            let mut active: users::ActiveModel = model.into();
            active.is_deleted = ActiveValue::Set(true);
            active.deleted_at = ActiveValue::Set(Some(Utc::now()));
            active.update(&db_tx).await?;

            tracing::info!(
                user = %user_id,
                memberships = revoked.rows_affected,
                "user deleted"
            );
            Ok(())
        })
    }

    /// Every wallet the user belongs to, with balances in the wallet currency
    /// and in the user's base currency.
    pub async fn user_wallets(&self, user_id: Uuid) -> ResultEngine<Vec<UserWallet>> {
        with_tx!(self, |db_tx| {
            let user = User::try_from(self.require_user(&db_tx, user_id).await?)?;
            let base = self.require_currency(&db_tx, &user.base_currency).await?;

            let rows = wallet_memberships::Entity::find()
                .filter(wallet_memberships::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(wallet_memberships::Column::CreatedAt)
                .find_also_related(wallets::Entity)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(rows.len());
            for (membership, wallet) in rows {
                let Some(wallet) = wallet else {
                    continue;
                };
                let wallet = Wallet::try_from(wallet)?;
                let currency = self.require_currency(&db_tx, &wallet.currency).await?;
                let balance = self.balance_of(&db_tx, &wallet).await?;

                let converted = if currency.code == base.code {
                    Some(Money::new(balance, base.decimal_places))
                } else {
                    match self.stored_rate(&db_tx, &currency.code, &base.code).await? {
                        Some(rate) => Some(Money::new(
                            convert_minor(
                                balance,
                                currency.decimal_places,
                                base.decimal_places,
                                rate,
                            )?,
                            base.decimal_places,
                        )),
                        None => {
                            tracing::warn!(
                                from = %currency.code,
                                to = %base.code,
                                "no exchange rate stored, balance left unconverted"
                            );
                            None
                        }
                    }
                };

                out.push(UserWallet {
                    role: WalletRole::try_from(membership.role.as_str())?,
                    balance: Money::new(balance, currency.decimal_places),
                    converted,
                    wallet,
                });
            }
            Ok(out)
        })
    }
}
