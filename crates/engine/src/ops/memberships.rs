use chrono::Utc;
use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, WalletMembership, WalletRole, users, util::parse_uuid,
    wallet_memberships,
};

use super::{Engine, with_tx};

/// A member row joined with the username.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletMember {
    pub user_id: Uuid,
    pub username: String,
    pub role: WalletRole,
}

impl Engine {
    /// Adds `username` to the wallet with `role` (admin only).
    ///
    /// A user who is already a member is rejected with `ExistingKey`; roles
    /// are not silently changed.
    pub async fn add_member(
        &self,
        wallet_id: Uuid,
        actor_id: Uuid,
        username: &str,
        role: WalletRole,
    ) -> ResultEngine<WalletMembership> {
        let username = username.trim();
        with_tx!(self, |db_tx| {
            self.lock_wallet(&db_tx, wallet_id).await?;
            self.require_wallet_role(&db_tx, wallet_id, actor_id, WalletRole::Admin)
                .await?;

            let member = self
                .find_user_by_username(&db_tx, username)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            let member_id = parse_uuid(&member.id, "user")?;

            if self.wallet_role(&db_tx, wallet_id, member_id).await?.is_some() {
                return Err(EngineError::ExistingKey(member.username));
            }

            let membership = WalletMembership {
                wallet_id,
                user_id: member_id,
                role,
                created_at: Utc::now(),
            };
            let model: wallet_memberships::ActiveModel = (&membership).into();
            model.insert(&db_tx).await?;

            tracing::info!(wallet = %wallet_id, member = %member_id, %role, "member added");
            Ok(membership)
        })
    }

    /// Removes `username` from the wallet (admin only).
    ///
    /// The last admin of a wallet cannot be removed.
    pub async fn remove_member(
        &self,
        wallet_id: Uuid,
        actor_id: Uuid,
        username: &str,
    ) -> ResultEngine<()> {
        let username = username.trim();
        with_tx!(self, |db_tx| {
            self.lock_wallet(&db_tx, wallet_id).await?;
            self.require_wallet_role(&db_tx, wallet_id, actor_id, WalletRole::Admin)
                .await?;

            let member = self
                .find_user_by_username(&db_tx, username)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            let member_id = parse_uuid(&member.id, "user")?;
            let role = self
                .wallet_role(&db_tx, wallet_id, member_id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))?;

            if role == WalletRole::Admin {
                let admins = wallet_memberships::Entity::find()
                    .filter(wallet_memberships::Column::WalletId.eq(wallet_id.to_string()))
                    .filter(wallet_memberships::Column::Role.eq(WalletRole::Admin.as_str()))
                    .count(&db_tx)
                    .await?;
                if admins <= 1 {
                    return Err(EngineError::InvalidInput(
                        "cannot remove the last wallet admin".to_string(),
                    ));
                }
            }

            wallet_memberships::Entity::delete_by_id((wallet_id.to_string(), member.id))
                .exec(&db_tx)
                .await?;

            tracing::info!(wallet = %wallet_id, member = %member_id, "member removed");
            Ok(())
        })
    }

    /// Lists the members of a wallet. Any member can read it.
    pub async fn list_members(
        &self,
        wallet_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Vec<WalletMember>> {
        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, wallet_id, user_id).await?;

            let rows = wallet_memberships::Entity::find()
                .filter(wallet_memberships::Column::WalletId.eq(wallet_id.to_string()))
                .order_by_asc(wallet_memberships::Column::CreatedAt)
                .find_also_related(users::Entity)
                .all(&db_tx)
                .await?;

            let mut members = Vec::with_capacity(rows.len());
            for (membership, user) in rows {
                let Some(user) = user else {
                    continue;
                };
                members.push(WalletMember {
                    user_id: parse_uuid(&membership.user_id, "user")?,
                    username: user.username,
                    role: WalletRole::try_from(membership.role.as_str())?,
                });
            }
            Ok(members)
        })
    }
}
