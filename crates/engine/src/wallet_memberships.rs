//! Wallet memberships: who can see or change a wallet, and with which role.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// Role of a user on a wallet.
///
/// Only `Admin` unlocks anything beyond reading: recording transactions and
/// managing members both require it. `User` and `Spectator` are not ordered
/// against each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletRole {
    Admin,
    User,
    Spectator,
}

impl WalletRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Spectator => "spectator",
        }
    }
}

impl core::fmt::Display for WalletRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for WalletRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            "spectator" => Ok(Self::Spectator),
            other => Err(EngineError::InvalidRole(format!(
                "invalid wallet role: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletMembership {
    pub wallet_id: Uuid,
    pub user_id: Uuid,
    pub role: WalletRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "wallet_memberships")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub wallet_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub role: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Wallets,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&WalletMembership> for ActiveModel {
    fn from(value: &WalletMembership) -> Self {
        Self {
            wallet_id: ActiveValue::Set(value.wallet_id.to_string()),
            user_id: ActiveValue::Set(value.user_id.to_string()),
            role: ActiveValue::Set(value.role.as_str().to_string()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for WalletMembership {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            wallet_id: parse_uuid(&model.wallet_id, "wallet")?,
            user_id: parse_uuid(&model.user_id, "user")?,
            role: WalletRole::try_from(model.role.as_str())?,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_from_their_names() {
        for role in [WalletRole::Admin, WalletRole::User, WalletRole::Spectator] {
            assert_eq!(WalletRole::try_from(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert_eq!(
            WalletRole::try_from("owner"),
            Err(EngineError::InvalidRole(
                "invalid wallet role: owner".to_string()
            ))
        );
        assert!(WalletRole::try_from("Admin").is_err());
    }
}
