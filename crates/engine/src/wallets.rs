//! The module contains `Wallet` struct and its implementation.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// A shared wallet.
///
/// `balance` is the checkpoint: it is authoritative only at `last_snapshot`.
/// Transactions recorded after that instant are added on top of it every
/// time the current balance is read (see [`crate::ledger`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wallet {
    pub id: Uuid,
    pub name: String,
    pub currency: String,
    pub balance: i64,
    pub last_snapshot: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Wallet {
    /// A fresh wallet: zero balance, reconciled at creation time.
    pub fn new(name: String, currency: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            currency,
            balance: 0,
            last_snapshot: created_at,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub currency: String,
    pub balance: i64,
    pub last_snapshot: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(has_many = "super::wallet_memberships::Entity")]
    WalletMemberships,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::wallet_memberships::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WalletMemberships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Wallet> for ActiveModel {
    fn from(value: &Wallet) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            currency: ActiveValue::Set(value.currency.clone()),
            balance: ActiveValue::Set(value.balance),
            last_snapshot: ActiveValue::Set(value.last_snapshot),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Wallet {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "wallet")?,
            name: model.name,
            currency: model.currency,
            balance: model.balance,
            last_snapshot: model.last_snapshot,
            created_at: model.created_at,
        })
    }
}
