//! Transaction primitives.
//!
//! A `Transaction` is an append-only ledger row. `amount_minor` is always a
//! positive magnitude; `is_deposit` carries the sign.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub amount_minor: i64,
    pub is_deposit: bool,
    pub category: String,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        wallet_id: Uuid,
        amount_minor: i64,
        is_deposit: bool,
        category: String,
        creator_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            wallet_id,
            amount_minor,
            is_deposit,
            category,
            creator_id,
            created_at,
        })
    }

    /// `+amount` for deposits, `-amount` for expenses.
    #[must_use]
    pub fn signed_amount(&self) -> i64 {
        if self.is_deposit {
            self.amount_minor
        } else {
            -self.amount_minor
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub wallet_id: String,
    pub amount_minor: i64,
    pub is_deposit: bool,
    pub category: String,
    pub creator_id: String,
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
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            wallet_id: ActiveValue::Set(tx.wallet_id.to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            is_deposit: ActiveValue::Set(tx.is_deposit),
            category: ActiveValue::Set(tx.category.clone()),
            creator_id: ActiveValue::Set(tx.creator_id.to_string()),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            wallet_id: parse_uuid(&model.wallet_id, "wallet")?,
            amount_minor: model.amount_minor,
            is_deposit: model.is_deposit,
            category: model.category,
            creator_id: parse_uuid(&model.creator_id, "user")?,
            created_at: model.created_at,
        })
    }
}
