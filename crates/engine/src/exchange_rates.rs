//! Stored pairwise exchange rates.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// Price of one unit of `from_currency` expressed in `to_currency`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: f64,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exchange_rates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub from_currency: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub to_currency: String,
    pub rate: f64,
    pub fetched_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ExchangeRate> for ActiveModel {
    fn from(value: &ExchangeRate) -> Self {
        Self {
            from_currency: ActiveValue::Set(value.from_currency.clone()),
            to_currency: ActiveValue::Set(value.to_currency.clone()),
            rate: ActiveValue::Set(value.rate),
            fetched_at: ActiveValue::Set(value.fetched_at),
        }
    }
}
