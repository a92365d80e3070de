//! Currency reference data.
//!
//! Currencies are rows of `currency_metadata` rather than a closed enum: the
//! set of supported codes is whatever the table contains, and each row carries
//! the precision the money codec uses for that currency.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Pivot currency of the exchange rate provider.
pub const PIVOT_CURRENCY: &str = "USD";

/// Highest precision the codec supports (`10^18` still fits an `i64`).
pub const MAX_DECIMAL_PLACES: u8 = 18;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyMetadata {
    pub code: String,
    pub name: String,
    pub kind: String,
    pub decimal_places: u8,
    pub symbol: String,
}

/// Normalizes a user-supplied currency code (`" eur "` → `"EUR"`).
pub fn normalize_code(value: &str) -> ResultEngine<String> {
    let code = value.trim().to_ascii_uppercase();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(EngineError::InvalidInput(format!(
            "invalid currency code: {value:?}"
        )));
    }
    Ok(code)
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "currency_metadata")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    pub name: String,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub decimal_places: i32,
    pub symbol: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for CurrencyMetadata {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let decimal_places = u8::try_from(model.decimal_places)
            .ok()
            .filter(|places| *places <= MAX_DECIMAL_PLACES)
            .ok_or_else(|| {
                EngineError::InvalidInput(format!(
                    "currency {} has unsupported decimal places {}",
                    model.code, model.decimal_places
                ))
            })?;
        Ok(Self {
            code: model.code,
            name: model.name,
            kind: model.kind,
            decimal_places,
            symbol: model.symbol,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_uppercases_and_trims() {
        assert_eq!(normalize_code(" eur ").unwrap(), "EUR");
        assert!(normalize_code("").is_err());
        assert!(normalize_code("E-R").is_err());
    }

    #[test]
    fn metadata_rejects_out_of_range_precision() {
        let model = Model {
            code: "XXX".to_string(),
            name: "Test".to_string(),
            kind: "fiat".to_string(),
            decimal_places: 19,
            symbol: "X".to_string(),
        };
        assert!(CurrencyMetadata::try_from(model.clone()).is_err());

        let ok = CurrencyMetadata::try_from(Model {
            decimal_places: 2,
            ..model
        })
        .unwrap();
        assert_eq!(ok.decimal_places, 2);
    }
}
