//! Seeds `currency_metadata` with the currencies wallets can be opened in.

use sea_orm_migration::prelude::*;

use super::m20260301_000000_init::CurrencyMetadata;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (code, name, type, decimal places, symbol)
const CURRENCIES: &[(&str, &str, &str, i32, &str)] = &[
    ("USD", "US Dollar", "fiat", 2, "$"),
    ("EUR", "Euro", "fiat", 2, "€"),
    ("GBP", "British Pound", "fiat", 2, "£"),
    ("CHF", "Swiss Franc", "fiat", 2, "CHF"),
    ("JPY", "Japanese Yen", "fiat", 0, "¥"),
    ("CNY", "Chinese Yuan", "fiat", 2, "¥"),
    ("RUB", "Russian Ruble", "fiat", 2, "₽"),
    ("UAH", "Ukrainian Hryvnia", "fiat", 2, "₴"),
    ("KZT", "Kazakhstani Tenge", "fiat", 2, "₸"),
    ("KWD", "Kuwaiti Dinar", "fiat", 3, "KD"),
    ("BTC", "Bitcoin", "crypto", 8, "₿"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut stmt = Query::insert()
            .into_table(CurrencyMetadata::Table)
            .columns([
                CurrencyMetadata::Code,
                CurrencyMetadata::Name,
                CurrencyMetadata::Type,
                CurrencyMetadata::DecimalPlaces,
                CurrencyMetadata::Symbol,
            ])
            .to_owned();
        for (code, name, kind, decimal_places, symbol) in CURRENCIES {
            stmt.values_panic([
                (*code).into(),
                (*name).into(),
                (*kind).into(),
                (*decimal_places).into(),
                (*symbol).into(),
            ]);
        }
        stmt.on_conflict(
            OnConflict::column(CurrencyMetadata::Code)
                .do_nothing()
                .to_owned(),
        );

        manager.exec_stmt(stmt).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let codes: Vec<&str> = CURRENCIES.iter().map(|(code, ..)| *code).collect();
        let stmt = Query::delete()
            .from_table(CurrencyMetadata::Table)
            .and_where(Expr::col(CurrencyMetadata::Code).is_in(codes))
            .to_owned();
        manager.exec_stmt(stmt).await
    }
}
