//! Initial schema migration - creates all tables from scratch.
//!
//! - `currency_metadata`: reference data, one row per supported currency
//! - `users`: authentication, soft-deleted
//! - `wallets`: shared balances with their reconciliation checkpoint
//! - `wallet_memberships`: who can access a wallet and with which role
//! - `transactions`: append-only ledger rows
//! - `exchange_rates`: pairwise rate table, rewritten on every refresh

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum CurrencyMetadata {
    Table,
    Code,
    Name,
    Type,
    DecimalPlaces,
    Symbol,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    BaseCurrency,
    CreatedAt,
    IsDeleted,
    DeletedAt,
}

#[derive(Iden)]
enum Wallets {
    Table,
    Id,
    Name,
    Currency,
    Balance,
    LastSnapshot,
    CreatedAt,
}

#[derive(Iden)]
enum WalletMemberships {
    Table,
    WalletId,
    UserId,
    Role,
    CreatedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    WalletId,
    AmountMinor,
    IsDeposit,
    Category,
    CreatorId,
    CreatedAt,
}

#[derive(Iden)]
enum ExchangeRates {
    Table,
    FromCurrency,
    ToCurrency,
    Rate,
    FetchedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CurrencyMetadata::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CurrencyMetadata::Code)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CurrencyMetadata::Name).string().not_null())
                    .col(ColumnDef::new(CurrencyMetadata::Type).string().not_null())
                    .col(
                        ColumnDef::new(CurrencyMetadata::DecimalPlaces)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CurrencyMetadata::Symbol).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::BaseCurrency).string().not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::DeletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-users-base_currency")
                            .from(Users::Table, Users::BaseCurrency)
                            .to(CurrencyMetadata::Table, CurrencyMetadata::Code),
                    )
                    .to_owned(),
            )
            .await?;

        // Usernames are reusable once the previous owner is soft-deleted.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS \"idx-users-username-active\" \
                 ON users (username) WHERE NOT is_deleted",
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Wallets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Wallets::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Wallets::Name).string().not_null())
                    .col(ColumnDef::new(Wallets::Currency).string().not_null())
                    .col(ColumnDef::new(Wallets::Balance).big_integer().not_null())
                    .col(
                        ColumnDef::new(Wallets::LastSnapshot)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Wallets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-wallets-currency")
                            .from(Wallets::Table, Wallets::Currency)
                            .to(CurrencyMetadata::Table, CurrencyMetadata::Code),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WalletMemberships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WalletMemberships::WalletId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WalletMemberships::UserId).string().not_null())
                    .col(ColumnDef::new(WalletMemberships::Role).string().not_null())
                    .col(
                        ColumnDef::new(WalletMemberships::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(WalletMemberships::WalletId)
                            .col(WalletMemberships::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-wallet_memberships-wallet_id")
                            .from(WalletMemberships::Table, WalletMemberships::WalletId)
                            .to(Wallets::Table, Wallets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-wallet_memberships-user_id")
                            .from(WalletMemberships::Table, WalletMemberships::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-wallet_memberships-user_id")
                    .table(WalletMemberships::Table)
                    .col(WalletMemberships::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::WalletId).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::IsDeposit).boolean().not_null())
                    .col(ColumnDef::new(Transactions::Category).string().not_null())
                    .col(ColumnDef::new(Transactions::CreatorId).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .check(Expr::col(Transactions::AmountMinor).gt(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-wallet_id")
                            .from(Transactions::Table, Transactions::WalletId)
                            .to(Wallets::Table, Wallets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-wallet_id-created_at")
                    .table(Transactions::Table)
                    .col(Transactions::WalletId)
                    .col(Transactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExchangeRates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExchangeRates::FromCurrency)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExchangeRates::ToCurrency).string().not_null())
                    .col(ColumnDef::new(ExchangeRates::Rate).double().not_null())
                    .col(
                        ColumnDef::new(ExchangeRates::FetchedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ExchangeRates::FromCurrency)
                            .col(ExchangeRates::ToCurrency),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(ExchangeRates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WalletMemberships::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Wallets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CurrencyMetadata::Table).to_owned())
            .await?;
        Ok(())
    }
}
