//! Shared multi-currency wallets.
//!
//! The crate is split in two layers:
//! - pure modules ([`money`], [`ledger`], [`rates`]) holding the arithmetic,
//! - [`Engine`] operations that read and write through sea-orm, one DB
//!   transaction per call.

pub use currency::{CurrencyMetadata, MAX_DECIMAL_PLACES, PIVOT_CURRENCY, normalize_code};
pub use error::EngineError;
pub use exchange_rates::ExchangeRate;
pub use money::{
    Money, convert_minor, parse_minor_units, to_display_string, to_minor_units,
};
pub use ops::{
    Engine, EngineBuilder, NewTransaction, NewUser, RateRefreshReport, SnapshotReport,
    UserWallet, WalletDetail, WalletMember,
};
pub use rates::{BaseRates, DerivedRates, OpenExchangeRates, RateProvider, derive_pairwise_rates};
pub use transactions::Transaction;
pub use users::User;
pub use wallet_memberships::{WalletMembership, WalletRole};
pub use wallets::Wallet;

pub mod currency;
mod error;
pub mod exchange_rates;
pub mod ledger;
pub mod money;
mod ops;
pub mod rates;
pub mod transactions;
pub mod users;
mod util;
pub mod wallet_memberships;
pub mod wallets;

pub type ResultEngine<T> = Result<T, EngineError>;
