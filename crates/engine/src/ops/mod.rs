use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod access;
mod ledger;
mod memberships;
mod rates;
mod users;
mod wallets;

pub use ledger::{NewTransaction, SnapshotReport};
pub use memberships::WalletMember;
pub use rates::RateRefreshReport;
pub use users::{NewUser, UserWallet};
pub use wallets::WalletDetail;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of every wallet operation.
///
/// The engine owns no balance state: every call reads what it needs from the
/// injected database and writes back inside a single DB transaction.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
