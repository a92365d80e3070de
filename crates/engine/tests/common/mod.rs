#![allow(dead_code)]

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use engine::{Engine, NewUser, User};
use migration::MigratorTrait;
use uuid::Uuid;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn engine_with_file_db() -> (Engine, DatabaseConnection, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    // More than one pooled connection, so DB transactions really overlap.
    let mut options = ConnectOptions::new(url);
    options.max_connections(8).min_connections(2);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();

    (engine, db, path)
}

pub async fn user(engine: &Engine, username: &str, base_currency: &str) -> User {
    engine
        .create_user(NewUser {
            username: username.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            base_currency: base_currency.to_string(),
        })
        .await
        .unwrap()
}

pub async fn deposit(engine: &Engine, wallet_id: Uuid, creator_id: Uuid, amount_minor: i64) {
    engine
        .record_transaction(engine::NewTransaction {
            wallet_id,
            creator_id,
            amount_minor,
            is_deposit: true,
            category: "salary".to_string(),
        })
        .await
        .unwrap();
}

pub fn expense(wallet_id: Uuid, creator_id: Uuid, amount_minor: i64) -> engine::NewTransaction {
    engine::NewTransaction {
        wallet_id,
        creator_id,
        amount_minor,
        is_deposit: false,
        category: "food".to_string(),
    }
}
