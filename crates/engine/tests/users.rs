mod common;

use std::sync::Arc;

use chrono::Utc;
use engine::{EngineError, ExchangeRate, Money, NewUser, WalletRole};

use common::{deposit, engine_with_db, engine_with_file_db, user};

#[tokio::test]
async fn usernames_are_unique_among_active_users() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice", "EUR").await;

    let err = engine
        .create_user(NewUser {
            username: "  alice ".to_string(),
            password_hash: "hash".to_string(),
            base_currency: "USD".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("alice".to_string()));

    engine.delete_user(alice.id).await.unwrap();
    let again = user(&engine, "alice", "USD").await;
    assert_ne!(again.id, alice.id);
    assert_eq!(engine.user_by_username("alice").await.unwrap().id, again.id);
}

#[tokio::test]
async fn unknown_base_currency_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let err = engine
        .create_user(NewUser {
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
            base_currency: "XYZ".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn deleting_a_user_revokes_memberships() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice", "EUR").await;
    let bob = user(&engine, "bob", "EUR").await;
    let wallet = engine.create_wallet("Trip", "EUR", alice.id).await.unwrap();
    engine
        .add_member(wallet.id, alice.id, "bob", WalletRole::User)
        .await
        .unwrap();

    engine.delete_user(bob.id).await.unwrap();

    assert_eq!(
        engine.user(bob.id).await.unwrap_err(),
        EngineError::KeyNotFound("user not exists".to_string())
    );
    assert!(engine.user_by_username("bob").await.is_err());
    assert_eq!(engine.list_members(wallet.id, alice.id).await.unwrap().len(), 1);
    assert!(engine.delete_user(bob.id).await.is_err());
}

#[tokio::test]
async fn wallets_are_listed_in_the_display_currency() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice", "USD").await;
    let euros = engine.create_wallet("Trip", "EUR", alice.id).await.unwrap();
    let dollars = engine.create_wallet("Cash", "USD", alice.id).await.unwrap();
    let yen = engine.create_wallet("Tokyo", "JPY", alice.id).await.unwrap();
    deposit(&engine, euros.id, alice.id, 1000).await;
    deposit(&engine, dollars.id, alice.id, 250).await;
    deposit(&engine, yen.id, alice.id, 500).await;

    engine
        .replace_rate_table(&[ExchangeRate {
            from_currency: "EUR".to_string(),
            to_currency: "USD".to_string(),
            rate: 1.1,
            fetched_at: Utc::now(),
        }])
        .await
        .unwrap();

    let wallets = engine.user_wallets(alice.id).await.unwrap();
    assert_eq!(wallets.len(), 3);

    let find = |name: &str| wallets.iter().find(|w| w.wallet.name == name).unwrap();
    let trip = find("Trip");
    assert_eq!(trip.role, WalletRole::Admin);
    assert_eq!(trip.balance, Money::new(1000, 2));
    assert_eq!(trip.converted, Some(Money::new(1100, 2)));

    assert_eq!(find("Cash").converted, Some(Money::new(250, 2)));

    // No JPY/USD rate stored yet.
    let tokyo = find("Tokyo");
    assert_eq!(tokyo.balance.to_string(), "500");
    assert_eq!(tokyo.converted, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_signups_with_one_username_conflict() {
    let (engine, _db, path) = engine_with_file_db().await;
    let engine = Arc::new(engine);

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let engine = Arc::clone(&engine);
        tasks.spawn(async move {
            engine
                .create_user(NewUser {
                    username: "alice".to_string(),
                    password_hash: "hash".to_string(),
                    base_currency: "EUR".to_string(),
                })
                .await
        });
    }
    let results = tasks.join_all().await;

    let created = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(EngineError::ExistingKey(name)) if name == "alice"))
        .count();
    assert_eq!((created, conflicts), (1, 7), "{results:?}");

    let _ = std::fs::remove_file(path);
}
