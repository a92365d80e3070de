mod common;

use std::sync::Arc;

use engine::{EngineError, Money, WalletRole};

use common::{deposit, engine_with_db, engine_with_file_db, expense, user};

#[tokio::test]
async fn deposit_then_expense_moves_balance() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice", "EUR").await;
    let wallet = engine.create_wallet("Trip", "eur", alice.id).await.unwrap();
    assert_eq!(wallet.currency, "EUR");
    assert_eq!(engine.current_balance(wallet.id).await.unwrap(), 0);

    deposit(&engine, wallet.id, alice.id, 100).await;
    engine
        .record_transaction(expense(wallet.id, alice.id, 30))
        .await
        .unwrap();

    assert_eq!(engine.current_balance(wallet.id).await.unwrap(), 70);
    let detail = engine.wallet(wallet.id, alice.id).await.unwrap();
    assert_eq!(detail.balance, Money::new(70, 2));
    assert_eq!(detail.balance.to_string(), "0.70");
    assert_eq!(detail.role, WalletRole::Admin);
}

#[tokio::test]
async fn expense_equal_to_balance_is_allowed() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice", "EUR").await;
    let wallet = engine.create_wallet("Cash", "EUR", alice.id).await.unwrap();
    deposit(&engine, wallet.id, alice.id, 70).await;

    assert!(engine.can_afford(wallet.id, 70).await.unwrap());
    assert!(!engine.can_afford(wallet.id, 71).await.unwrap());

    let err = engine
        .record_transaction(expense(wallet.id, alice.id, 71))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    engine
        .record_transaction(expense(wallet.id, alice.id, 70))
        .await
        .unwrap();
    assert_eq!(engine.current_balance(wallet.id).await.unwrap(), 0);
}

#[tokio::test]
async fn non_positive_amount_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice", "EUR").await;
    let wallet = engine.create_wallet("Cash", "EUR", alice.id).await.unwrap();

    for amount in [0, -5] {
        let err = engine
            .record_transaction(expense(wallet.id, alice.id, amount))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }
}

#[tokio::test]
async fn only_admins_record_transactions() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice", "EUR").await;
    let bob = user(&engine, "bob", "EUR").await;
    let carol = user(&engine, "carol", "EUR").await;
    let wallet = engine.create_wallet("Shared", "EUR", alice.id).await.unwrap();
    engine
        .add_member(wallet.id, alice.id, "bob", WalletRole::User)
        .await
        .unwrap();

    let err = engine
        .record_transaction(expense(wallet.id, bob.id, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine
        .record_transaction(expense(wallet.id, carol.id, 1))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("wallet not exists".to_string()));

    // Members can still read.
    assert!(engine.list_transactions(wallet.id, bob.id).await.is_ok());
    assert!(engine.list_transactions(wallet.id, carol.id).await.is_err());
}

#[tokio::test]
async fn snapshot_keeps_current_balance() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice", "EUR").await;
    let wallet = engine.create_wallet("Cash", "EUR", alice.id).await.unwrap();
    deposit(&engine, wallet.id, alice.id, 100).await;
    engine
        .record_transaction(expense(wallet.id, alice.id, 30))
        .await
        .unwrap();

    let report = engine.compact_snapshot(wallet.id).await.unwrap();
    assert_eq!(report.folded, 2);
    assert_eq!(report.delta_minor, 70);
    assert_eq!(report.balance_minor, 70);

    let detail = engine.wallet(wallet.id, alice.id).await.unwrap();
    assert_eq!(detail.wallet.balance, 70);
    assert_eq!(detail.wallet.last_snapshot, report.last_snapshot);
    assert_eq!(engine.current_balance(wallet.id).await.unwrap(), 70);

    // Nothing left to fold: a second run is a no-op.
    let again = engine.compact_snapshot(wallet.id).await.unwrap();
    assert_eq!(again.folded, 0);
    assert_eq!(again.balance_minor, 70);

    // Rows recorded after the snapshot land in the new tail.
    deposit(&engine, wallet.id, alice.id, 5).await;
    assert_eq!(engine.current_balance(wallet.id).await.unwrap(), 75);
    assert_eq!(
        engine
            .list_transactions(wallet.id, alice.id)
            .await
            .unwrap()
            .len(),
        3
    );
}

#[tokio::test]
async fn transactions_are_listed_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice", "EUR").await;
    let wallet = engine.create_wallet("Cash", "EUR", alice.id).await.unwrap();
    deposit(&engine, wallet.id, alice.id, 10).await;
    deposit(&engine, wallet.id, alice.id, 20).await;
    engine
        .record_transaction(expense(wallet.id, alice.id, 5))
        .await
        .unwrap();

    let txs = engine.list_transactions(wallet.id, alice.id).await.unwrap();
    let amounts: Vec<i64> = txs.iter().map(|tx| tx.signed_amount()).collect();
    assert_eq!(amounts, vec![-5, 20, 10]);
    assert!(txs.windows(2).all(|w| w[0].created_at >= w[1].created_at));
}

#[tokio::test]
async fn unknown_wallet_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice", "EUR").await;
    let missing = uuid::Uuid::new_v4();

    assert_eq!(
        engine.current_balance(missing).await.unwrap_err(),
        EngineError::KeyNotFound("wallet not exists".to_string())
    );
    assert_eq!(
        engine
            .record_transaction(expense(missing, alice.id, 1))
            .await
            .unwrap_err(),
        EngineError::KeyNotFound("wallet not exists".to_string())
    );
    assert!(engine.compact_snapshot(missing).await.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_expenses_cannot_overdraw() {
    let (engine, _db, path) = engine_with_file_db().await;
    let engine = Arc::new(engine);
    let alice = user(&engine, "alice", "EUR").await;
    let wallet = engine.create_wallet("Cash", "EUR", alice.id).await.unwrap();
    deposit(&engine, wallet.id, alice.id, 100).await;
    let (wallet_id, alice_id) = (wallet.id, alice.id);

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let engine = Arc::clone(&engine);
        tasks.spawn(async move {
            engine
                .record_transaction(expense(wallet_id, alice_id, 70))
                .await
        });
    }
    let results = tasks.join_all().await;

    let ok = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(EngineError::InsufficientFunds(_))))
        .count();
    assert_eq!((ok, rejected), (1, 7), "{results:?}");
    assert_eq!(engine.current_balance(wallet.id).await.unwrap(), 30);

    let _ = std::fs::remove_file(path);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn snapshot_racing_with_writes_loses_nothing() {
    let (engine, _db, path) = engine_with_file_db().await;
    let engine = Arc::new(engine);
    let alice = user(&engine, "alice", "EUR").await;
    let wallet = engine.create_wallet("Cash", "EUR", alice.id).await.unwrap();
    let (wallet_id, alice_id) = (wallet.id, alice.id);

    let writer = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            for _ in 0..20 {
                deposit(&engine, wallet_id, alice_id, 1).await;
            }
        })
    };
    let compactor = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            for _ in 0..5 {
                engine.compact_snapshot(wallet_id).await.unwrap();
            }
        })
    };
    writer.await.unwrap();
    compactor.await.unwrap();

    assert_eq!(engine.current_balance(wallet.id).await.unwrap(), 20);
    engine.compact_snapshot(wallet.id).await.unwrap();
    let detail = engine.wallet(wallet.id, alice.id).await.unwrap();
    assert_eq!(detail.wallet.balance, 20);

    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn wallet_ids_lists_every_wallet() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice", "EUR").await;
    let first = engine.create_wallet("Home", "EUR", alice.id).await.unwrap();
    let second = engine.create_wallet("Trip", "USD", alice.id).await.unwrap();

    let ids = engine.wallet_ids().await.unwrap();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first.id));
    assert!(ids.contains(&second.id));
}
