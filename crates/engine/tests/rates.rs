mod common;

use std::collections::HashMap;

use chrono::Utc;
use engine::{BaseRates, EngineError, ExchangeRate, RateProvider, ResultEngine};

use common::engine_with_db;

struct FixedRates(BaseRates);

impl RateProvider for FixedRates {
    async fn fetch_base_rates(&self) -> ResultEngine<BaseRates> {
        Ok(self.0.clone())
    }
}

struct Offline;

impl RateProvider for Offline {
    async fn fetch_base_rates(&self) -> ResultEngine<BaseRates> {
        Err(EngineError::UpstreamUnavailable("connection refused".to_string()))
    }
}

fn quotes() -> BaseRates {
    HashMap::from([
        ("USD".to_string(), 1.0),
        ("EUR".to_string(), 0.9),
        ("GBP".to_string(), 0.8),
        ("XXX".to_string(), 3.0),
    ])
}

#[tokio::test]
async fn refresh_stores_cross_rates() {
    let (engine, _db) = engine_with_db().await;

    let report = engine
        .refresh_exchange_rates(&FixedRates(quotes()))
        .await
        .unwrap();

    assert_eq!(report.stored, 6);
    assert!(report.missing.contains(&"JPY".to_string()));
    assert!(!report.missing.contains(&"EUR".to_string()));

    assert_eq!(engine.exchange_rate("EUR", "GBP").await.unwrap(), 0.8 / 0.9);
    assert_eq!(engine.exchange_rate("usd", "gbp").await.unwrap(), 0.8);
    assert_eq!(engine.exchange_rate("JPY", "JPY").await.unwrap(), 1.0);
    assert_eq!(
        engine.exchange_rate("JPY", "EUR").await.unwrap_err(),
        EngineError::KeyNotFound("exchange rate JPY/EUR".to_string())
    );
}

#[tokio::test]
async fn refresh_replaces_the_whole_table() {
    let (engine, _db) = engine_with_db().await;
    engine
        .replace_rate_table(&[ExchangeRate {
            from_currency: "CHF".to_string(),
            to_currency: "EUR".to_string(),
            rate: 1.05,
            fetched_at: Utc::now(),
        }])
        .await
        .unwrap();
    assert_eq!(engine.exchange_rate("CHF", "EUR").await.unwrap(), 1.05);

    engine
        .refresh_exchange_rates(&FixedRates(quotes()))
        .await
        .unwrap();
    assert!(engine.exchange_rate("CHF", "EUR").await.is_err());
}

#[tokio::test]
async fn failed_refresh_keeps_previous_rates() {
    let (engine, _db) = engine_with_db().await;
    engine
        .refresh_exchange_rates(&FixedRates(quotes()))
        .await
        .unwrap();

    let err = engine.refresh_exchange_rates(&Offline).await.unwrap_err();
    assert!(err.is_infrastructure());

    // A provider that knows none of our currencies must not wipe the table.
    let useless = FixedRates(HashMap::from([("XXX".to_string(), 2.0)]));
    let err = engine.refresh_exchange_rates(&useless).await.unwrap_err();
    assert!(matches!(err, EngineError::UpstreamUnavailable(_)));

    assert_eq!(engine.exchange_rate("EUR", "GBP").await.unwrap(), 0.8 / 0.9);
}

#[tokio::test]
async fn invalid_rates_are_not_stored() {
    let (engine, _db) = engine_with_db().await;
    let bad = ExchangeRate {
        from_currency: "EUR".to_string(),
        to_currency: "USD".to_string(),
        rate: f64::NAN,
        fetched_at: Utc::now(),
    };
    assert!(matches!(
        engine.replace_rate_table(&[bad]).await,
        Err(EngineError::InvalidAmount(_))
    ));
}

#[tokio::test]
async fn currencies_come_from_reference_data() {
    let (engine, _db) = engine_with_db().await;
    let currencies = engine.currencies().await.unwrap();
    assert!(currencies.iter().any(|c| c.code == "USD"));

    let yen = engine.currency("jpy").await.unwrap();
    assert_eq!(yen.decimal_places, 0);
    assert!(engine.currency("XYZ").await.is_err());
}
