use std::{sync::Arc, time::Duration};

use engine::{Engine, OpenExchangeRates};
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "allwallets={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let Some(server) = settings.server else {
        tracing::warn!("no [server] settings, nothing to run");
        return Ok(());
    };

    tracing::info!("Found server settings...");
    let db = parse_database(&server.database).await?;
    let engine = Arc::new(Engine::builder().database(db).build().await?);

    if let Some(rates) = settings.rates {
        tracing::info!("Found rates settings...");
        let mut builder = OpenExchangeRates::builder()
            .app_id(&rates.app_id)
            .timeout(Duration::from_secs(rates.timeout_secs));
        if let Some(base_url) = &rates.base_url {
            builder = builder.base_url(base_url);
        }
        let provider = builder.build()?;
        let every = Duration::from_secs(rates.refresh_every_secs.max(1));
        let engine = engine.clone();
        tasks.spawn(async move { refresh_rates(engine, provider, every).await });
    }

    let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tasks.spawn(async move {
        if let Err(err) = server::run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

/// Refreshes the rate table now and then every `every`. A failed refresh
/// keeps the previous table and is retried on the next tick.
async fn refresh_rates(engine: Arc<Engine>, provider: OpenExchangeRates, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        match engine.refresh_exchange_rates(&provider).await {
            Ok(report) => tracing::info!(
                stored = report.stored,
                missing = report.missing.len(),
                "rate table refreshed"
            ),
            Err(err) => tracing::error!("rate refresh failed: {err}"),
        }
    }
}

async fn parse_database(config: &settings::Database) -> Result<sea_orm::DatabaseConnection, BoxError> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
