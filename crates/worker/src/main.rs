//! Maintenance jobs for the wallets database, meant to be run by cron or by
//! hand. Exits with 0 on success and 1 on failure.

use std::{process::ExitCode, time::Duration};

use clap::{Args, Parser, Subcommand};
use engine::{Engine, NewUser, OpenExchangeRates};
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use uuid::Uuid;

mod prompt;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(name = "worker")]
#[command(about = "Maintenance jobs for allwallets (snapshots, exchange rates, users)")]
struct Cli {
    /// Database connection string.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./allwallets.db?mode=rwc"
    )]
    database_url: String,

    /// Tracing level.
    #[arg(long, env = "WORKER_LOG", default_value = "info")]
    level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fold unreconciled transactions into the wallet balance.
    Snapshot(SnapshotArgs),
    /// Fetch exchange rates and replace the stored rate table.
    Xrates(XratesArgs),
    User(User),
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct SnapshotArgs {
    #[arg(long)]
    wallet: Option<Uuid>,
    /// Compact every wallet.
    #[arg(long)]
    all: bool,
}

#[derive(Args, Debug)]
struct XratesArgs {
    #[arg(long, env = "OXR_APP_ID", hide_env_values = true)]
    app_id: String,
    #[arg(long, env = "OXR_BASE_URL")]
    base_url: Option<String>,
    #[arg(long, env = "OXR_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a user; the password is asked on the terminal.
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long, default_value = "EUR")]
    base_currency: String,
}

async fn connect(database_url: &str) -> Result<Engine, BoxError> {
    let db = Database::connect(database_url).await?;
    Migrator::up(&db, None).await?;
    Ok(Engine::builder().database(db).build().await?)
}

async fn snapshot(engine: &Engine, args: SnapshotArgs) -> Result<(), BoxError> {
    let wallets = if args.all {
        engine.wallet_ids().await?
    } else {
        args.wallet.into_iter().collect()
    };

    let mut failed = 0usize;
    for wallet_id in wallets {
        match engine.compact_snapshot(wallet_id).await {
            Ok(report) => println!(
                "{wallet_id}: folded {} transactions, balance {}",
                report.folded, report.balance_minor
            ),
            Err(err) => {
                tracing::error!(wallet = %wallet_id, "snapshot failed: {err}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(format!("{failed} snapshot(s) failed").into());
    }
    Ok(())
}

async fn xrates(engine: &Engine, args: XratesArgs) -> Result<(), BoxError> {
    let mut builder = OpenExchangeRates::builder()
        .app_id(&args.app_id)
        .timeout(Duration::from_secs(args.timeout_secs));
    if let Some(base_url) = &args.base_url {
        builder = builder.base_url(base_url);
    }
    let provider = builder.build()?;

    let report = engine.refresh_exchange_rates(&provider).await?;
    println!("stored {} rates", report.stored);
    if !report.missing.is_empty() {
        println!("no quote for: {}", report.missing.join(", "));
    }
    Ok(())
}

async fn create_user(engine: &Engine, args: UserCreateArgs) -> Result<(), BoxError> {
    let password = prompt::new_password()?;
    let password_hash = server::hash_password(&password)?;

    let user = engine
        .create_user(NewUser {
            username: args.username,
            password_hash,
            base_currency: args.base_currency,
        })
        .await?;
    println!("created user: {} ({})", user.username, user.id);
    Ok(())
}

async fn run(cli: Cli) -> Result<(), BoxError> {
    let engine = connect(&cli.database_url).await?;

    match cli.command {
        Command::Snapshot(args) => snapshot(&engine, args).await,
        Command::Xrates(args) => xrates(&engine, args).await,
        Command::User(User {
            command: UserCommand::Create(args),
        }) => create_user(&engine, args).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(format!("worker={level},engine={level}", level = cli.level))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
