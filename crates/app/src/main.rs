use clap::Parser;
use ledger::{Ledger, NewAccount, TransferCmd};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, DatabaseConnection};
use serde::Serialize;

use cli::{AccountCommand, Cli, Command};
use retry::RetryPolicy;
use settings::Settings;

mod cli;
mod retry;
mod settings;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let mut settings = Settings::new(cli.config.as_deref())?;
    if let Some(url) = cli.database_url {
        settings.database.url = url;
    }

    // stdout carries the JSON output.
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ledgerctl={level},ledger={level},migration={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let db = connect(&settings.database).await?;

    if let Command::Migrate = cli.command {
        let applied = Migrator::get_applied_migrations(&db).await?;
        tracing::info!(count = applied.len(), "migrations applied");
        return print_json(&serde_json::json!({ "applied": applied.len() }));
    }

    let mut builder = Ledger::builder().database(db);
    if let Some(level) = settings.database.isolation.level() {
        builder = builder.isolation_level(level);
    }
    let ledger = builder.build().await?;

    match cli.command {
        Command::Migrate => Ok(()),
        Command::Account(account) => match account.command {
            AccountCommand::Create(args) => {
                let new = NewAccount::new(args.owner, args.currency).with_balance(args.balance);
                print_json(&ledger.create_account(new).await?)
            }
            AccountCommand::Show { id } => print_json(&ledger.account(id).await?),
            AccountCommand::List(args) => print_json(
                &ledger
                    .list_accounts(&args.owner, args.page.limit, args.page.offset)
                    .await?,
            ),
            AccountCommand::Delete { id } => {
                ledger.delete_account(id).await?;
                print_json(&serde_json::json!({ "deleted": id }))
            }
        },
        Command::Transfer(args) => {
            if let Some(currency) = args.currency {
                ledger.ensure_currency(args.from, currency).await?;
                ledger.ensure_currency(args.to, currency).await?;
            }
            let cmd = TransferCmd::new(args.from, args.to, args.amount);
            let policy = RetryPolicy::from(&settings.transfer);
            let result = policy.run(|| ledger.transfer(cmd)).await?;
            print_json(&result)
        }
        Command::History(args) => print_json(
            &ledger
                .list_entries(args.account, args.page.limit, args.page.offset)
                .await?,
        ),
    }
}

/// Connect and bring the schema up to date.
async fn connect(config: &settings::Database) -> Result<DatabaseConnection, BoxError> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .sqlx_logging(false);

    let database = sea_orm::Database::connect(options).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), BoxError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
