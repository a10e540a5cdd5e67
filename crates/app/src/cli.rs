use clap::{Args, Parser, Subcommand};
use ledger::Currency;

#[derive(Parser, Debug)]
#[command(name = "ledgerctl")]
#[command(about = "Accounts and double-entry transfers")]
pub struct Cli {
    /// Settings file. Defaults to `settings.toml` when present.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Database connection string (also read from `DATABASE_URL`).
    /// Overrides `database.url` from the settings.
    #[arg(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply pending migrations.
    Migrate,
    Account(Account),
    /// Move funds between two accounts.
    Transfer(TransferArgs),
    /// Entries of one account, oldest first.
    History(HistoryArgs),
}

#[derive(Args, Debug)]
pub struct Account {
    #[command(subcommand)]
    pub command: AccountCommand,
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    Create(AccountCreateArgs),
    Show { id: i64 },
    List(AccountListArgs),
    Delete { id: i64 },
}

#[derive(Args, Debug)]
pub struct AccountCreateArgs {
    #[arg(long)]
    pub owner: String,
    #[arg(long, value_parser = parse_currency)]
    pub currency: Currency,
    /// Opening balance in minor units.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub balance: i64,
}

#[derive(Args, Debug)]
pub struct AccountListArgs {
    #[arg(long)]
    pub owner: String,
    #[command(flatten)]
    pub page: Page,
}

#[derive(Args, Debug)]
pub struct TransferArgs {
    #[arg(long)]
    pub from: i64,
    #[arg(long)]
    pub to: i64,
    /// Amount in minor units.
    #[arg(long, allow_negative_numbers = true)]
    pub amount: i64,
    /// Require both accounts to be in this currency.
    #[arg(long, value_parser = parse_currency)]
    pub currency: Option<Currency>,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[arg(long)]
    pub account: i64,
    #[command(flatten)]
    pub page: Page,
}

#[derive(Args, Debug)]
pub struct Page {
    #[arg(long, default_value_t = 20)]
    pub limit: u64,
    #[arg(long, default_value_t = 0)]
    pub offset: u64,
}

fn parse_currency(raw: &str) -> Result<Currency, String> {
    raw.parse().map_err(|err: ledger::LedgerError| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_transfer() {
        let cli = Cli::try_parse_from([
            "ledgerctl",
            "transfer",
            "--from",
            "1",
            "--to",
            "2",
            "--amount",
            "10",
            "--currency",
            "USD",
        ])
        .unwrap();

        match cli.command {
            Command::Transfer(args) => {
                assert_eq!((args.from, args.to, args.amount), (1, 2, 10));
                assert_eq!(args.currency, Some(Currency::Usd));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn negative_amount_reaches_the_ledger() {
        let cli = Cli::try_parse_from([
            "ledgerctl", "transfer", "--from", "1", "--to", "2", "--amount", "-5",
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::Transfer(TransferArgs { amount: -5, .. })));
    }

    #[test]
    fn rejects_unknown_currency() {
        let err = Cli::try_parse_from([
            "ledgerctl",
            "account",
            "create",
            "--owner",
            "alice",
            "--currency",
            "XYZ",
        ])
        .unwrap_err();

        assert!(err.to_string().contains("XYZ"), "{err}");
    }

    #[test]
    fn list_has_default_page() {
        let cli =
            Cli::try_parse_from(["ledgerctl", "account", "list", "--owner", "alice"]).unwrap();

        match cli.command {
            Command::Account(Account {
                command: AccountCommand::List(args),
            }) => {
                assert_eq!(args.owner, "alice");
                assert_eq!((args.page.limit, args.page.offset), (20, 0));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
