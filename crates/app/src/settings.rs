//! Settings for the `ledgerctl` binary.
//!
//! Sources, lowest priority first: built-in defaults, `settings.toml` (or the
//! file given with `--config`), then `LEDGER__*` environment variables, e.g.
//! `LEDGER__DATABASE__URL` or `LEDGER__TRANSFER__MAX_ATTEMPTS`.
//!
//! See `settings.example.toml` for every key.
use std::time::Duration;

use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use sea_orm::IsolationLevel;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Isolation {
    /// Whatever the backend defaults to.
    #[default]
    Default,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl Isolation {
    pub fn level(self) -> Option<IsolationLevel> {
        match self {
            Isolation::Default => None,
            Isolation::ReadCommitted => Some(IsolationLevel::ReadCommitted),
            Isolation::RepeatableRead => Some(IsolationLevel::RepeatableRead),
            Isolation::Serializable => Some(IsolationLevel::Serializable),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
    pub isolation: Isolation,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            url: "sqlite:./ledger.db?mode=rwc".to_string(),
            max_connections: 10,
            isolation: Isolation::Default,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Transfer {
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl Transfer {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl Default for Transfer {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 50,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub transfer: Transfer,
}

impl Settings {
    /// Load settings from `path`, or from `settings.toml` if it exists.
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::with_name(path),
            None => File::with_name("settings").required(false),
        };
        Self::from_builder(Config::builder().add_source(file))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .add_source(
                Environment::with_prefix("LEDGER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
