//! The module contains the errors the ledger can return.
//!
//! Every variant belongs to one [`ErrorKind`], which is what a calling layer
//! should branch on:
//!
//! - [`Validation`]: malformed input, raised before any unit of work is opened.
//! - [`NotFound`]: a referenced row does not exist.
//! - [`Duplicate`]: a unique key is already taken.
//! - [`Conflict`]: lock wait timeout, deadlock or serialization failure. These
//!   are transient and the operation can be re-run from scratch.
//! - [`Cancelled`]: the caller gave up while the unit of work was running.
//! - [`Fatal`]: commit/rollback failures and any other storage error.
//!
//!  [`Validation`]: ErrorKind::Validation
//!  [`NotFound`]: ErrorKind::NotFound
//!  [`Duplicate`]: ErrorKind::Duplicate
//!  [`Conflict`]: ErrorKind::Conflict
//!  [`Cancelled`]: ErrorKind::Cancelled
//!  [`Fatal`]: ErrorKind::Fatal
use sea_orm::{ConnAcquireErr, DbErr, RuntimeErr};
use thiserror::Error;

/// Postgres SQLSTATEs that mean "someone else holds what you need".
const PG_TRANSIENT_STATES: [&str; 4] = [
    "40001", // serialization_failure
    "40P01", // deadlock_detected
    "55P03", // lock_not_available
    "57014", // query_canceled (lock_timeout / statement_timeout)
];

/// SQLite primary result codes for busy/locked databases.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid transfer: {0}")]
    InvalidTransfer(String),
    #[error("Invalid account: {0}")]
    InvalidAccount(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error("Invalid page: {0}")]
    InvalidPage(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Conflicting access: {0}")]
    Conflict(DbErr),
    #[error("Unit of work cancelled")]
    Cancelled,
    #[error("Commit failed: {0}")]
    Commit(Box<LedgerError>),
    #[error("tx error: {source}, rb error: {rollback}")]
    Rollback {
        source: Box<LedgerError>,
        rollback: Box<LedgerError>,
    },
    #[error(transparent)]
    Database(DbErr),
}

/// Coarse error category, see the module documentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Duplicate,
    Conflict,
    Cancelled,
    Fatal,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTransfer(_)
            | Self::InvalidAccount(_)
            | Self::CurrencyMismatch(_)
            | Self::InvalidPage(_) => ErrorKind::Validation,
            Self::KeyNotFound(_) => ErrorKind::NotFound,
            Self::ExistingKey(_) => ErrorKind::Duplicate,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Commit(_) | Self::Rollback { .. } | Self::Database(_) => ErrorKind::Fatal,
        }
    }

    /// `true` when re-running the whole operation may succeed.
    ///
    /// A failed commit or rollback is never transient, even if the underlying
    /// cause was a conflict: the outcome of the unit of work is unknown.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    /// Combine the error that aborted a unit of work with the error raised
    /// while rolling it back.
    pub(crate) fn rollback(source: LedgerError, rollback: LedgerError) -> Self {
        Self::Rollback {
            source: Box::new(source),
            rollback: Box::new(rollback),
        }
    }
}

impl From<DbErr> for LedgerError {
    fn from(err: DbErr) -> Self {
        if is_transient_db_err(&err) {
            Self::Conflict(err)
        } else {
            Self::Database(err)
        }
    }
}

fn is_transient_db_err(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(ConnAcquireErr::Timeout) => true,
        DbErr::Exec(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Conn(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .is_some_and(|code| is_transient_code(&code)),
        _ => false,
    }
}

fn is_transient_code(code: &str) -> bool {
    if PG_TRANSIENT_STATES.contains(&code) {
        return true;
    }
    // SQLite reports numeric extended result codes; the low byte is the primary
    // code. SQLSTATEs are always five characters.
    code.len() < 5
        && code
            .parse::<i32>()
            .is_ok_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidTransfer(a), Self::InvalidTransfer(b)) => a == b,
            (Self::InvalidAccount(a), Self::InvalidAccount(b)) => a == b,
            (Self::CurrencyMismatch(a), Self::CurrencyMismatch(b)) => a == b,
            (Self::InvalidPage(a), Self::InvalidPage(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a.to_string() == b.to_string(),
            (Self::Cancelled, Self::Cancelled) => true,
            (Self::Commit(a), Self::Commit(b)) => a == b,
            (
                Self::Rollback {
                    source: a,
                    rollback: ra,
                },
                Self::Rollback {
                    source: b,
                    rollback: rb,
                },
            ) => a == b && ra == rb,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
