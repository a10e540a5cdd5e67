//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so every operation enforces the same rules.

use sea_orm::DbErr;

use crate::{Currency, LedgerError, ResultLedger};

/// Largest page a list operation returns.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Parse a currency code stored in the DB into a strongly typed `Currency`.
///
/// An unknown code in storage is corruption, not bad input.
pub(crate) fn model_currency(value: &str, table: &str, id: i64) -> ResultLedger<Currency> {
    Currency::try_from(value).map_err(|_| {
        LedgerError::Database(DbErr::Type(format!(
            "invalid currency {value:?} in {table} row {id}"
        )))
    })
}

/// Validate a `limit`/`offset` pair coming from a caller.
pub(crate) fn page(limit: u64, offset: u64) -> ResultLedger<(u64, u64)> {
    if limit == 0 || limit > MAX_PAGE_SIZE {
        return Err(LedgerError::InvalidPage(format!(
            "limit must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    Ok((limit, offset))
}
