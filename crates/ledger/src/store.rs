//! Storage capability used by the transfer path.
//!
//! A [`LedgerStore`] opens scopes; a [`LedgerScope`] is one open database
//! transaction and is the only handle through which a unit of work touches
//! storage. Nothing in the transfer path reaches for a shared connection.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, IsolationLevel,
    QueryFilter, SqlErr, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    Account, Entry, LedgerError, ResultLedger, Transfer, TransferCmd, accounts, entries, transfers,
};

/// Opens transactional scopes over the ledger tables.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    type Scope: LedgerScope;

    /// Begin a new isolated scope. Dropping the scope without committing
    /// discards its writes.
    async fn begin(&self) -> ResultLedger<Self::Scope>;
}

/// One open transaction.
#[async_trait]
pub trait LedgerScope: Send {
    async fn get_account(&mut self, account_id: i64) -> ResultLedger<Account>;

    /// Fails with [`LedgerError::KeyNotFound`] when either account is missing.
    async fn create_transfer(&mut self, cmd: &TransferCmd) -> ResultLedger<Transfer>;

    async fn create_entry(&mut self, account_id: i64, amount: i64) -> ResultLedger<Entry>;

    /// Add `delta` to the account balance and return the updated row.
    ///
    /// The write takes the row lock, held until the scope ends. A result
    /// outside the `i64` range is refused with
    /// [`LedgerError::InvalidTransfer`] and nothing is written.
    async fn add_account_balance(&mut self, account_id: i64, delta: i64) -> ResultLedger<Account>;

    async fn commit(self) -> ResultLedger<()>;

    async fn rollback(self) -> ResultLedger<()>;
}

pub(crate) fn account_not_found(account_id: i64) -> LedgerError {
    LedgerError::KeyNotFound(format!("account {account_id}"))
}

/// A transfer row references both accounts; the foreign key does not say
/// which one is missing.
pub(crate) fn transfer_account_not_found(cmd: &TransferCmd) -> LedgerError {
    LedgerError::KeyNotFound(format!(
        "account {} or {}",
        cmd.from_account_id, cmd.to_account_id
    ))
}

pub(crate) fn balance_out_of_range(account: &Account, delta: i64) -> LedgerError {
    LedgerError::InvalidTransfer(format!(
        "balance of account {} would leave the i64 range ({} {delta:+})",
        account.id, account.balance
    ))
}

fn missing_account_or(err: DbErr, not_found: impl FnOnce() -> LedgerError) -> LedgerError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => not_found(),
        _ => LedgerError::from(err),
    }
}

/// [`LedgerStore`] backed by a sea-orm connection pool.
#[derive(Clone, Debug)]
pub struct SeaOrmStore {
    database: DatabaseConnection,
    isolation_level: Option<IsolationLevel>,
}

impl SeaOrmStore {
    /// Scopes use the backend's default isolation level, which is Read
    /// Committed or stronger on every supported backend.
    pub fn new(database: DatabaseConnection) -> Self {
        Self {
            database,
            isolation_level: None,
        }
    }

    pub fn with_isolation_level(mut self, level: IsolationLevel) -> Self {
        self.isolation_level = Some(level);
        self
    }

    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }
}

#[async_trait]
impl LedgerStore for SeaOrmStore {
    type Scope = SeaOrmScope;

    async fn begin(&self) -> ResultLedger<SeaOrmScope> {
        let tx = self
            .database
            .begin_with_config(self.isolation_level.clone(), None)
            .await?;
        Ok(SeaOrmScope { tx })
    }
}

/// [`LedgerScope`] over a sea-orm [`DatabaseTransaction`].
///
/// sea-orm rolls the transaction back if the scope is dropped unfinished.
pub struct SeaOrmScope {
    tx: DatabaseTransaction,
}

#[async_trait]
impl LedgerScope for SeaOrmScope {
    async fn get_account(&mut self, account_id: i64) -> ResultLedger<Account> {
        accounts::Entity::find_by_id(account_id)
            .one(&self.tx)
            .await?
            .ok_or_else(|| account_not_found(account_id))?
            .try_into()
    }

    async fn create_transfer(&mut self, cmd: &TransferCmd) -> ResultLedger<Transfer> {
        let model = transfers::ActiveModel::pending(cmd)
            .insert(&self.tx)
            .await
            .map_err(|err| missing_account_or(err, || transfer_account_not_found(cmd)))?;
        Ok(model.into())
    }

    async fn create_entry(&mut self, account_id: i64, amount: i64) -> ResultLedger<Entry> {
        let model = entries::ActiveModel::pending(account_id, amount)
            .insert(&self.tx)
            .await
            .map_err(|err| missing_account_or(err, || account_not_found(account_id)))?;
        Ok(model.into())
    }

    async fn add_account_balance(&mut self, account_id: i64, delta: i64) -> ResultLedger<Account> {
        // Single UPDATE so the read-modify-write happens under the row lock.
        // The bound keeps `balance + delta` inside i64 without computing it.
        let in_range = if delta >= 0 {
            accounts::Column::Balance.lte(i64::MAX - delta)
        } else {
            accounts::Column::Balance.gte(i64::MIN - delta)
        };
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).add(delta),
            )
            .filter(accounts::Column::Id.eq(account_id))
            .filter(in_range)
            .exec(&self.tx)
            .await?;
        if result.rows_affected == 0 {
            // Either the row is missing or the guard rejected it.
            let account = self.get_account(account_id).await?;
            return Err(balance_out_of_range(&account, delta));
        }
        self.get_account(account_id).await
    }

    async fn commit(self) -> ResultLedger<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> ResultLedger<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
