use sea_orm::{DatabaseConnection, IsolationLevel};

use crate::{LedgerStore, ResultLedger, SeaOrmStore};

mod accounts;
mod history;
mod transfer;

/// Entry point of the crate.
///
/// `Ledger` holds no mutable state of its own: every operation reads and
/// writes through the store, so it can be cloned freely and shared between
/// tasks.
#[derive(Clone, Debug)]
pub struct Ledger<S = SeaOrmStore> {
    store: S,
}

impl Ledger {
    /// Return a builder for `Ledger`. Help to build the struct.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    fn database(&self) -> &DatabaseConnection {
        self.store.database()
    }
}

impl<S: LedgerStore> Ledger<S> {
    /// Use any [`LedgerStore`] implementation.
    pub fn with_store(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// The builder for `Ledger`
#[derive(Default)]
pub struct LedgerBuilder {
    database: DatabaseConnection,
    isolation_level: Option<IsolationLevel>,
}

impl LedgerBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Isolation level for every unit of work. Defaults to the backend's.
    pub fn isolation_level(mut self, level: IsolationLevel) -> LedgerBuilder {
        self.isolation_level = Some(level);
        self
    }

    /// Construct `Ledger`
    pub async fn build(self) -> ResultLedger<Ledger> {
        let mut store = SeaOrmStore::new(self.database);
        if let Some(level) = self.isolation_level {
            store = store.with_isolation_level(level);
        }
        Ok(Ledger { store })
    }
}
