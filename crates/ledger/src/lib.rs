//! Double-entry money transfers between accounts.
//!
//! Every transfer is written as one transfer record, a debit entry on the
//! source, a credit entry on the destination and two balance updates, all
//! inside a single atomic unit of work (see [`run_atomic`]). Balance updates
//! always lock the lower account id first, so transfers running in opposite
//! directions over the same pair never deadlock.
//!
//! ```no_run
//! # async fn demo(db: sea_orm::DatabaseConnection) -> Result<(), ledger::LedgerError> {
//! use ledger::{Currency, Ledger, NewAccount, TransferCmd};
//!
//! let ledger = Ledger::builder().database(db).build().await?;
//! let alice = ledger.create_account(NewAccount::new("alice", Currency::Usd).with_balance(500)).await?;
//! let bob = ledger.create_account(NewAccount::new("bob", Currency::Usd)).await?;
//! let result = ledger.transfer(TransferCmd::new(alice.id, bob.id, 10)).await?;
//! assert_eq!(result.from_account.balance, 490);
//! # Ok(())
//! # }
//! ```

pub use accounts::{Account, NewAccount};
pub use currency::Currency;
pub use entries::Entry;
pub use error::{ErrorKind, LedgerError};
pub use ops::{Ledger, LedgerBuilder};
pub use store::{LedgerScope, LedgerStore, SeaOrmScope, SeaOrmStore};
pub use transfers::{Transfer, TransferCmd, TransferFilter, TransferResult};
pub use unit_of_work::{ScopeFuture, run_atomic, run_atomic_until};
pub use util::MAX_PAGE_SIZE;

mod accounts;
mod currency;
mod entries;
mod error;
mod ops;
mod store;
#[cfg(test)]
mod testing;
mod transfers;
mod unit_of_work;
mod util;

pub type ResultLedger<T> = Result<T, LedgerError>;
