//! Atomic unit of work over a [`LedgerStore`].
//!
//! The body receives the open scope and routes every storage call through
//! it. On success the scope is committed; on error or cancellation it is
//! rolled back, so an aborted attempt leaves nothing behind and the whole
//! operation can be re-run from scratch.

use std::{future::Future, pin::Pin};

use tracing::{debug, error, warn};

use crate::{LedgerError, LedgerScope, LedgerStore, ResultLedger};

/// Future returned by a unit-of-work body, borrowing the scope for `'s`.
pub type ScopeFuture<'s, T> = Pin<Box<dyn Future<Output = ResultLedger<T>> + Send + 's>>;

/// Run `body` inside one atomic scope.
///
/// - body `Ok` → commit; a failed commit is returned as [`LedgerError::Commit`].
/// - body `Err` → rollback and return the body error unchanged; if the
///   rollback fails too, both are returned as [`LedgerError::Rollback`].
pub async fn run_atomic<S, T, F>(store: &S, body: F) -> ResultLedger<T>
where
    S: LedgerStore,
    T: Send,
    F: for<'s> FnOnce(&'s mut S::Scope) -> ScopeFuture<'s, T> + Send,
{
    run_atomic_until(store, body, std::future::pending()).await
}

/// Like [`run_atomic`], but gives up when `cancelled` resolves first.
///
/// On cancellation the body future is dropped, the scope is rolled back and
/// [`LedgerError::Cancelled`] is returned. Cancellation is checked before the
/// body on every poll, so a body cannot commit after the signal fired.
pub async fn run_atomic_until<S, T, F, C>(store: &S, body: F, cancelled: C) -> ResultLedger<T>
where
    S: LedgerStore,
    T: Send,
    F: for<'s> FnOnce(&'s mut S::Scope) -> ScopeFuture<'s, T> + Send,
    C: Future<Output = ()> + Send,
{
    let mut scope = store.begin().await?;

    let outcome = {
        let work = body(&mut scope);
        tokio::select! {
            biased;
            () = cancelled => None,
            result = work => Some(result),
        }
    };

    match outcome {
        Some(Ok(value)) => {
            scope.commit().await.map_err(|err| {
                error!(error = %err, "unit of work commit failed");
                LedgerError::Commit(Box::new(err))
            })?;
            debug!("unit of work committed");
            Ok(value)
        }
        Some(Err(err)) => Err(abort(scope, err).await),
        None => {
            warn!("unit of work cancelled, rolling back");
            Err(abort(scope, LedgerError::Cancelled).await)
        }
    }
}

async fn abort<Sc: LedgerScope>(scope: Sc, err: LedgerError) -> LedgerError {
    debug!(error = %err, "unit of work aborted, rolling back");
    match scope.rollback().await {
        Ok(()) => err,
        Err(rollback) => {
            error!(error = %err, rollback = %rollback, "unit of work rollback failed");
            LedgerError::rollback(err, rollback)
        }
    }
}
