//! The transfer coordinator.
//!
//! A transfer is `Validated → InProgress → Committed | Aborted`. Validation
//! happens before any scope is opened; everything else runs inside a single
//! unit of work, so the in-progress state is never visible to other readers.

use std::future::Future;

use tracing::{debug, info, warn};

use crate::{
    LedgerScope, LedgerStore, ResultLedger, TransferCmd, TransferResult,
    unit_of_work::run_atomic_until,
};

use super::Ledger;

impl<S: LedgerStore> Ledger<S> {
    /// Move `cmd.amount` minor units from `cmd.from_account_id` to
    /// `cmd.to_account_id`.
    ///
    /// Writes one transfer row, a debit and a credit entry, and both balance
    /// updates, all or nothing. Concurrent transfers over the same accounts may
    /// wait on each other's row locks; they never deadlock, because balances
    /// are always updated lower account id first.
    ///
    /// The source balance is not checked: overdraft policy belongs to the
    /// caller.
    pub async fn transfer(&self, cmd: TransferCmd) -> ResultLedger<TransferResult> {
        self.transfer_until(cmd, std::future::pending()).await
    }

    /// [`transfer`](Self::transfer) that rolls back and returns
    /// [`LedgerError::Cancelled`](crate::LedgerError::Cancelled) if
    /// `cancelled` resolves before the unit of work finishes.
    pub async fn transfer_until<C>(
        &self,
        cmd: TransferCmd,
        cancelled: C,
    ) -> ResultLedger<TransferResult>
    where
        C: Future<Output = ()> + Send,
    {
        if let Err(err) = cmd.validate() {
            debug!(
                from = cmd.from_account_id,
                to = cmd.to_account_id,
                amount = cmd.amount,
                error = %err,
                "transfer rejected"
            );
            return Err(err);
        }

        let result = run_atomic_until(
            &self.store,
            move |scope| Box::pin(apply_transfer(scope, cmd)),
            cancelled,
        )
        .await;

        match &result {
            Ok(done) => info!(
                transfer_id = done.transfer.id,
                from = cmd.from_account_id,
                to = cmd.to_account_id,
                amount = cmd.amount,
                "transfer committed"
            ),
            Err(err) => warn!(
                from = cmd.from_account_id,
                to = cmd.to_account_id,
                amount = cmd.amount,
                kind = ?err.kind(),
                error = %err,
                "transfer aborted"
            ),
        }
        result
    }
}

/// Balance deltas of `cmd` as `(account_id, delta)`, lower account id first.
///
/// Every transfer touching the same two accounts takes their row locks in the
/// same order, whatever its direction.
pub(crate) fn ordered_deltas(cmd: &TransferCmd) -> [(i64, i64); 2] {
    let debit = (cmd.from_account_id, -cmd.amount);
    let credit = (cmd.to_account_id, cmd.amount);
    if cmd.from_account_id < cmd.to_account_id {
        [debit, credit]
    } else {
        [credit, debit]
    }
}

async fn apply_transfer<Sc: LedgerScope>(
    scope: &mut Sc,
    cmd: TransferCmd,
) -> ResultLedger<TransferResult> {
    // The insert is the first statement: a read before the first write would
    // make SQLite scopes fail with SQLITE_BUSY instead of waiting for the lock.
    // Missing accounts surface here as KeyNotFound.
    let transfer = scope.create_transfer(&cmd).await?;
    let from_entry = scope.create_entry(cmd.from_account_id, -cmd.amount).await?;
    let to_entry = scope.create_entry(cmd.to_account_id, cmd.amount).await?;

    let [(first_id, first_delta), (second_id, second_delta)] = ordered_deltas(&cmd);
    let first = scope.add_account_balance(first_id, first_delta).await?;
    let second = scope.add_account_balance(second_id, second_delta).await?;
    let (from_account, to_account) = if first.id == cmd.from_account_id {
        (first, second)
    } else {
        (second, first)
    };

    Ok(TransferResult {
        transfer,
        from_entry,
        to_entry,
        from_account,
        to_account,
    })
}
