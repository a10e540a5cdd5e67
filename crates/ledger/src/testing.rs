//! In-memory [`LedgerStore`] for unit tests.
//!
//! Every scope works on a private copy of the committed state and publishes
//! it on commit. Calls are recorded in order so tests can assert on the
//! sequence of storage operations.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ConnAcquireErr, DbErr};

use crate::{
    Account, Currency, Entry, LedgerError, LedgerScope, LedgerStore, ResultLedger, Transfer,
    TransferCmd,
    store::{account_not_found, balance_out_of_range, transfer_account_not_found},
};

#[derive(Clone, Debug, Default)]
pub(crate) struct State {
    pub accounts: BTreeMap<i64, Account>,
    pub entries: Vec<Entry>,
    pub transfers: Vec<Transfer>,
    next_id: i64,
}

impl State {
    pub fn balance(&self, account_id: i64) -> i64 {
        self.accounts[&account_id].balance
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Fault {
    Begin,
    Commit,
    Rollback,
    AddBalance { account_id: i64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    GetAccount(i64),
    CreateTransfer(TransferCmd),
    CreateEntry { account_id: i64, amount: i64 },
    AddBalance { account_id: i64, delta: i64 },
}

#[derive(Default)]
struct Shared {
    committed: State,
    calls: Vec<Call>,
    commits: usize,
    rollbacks: usize,
}

#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    shared: Arc<Mutex<Shared>>,
    faults: Vec<Fault>,
}

impl MemoryStore {
    pub fn with_accounts(accounts: &[(i64, i64)]) -> Self {
        let mut state = State::default();
        for &(id, balance) in accounts {
            state.accounts.insert(
                id,
                Account {
                    id,
                    owner: format!("owner-{id}"),
                    balance,
                    currency: Currency::Usd,
                    created_at: Utc::now(),
                },
            );
        }
        let store = Self::default();
        store.lock().committed = state;
        store
    }

    pub fn fault(mut self, fault: Fault) -> Self {
        self.faults.push(fault);
        self
    }

    pub fn committed(&self) -> State {
        self.lock().committed.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn commits(&self) -> usize {
        self.lock().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.lock().rollbacks
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap()
    }
}

fn injected(what: &str) -> LedgerError {
    LedgerError::Database(DbErr::Custom(format!("injected {what} failure")))
}

#[async_trait]
impl LedgerStore for MemoryStore {
    type Scope = MemoryScope;

    async fn begin(&self) -> ResultLedger<MemoryScope> {
        if self.faults.contains(&Fault::Begin) {
            return Err(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout).into());
        }
        Ok(MemoryScope {
            shared: Arc::clone(&self.shared),
            working: self.committed(),
            faults: self.faults.clone(),
        })
    }
}

pub(crate) struct MemoryScope {
    shared: Arc<Mutex<Shared>>,
    working: State,
    faults: Vec<Fault>,
}

impl MemoryScope {
    fn record(&self, call: Call) {
        self.shared.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl LedgerScope for MemoryScope {
    async fn get_account(&mut self, account_id: i64) -> ResultLedger<Account> {
        self.record(Call::GetAccount(account_id));
        self.working
            .accounts
            .get(&account_id)
            .cloned()
            .ok_or_else(|| account_not_found(account_id))
    }

    async fn create_transfer(&mut self, cmd: &TransferCmd) -> ResultLedger<Transfer> {
        self.record(Call::CreateTransfer(*cmd));
        let accounts = &self.working.accounts;
        if !accounts.contains_key(&cmd.from_account_id) || !accounts.contains_key(&cmd.to_account_id)
        {
            return Err(transfer_account_not_found(cmd));
        }
        let transfer = Transfer {
            id: self.working.next_id(),
            from_account_id: cmd.from_account_id,
            to_account_id: cmd.to_account_id,
            amount: cmd.amount,
            created_at: Utc::now(),
        };
        self.working.transfers.push(transfer.clone());
        Ok(transfer)
    }

    async fn create_entry(&mut self, account_id: i64, amount: i64) -> ResultLedger<Entry> {
        self.record(Call::CreateEntry { account_id, amount });
        if !self.working.accounts.contains_key(&account_id) {
            return Err(account_not_found(account_id));
        }
        let entry = Entry {
            id: self.working.next_id(),
            account_id,
            amount,
            created_at: Utc::now(),
        };
        self.working.entries.push(entry.clone());
        Ok(entry)
    }

    async fn add_account_balance(&mut self, account_id: i64, delta: i64) -> ResultLedger<Account> {
        self.record(Call::AddBalance { account_id, delta });
        if self.faults.contains(&Fault::AddBalance { account_id }) {
            return Err(injected("balance update"));
        }
        let account = self
            .working
            .accounts
            .get_mut(&account_id)
            .ok_or_else(|| account_not_found(account_id))?;
        let balance = account
            .balance
            .checked_add(delta)
            .ok_or_else(|| balance_out_of_range(account, delta))?;
        account.balance = balance;
        Ok(account.clone())
    }

    async fn commit(self) -> ResultLedger<()> {
        let mut shared = self.shared.lock().unwrap();
        if self.faults.contains(&Fault::Commit) {
            return Err(injected("commit"));
        }
        shared.committed = self.working;
        shared.commits += 1;
        Ok(())
    }

    async fn rollback(self) -> ResultLedger<()> {
        let mut shared = self.shared.lock().unwrap();
        if self.faults.contains(&Fault::Rollback) {
            return Err(injected("rollback"));
        }
        shared.rollbacks += 1;
        Ok(())
    }
}
