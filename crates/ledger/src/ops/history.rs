//! Read-only access to entries and transfer records.

use sea_orm::{Condition, QueryFilter, QueryOrder, QuerySelect, prelude::*};

use crate::{
    Entry, LedgerError, ResultLedger, Transfer, TransferFilter, entries, transfers, util::page,
};

use super::Ledger;

impl Ledger {
    pub async fn entry(&self, entry_id: i64) -> ResultLedger<Entry> {
        entries::Entity::find_by_id(entry_id)
            .one(self.database())
            .await?
            .map(Entry::from)
            .ok_or_else(|| LedgerError::KeyNotFound(format!("entry {entry_id}")))
    }

    /// Entries of one account, oldest first.
    pub async fn list_entries(
        &self,
        account_id: i64,
        limit: u64,
        offset: u64,
    ) -> ResultLedger<Vec<Entry>> {
        let (limit, offset) = page(limit, offset)?;
        let models = entries::Entity::find()
            .filter(entries::Column::AccountId.eq(account_id))
            .order_by_asc(entries::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.database())
            .await?;
        Ok(models.into_iter().map(Entry::from).collect())
    }

    pub async fn transfer_record(&self, transfer_id: i64) -> ResultLedger<Transfer> {
        transfers::Entity::find_by_id(transfer_id)
            .one(self.database())
            .await?
            .map(Transfer::from)
            .ok_or_else(|| LedgerError::KeyNotFound(format!("transfer {transfer_id}")))
    }

    /// Transfer records matching `filter`, oldest first.
    pub async fn list_transfers(
        &self,
        filter: TransferFilter,
        limit: u64,
        offset: u64,
    ) -> ResultLedger<Vec<Transfer>> {
        let (limit, offset) = page(limit, offset)?;
        let mut condition = Condition::all();
        if let Some(from) = filter.from_account_id {
            condition = condition.add(transfers::Column::FromAccountId.eq(from));
        }
        if let Some(to) = filter.to_account_id {
            condition = condition.add(transfers::Column::ToAccountId.eq(to));
        }
        let models = transfers::Entity::find()
            .filter(condition)
            .order_by_asc(transfers::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.database())
            .await?;
        Ok(models.into_iter().map(Transfer::from).collect())
    }
}
