//! Transfer primitives.
//!
//! A [`Transfer`] is the immutable record of one movement of funds between two
//! accounts. It is always written together with its two [`Entry`] lines and
//! the two balance updates, inside a single unit of work.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Account, Entry, LedgerError, ResultLedger};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: i64,
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Request to move `amount` minor units from one account to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCmd {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
}

impl TransferCmd {
    pub fn new(from_account_id: i64, to_account_id: i64, amount: i64) -> Self {
        Self {
            from_account_id,
            to_account_id,
            amount,
        }
    }

    /// Input checks that need no storage access.
    pub fn validate(&self) -> ResultLedger<()> {
        if self.from_account_id == self.to_account_id {
            return Err(LedgerError::InvalidTransfer(
                "from_account_id and to_account_id must differ".to_string(),
            ));
        }
        if self.amount <= 0 {
            return Err(LedgerError::InvalidTransfer(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Everything a successful transfer produced, with post-transfer balances.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResult {
    pub transfer: Transfer,
    pub from_entry: Entry,
    pub to_entry: Entry,
    pub from_account: Account,
    pub to_account: Account,
}

/// Filter for [`Ledger::list_transfers`](crate::Ledger::list_transfers).
///
/// Unset fields match any account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFilter {
    pub from_account_id: Option<i64>,
    pub to_account_id: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::FromAccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    FromAccount,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::ToAccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    ToAccount,
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn pending(cmd: &TransferCmd) -> Self {
        Self {
            id: ActiveValue::NotSet,
            from_account_id: ActiveValue::Set(cmd.from_account_id),
            to_account_id: ActiveValue::Set(cmd.to_account_id),
            amount: ActiveValue::Set(cmd.amount),
            created_at: ActiveValue::Set(Utc::now()),
        }
    }
}

impl From<Model> for Transfer {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            from_account_id: model.from_account_id,
            to_account_id: model.to_account_id,
            amount: model.amount,
            created_at: model.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_account_is_rejected() {
        assert_eq!(
            TransferCmd::new(4, 4, 100).validate(),
            Err(LedgerError::InvalidTransfer(
                "from_account_id and to_account_id must differ".to_string()
            ))
        );
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        for amount in [0, -5, i64::MIN] {
            let err = TransferCmd::new(1, 2, amount).validate().unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::Validation);
        }
        assert!(TransferCmd::new(1, 2, 1).validate().is_ok());
    }
}
