//! The module contains the `Entry` type: one signed ledger line.
//!
//! Amounts are signed **minor units**:
//! - negative values are debits
//! - positive values are credits
//!
//! Entries are append-only. Nothing in the crate updates or deletes them.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub account_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    pub fn is_debit(&self) -> bool {
        self.amount < 0
    }

    pub fn is_credit(&self) -> bool {
        self.amount > 0
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub account_id: i64,
    pub amount: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn pending(account_id: i64, amount: i64) -> Self {
        Self {
            id: ActiveValue::NotSet,
            account_id: ActiveValue::Set(account_id),
            amount: ActiveValue::Set(amount),
            created_at: ActiveValue::Set(Utc::now()),
        }
    }
}

impl From<Model> for Entry {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            account_id: model.account_id,
            amount: model.amount,
            created_at: model.created_at,
        }
    }
}
