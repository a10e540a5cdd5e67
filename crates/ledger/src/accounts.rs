//! The module contains the `Account` type and its table.
//!
//! Accounts are created and owned outside of the transfer path. The
//! coordinator only reads them and adjusts `balance` under the row lock taken
//! by its ordered update.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Currency, LedgerError, ResultLedger, util::model_currency};

/// A balance-holding account, denominated in one currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub owner: String,
    /// Balance in minor units. Not clamped: overdraft policy is the caller's.
    pub balance: i64,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
}

/// Input for [`Ledger::create_account`](crate::Ledger::create_account).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub owner: String,
    pub currency: Currency,
    #[serde(default)]
    pub balance: i64,
}

impl NewAccount {
    pub fn new(owner: impl Into<String>, currency: Currency) -> Self {
        Self {
            owner: owner.into(),
            currency,
            balance: 0,
        }
    }

    /// Opening balance in minor units.
    pub fn with_balance(mut self, balance: i64) -> Self {
        self.balance = balance;
        self
    }

    /// Trimmed owner, rejected when empty.
    pub(crate) fn normalized_owner(&self) -> ResultLedger<String> {
        let owner = self.owner.trim();
        if owner.is_empty() {
            return Err(LedgerError::InvalidAccount(
                "owner must not be empty".to_string(),
            ));
        }
        Ok(owner.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner: String,
    pub balance: i64,
    pub currency: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::entries::Entity")]
    Entries,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn pending(owner: String, currency: Currency, balance: i64) -> Self {
        Self {
            id: ActiveValue::NotSet,
            owner: ActiveValue::Set(owner),
            balance: ActiveValue::Set(balance),
            currency: ActiveValue::Set(currency.code().to_string()),
            created_at: ActiveValue::Set(Utc::now()),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            currency: model_currency(&model.currency, "accounts", model.id)?,
            id: model.id,
            owner: model.owner,
            balance: model.balance,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_owner_is_rejected() {
        let account = NewAccount::new("   ", Currency::Usd);
        assert_eq!(
            account.normalized_owner(),
            Err(LedgerError::InvalidAccount(
                "owner must not be empty".to_string()
            ))
        );
    }

    #[test]
    fn model_with_unknown_currency_is_fatal() {
        let model = Model {
            id: 3,
            owner: "alice".to_string(),
            balance: 0,
            currency: "XXX".to_string(),
            created_at: Utc::now(),
        };
        let err = Account::try_from(model).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Fatal);
    }
}
