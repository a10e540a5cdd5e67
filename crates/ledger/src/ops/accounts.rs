use sea_orm::{ActiveModelTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr, prelude::*};
use tracing::info;

use crate::{
    Account, Currency, LedgerError, NewAccount, ResultLedger, accounts, store::account_not_found,
    util::page,
};

use super::Ledger;

impl Ledger {
    /// Open a new account. One account per owner and currency.
    pub async fn create_account(&self, new: NewAccount) -> ResultLedger<Account> {
        let owner = new.normalized_owner()?;
        let model = accounts::ActiveModel::pending(owner.clone(), new.currency, new.balance)
            .insert(self.database())
            .await
            .map_err(|err| match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    LedgerError::ExistingKey(format!("{owner} {}", new.currency))
                }
                _ => LedgerError::from(err),
            })?;
        let account = Account::try_from(model)?;
        info!(
            account_id = account.id,
            owner = %account.owner,
            currency = %account.currency,
            "account created"
        );
        Ok(account)
    }

    pub async fn account(&self, account_id: i64) -> ResultLedger<Account> {
        accounts::Entity::find_by_id(account_id)
            .one(self.database())
            .await?
            .ok_or_else(|| account_not_found(account_id))?
            .try_into()
    }

    /// Load the account and check it is denominated in `currency`.
    ///
    /// Transfers do not compare currencies themselves; callers that accept a
    /// currency in their request run this on both sides first.
    pub async fn ensure_currency(
        &self,
        account_id: i64,
        currency: Currency,
    ) -> ResultLedger<Account> {
        let account = self.account(account_id).await?;
        if account.currency != currency {
            return Err(LedgerError::CurrencyMismatch(format!(
                "account {account_id} is in {}, got {currency}",
                account.currency
            )));
        }
        Ok(account)
    }

    /// Accounts of `owner`, ordered by id.
    pub async fn list_accounts(
        &self,
        owner: &str,
        limit: u64,
        offset: u64,
    ) -> ResultLedger<Vec<Account>> {
        let (limit, offset) = page(limit, offset)?;
        accounts::Entity::find()
            .filter(accounts::Column::Owner.eq(owner.trim()))
            .order_by_asc(accounts::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.database())
            .await?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }

    /// Delete an account that has no entries or transfers.
    pub async fn delete_account(&self, account_id: i64) -> ResultLedger<()> {
        let result = accounts::Entity::delete_by_id(account_id)
            .exec(self.database())
            .await
            .map_err(|err| match err.sql_err() {
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => LedgerError::InvalidAccount(
                    format!("account {account_id} has ledger history"),
                ),
                _ => LedgerError::from(err),
            })?;
        if result.rows_affected == 0 {
            return Err(account_not_found(account_id));
        }
        info!(account_id, "account deleted");
        Ok(())
    }
}
