use sea_orm_migration::prelude::*;

use super::m20261001_000000_init::Accounts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One account per owner and currency.
        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-owner-currency-unique")
                    .table(Accounts::Table)
                    .col(Accounts::Owner)
                    .col(Accounts::Currency)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx-accounts-owner-currency-unique")
                    .table(Accounts::Table)
                    .to_owned(),
            )
            .await
    }
}
