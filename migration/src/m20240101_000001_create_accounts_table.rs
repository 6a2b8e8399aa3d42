use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Account::Table)
                .if_not_exists()
                .col(ColumnDef::new(Account::Id).big_integer().not_null().primary_key())
                .col(ColumnDef::new(Account::Username).string().null())
                .col(ColumnDef::new(Account::FirstName).string().null())
                .col(ColumnDef::new(Account::LastName).string().null())
                .col(ColumnDef::new(Account::FreeStandardRemaining).integer().not_null().default(5))
                .col(ColumnDef::new(Account::PremiumHighRemaining).integer().not_null().default(0))
                .col(ColumnDef::new(Account::PremiumUltraRemaining).integer().not_null().default(0))
                .col(ColumnDef::new(Account::TotalSpent).big_integer().not_null().default(0))
                .col(
                    ColumnDef::new(Account::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .col(
                    ColumnDef::new(Account::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .to_owned()
        ).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Account::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Account {
    Table,
    Id,
    Username,
    FirstName,
    LastName,
    FreeStandardRemaining,
    PremiumHighRemaining,
    PremiumUltraRemaining,
    TotalSpent,
    CreatedAt,
    UpdatedAt,
}
