use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Payment::Table)
                .if_not_exists()
                .col(ColumnDef::new(Payment::ChargeId).string().not_null().primary_key())
                .col(ColumnDef::new(Payment::AccountId).big_integer().not_null())
                .col(ColumnDef::new(Payment::Tier).string_len(20).not_null())
                .col(ColumnDef::new(Payment::Quantity).integer().not_null())
                .col(ColumnDef::new(Payment::Amount).big_integer().not_null())
                .col(ColumnDef::new(Payment::Currency).string_len(10).not_null())
                .col(ColumnDef::new(Payment::InvoicePayload).string().not_null())
                .col(
                    ColumnDef::new(Payment::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_payment_account")
                        .from(Payment::Table, Payment::AccountId)
                        .to(Account::Table, Account::Id)
                        .on_delete(ForeignKeyAction::Restrict)
                )
                .to_owned()
        ).await?;

        // Payment history is read newest-first per account
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_payment_account_created_at")
                .table(Payment::Table)
                .col(Payment::AccountId)
                .col(Payment::CreatedAt)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Payment::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Payment {
    Table,
    ChargeId,
    AccountId,
    Tier,
    Quantity,
    Amount,
    Currency,
    InvoicePayload,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Account {
    Table,
    Id,
}
