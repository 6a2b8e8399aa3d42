pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_accounts_table;
mod m20240102_000001_create_payments_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_accounts_table::Migration),
            Box::new(m20240102_000001_create_payments_table::Migration)
        ]
    }
}
