pub mod entity;
pub use entity::*;

mod ledger_repository;
pub use ledger_repository::{ AccountProfile, LedgerRepository, NewPayment, PaymentOutcome };

/// Free standard renders granted to every new account.
pub const DEFAULT_FREE_STANDARD: i32 = 5;

/// Currency recorded when a payment notification does not name one.
pub const DEFAULT_CURRENCY: &str = "XTR";

#[cfg(test)]
pub(crate) async fn test_connection() -> sea_orm::DatabaseConnection {
    use migration::MigratorTrait;

    // A single pooled connection keeps the in-memory database alive for the whole test.
    let mut options = sea_orm::ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = sea_orm::Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

/// File-backed database with a real pool, for tests that need statements to race.
#[cfg(test)]
pub(crate) async fn test_pool(max_connections: u32) -> sea_orm::DatabaseConnection {
    use migration::MigratorTrait;

    let path = std::env::temp_dir().join(format!("qr-bot-test-{}.db", uuid::Uuid::new_v4()));
    let mut options = sea_orm::ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    options.max_connections(max_connections).min_connections(max_connections).sqlx_logging(false);

    let db = sea_orm::Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}
