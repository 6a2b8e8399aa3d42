use chrono::Utc;
use sea_orm::sea_query::{ Expr, OnConflict };
use sea_orm::{
    ColumnTrait,
    ConnectionTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
    QueryOrder,
    QuerySelect,
    Set,
    SqlErr,
    TransactionTrait,
};
use serde::Deserialize;

use crate::db::entity::{ account, payment, Account, Payment };
use crate::db::DEFAULT_FREE_STANDARD;
use crate::enums::QualityTier;
use crate::error::{ AppError, Result };

/// Display fields refreshed on every contact.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountProfile {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A confirmed payment as delivered by the payment provider.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub charge_id: String,
    pub user_id: i64,
    pub tier: QualityTier,
    pub quantity: u32,
    pub amount: u64,
    pub currency: String,
    pub invoice_payload: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    Recorded(account::Model),
    AlreadyCredited,
}

fn balance_column(tier: QualityTier) -> account::Column {
    match tier {
        QualityTier::Standard => account::Column::FreeStandardRemaining,
        QualityTier::High => account::Column::PremiumHighRemaining,
        QualityTier::Ultra => account::Column::PremiumUltraRemaining,
    }
}

pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert the account with default quotas, or refresh its profile if it exists.
    pub async fn upsert_account(
        &self,
        user_id: i64,
        profile: AccountProfile
    ) -> Result<account::Model> {
        let now = Utc::now();
        let model = account::ActiveModel {
            id: Set(user_id),
            username: Set(profile.username),
            first_name: Set(profile.first_name),
            last_name: Set(profile.last_name),
            free_standard_remaining: Set(DEFAULT_FREE_STANDARD),
            premium_high_remaining: Set(0),
            premium_ultra_remaining: Set(0),
            total_spent: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Account::insert(model)
            .on_conflict(
                OnConflict::column(account::Column::Id)
                    .update_columns([
                        account::Column::Username,
                        account::Column::FirstName,
                        account::Column::LastName,
                        account::Column::UpdatedAt,
                    ])
                    .to_owned()
            )
            .exec_without_returning(&self.db).await?;

        self.find_account(user_id).await
    }

    pub async fn find_account(&self, user_id: i64) -> Result<account::Model> {
        Account::find_by_id(user_id).one(&self.db).await?.ok_or(AppError::AccountNotFound)
    }

    /// Take one unit of `tier`. The guard and the decrement are a single statement.
    pub async fn decrement_if_positive(&self, user_id: i64, tier: QualityTier) -> Result<bool> {
        let column = balance_column(tier);

        let result = Account::update_many()
            .col_expr(column, Expr::col(column).sub(1))
            .col_expr(account::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(account::Column::Id.eq(user_id))
            .filter(column.gt(0))
            .exec(&self.db).await?;

        Ok(result.rows_affected == 1)
    }

    /// Add `quantity` units of `tier`. Returns false when the account does not exist.
    pub async fn increment(&self, user_id: i64, tier: QualityTier, quantity: u32) -> Result<bool> {
        Self::add_balance(&self.db, user_id, tier, to_i32(quantity)?, 0).await
    }

    async fn add_balance<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        tier: QualityTier,
        quantity: i32,
        spent: i64
    ) -> Result<bool> {
        let column = balance_column(tier);

        let result = Account::update_many()
            .col_expr(column, Expr::col(column).add(quantity))
            .col_expr(account::Column::TotalSpent, Expr::col(account::Column::TotalSpent).add(spent))
            .col_expr(account::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(account::Column::Id.eq(user_id))
            .filter(column.lte(i32::MAX - quantity))
            .filter(account::Column::TotalSpent.lte(i64::MAX - spent))
            .exec(conn).await?;

        if result.rows_affected == 1 {
            return Ok(true);
        }

        // Nothing matched: either the account is missing or the counters are full.
        if Account::find_by_id(user_id).one(conn).await?.is_some() {
            return Err(
                AppError::InvalidInput(format!("{} balance of user {} would overflow", tier, user_id))
            );
        }

        Ok(false)
    }

    /// Insert the payment row and credit the account in one transaction.
    ///
    /// A charge id that is already stored leaves everything untouched and fails with
    /// `DuplicateChargeId`.
    pub async fn insert_payment_and_credit(&self, new_payment: NewPayment) -> Result<PaymentOutcome> {
        let quantity = to_i32(new_payment.quantity)?;
        let amount = i64
            ::try_from(new_payment.amount)
            .map_err(|_| AppError::InvalidInput("Payment amount is too large".to_string()))?;

        let txn = self.db.begin().await?;

        let existing = Payment::find_by_id(new_payment.charge_id.clone()).one(&txn).await?;
        if existing.is_some() {
            txn.rollback().await?;
            return Err(AppError::DuplicateChargeId(new_payment.charge_id));
        }

        let model = payment::ActiveModel {
            charge_id: Set(new_payment.charge_id.clone()),
            account_id: Set(new_payment.user_id),
            tier: Set(new_payment.tier.as_str().to_string()),
            quantity: Set(quantity),
            amount: Set(amount),
            currency: Set(new_payment.currency),
            invoice_payload: Set(new_payment.invoice_payload),
            created_at: Set(Utc::now()),
        };

        if let Err(e) = Payment::insert(model).exec_without_returning(&txn).await {
            return match e.sql_err() {
                // A concurrent delivery of the same charge won the insert.
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    txn.rollback().await?;
                    Err(AppError::DuplicateChargeId(new_payment.charge_id))
                }
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                    txn.rollback().await?;
                    Err(AppError::AccountNotFound)
                }
                _ => Err(AppError::Database(e)),
            };
        }

        let credited = Self::add_balance(
            &txn,
            new_payment.user_id,
            new_payment.tier,
            quantity,
            amount
        ).await?;
        if !credited {
            txn.rollback().await?;
            return Err(AppError::AccountNotFound);
        }

        txn.commit().await?;

        let account = self.find_account(new_payment.user_id).await?;
        Ok(PaymentOutcome::Recorded(account))
    }

    pub async fn recent_payments(&self, user_id: i64, limit: u64) -> Result<Vec<payment::Model>> {
        let payments = Payment::find()
            .filter(payment::Column::AccountId.eq(user_id))
            .order_by_desc(payment::Column::CreatedAt)
            .limit(limit)
            .all(&self.db).await?;

        Ok(payments)
    }
}

fn to_i32(quantity: u32) -> Result<i32> {
    i32::try_from(quantity).map_err(|_| AppError::InvalidInput("Quantity is too large".to_string()))
}
