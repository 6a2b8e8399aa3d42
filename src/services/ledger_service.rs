use std::sync::Arc;

use crate::db::entity::{ account, payment };
use crate::db::{ AccountProfile, LedgerRepository, NewPayment, PaymentOutcome };
use crate::enums::QualityTier;
use crate::error::{ AppError, Result };

/// Payments returned when the caller does not ask for a specific count.
pub const DEFAULT_HISTORY_LIMIT: u64 = 10;
const MAX_HISTORY_LIMIT: u64 = 100;

/// Entitlement ledger: per-user render quotas and purchase crediting.
pub struct LedgerService {
    repository: Arc<LedgerRepository>,
}

impl LedgerService {
    pub fn new(repository: Arc<LedgerRepository>) -> Self {
        Self { repository }
    }

    /// Return the account, creating it with the free quota on first contact.
    pub async fn get_or_create(
        &self,
        user_id: i64,
        profile: AccountProfile
    ) -> Result<account::Model> {
        self.repository.upsert_account(user_id, profile).await
    }

    pub async fn get_account(&self, user_id: i64) -> Result<account::Model> {
        self.repository.find_account(user_id).await
    }

    /// Spend one unit of `tier`. False means the balance was already zero.
    pub async fn consume(&self, user_id: i64, tier: QualityTier) -> Result<bool> {
        let consumed = self.repository.decrement_if_positive(user_id, tier).await?;

        if consumed {
            tracing::debug!("User {} consumed one {} render", user_id, tier);
        } else {
            tracing::debug!("User {} has no {} renders left", user_id, tier);
        }

        Ok(consumed)
    }

    /// Add `quantity` units of `tier` without a payment record. Used for refunds and grants.
    pub async fn credit(&self, user_id: i64, tier: QualityTier, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(AppError::InvalidInput("Quantity must be greater than zero".to_string()));
        }

        if !self.repository.increment(user_id, tier, quantity).await? {
            return Err(AppError::AccountNotFound);
        }

        tracing::info!("Credited {} {} renders to user {}", quantity, tier, user_id);
        Ok(())
    }

    /// Store a confirmed payment and credit its tier, at most once per charge id.
    pub async fn record_payment(&self, payment: NewPayment) -> Result<PaymentOutcome> {
        if !payment.tier.is_premium() {
            return Err(
                AppError::InvalidInput(format!("{} renders cannot be purchased", payment.tier))
            );
        }
        if payment.quantity == 0 {
            return Err(AppError::InvalidInput("Quantity must be greater than zero".to_string()));
        }
        if payment.charge_id.trim().is_empty() {
            return Err(AppError::InvalidInput("charge_id must not be empty".to_string()));
        }

        let charge_id = payment.charge_id.clone();
        let (user_id, tier, quantity) = (payment.user_id, payment.tier, payment.quantity);

        match self.repository.insert_payment_and_credit(payment).await {
            Ok(outcome) => {
                tracing::info!(
                    "Payment {} credited {} {} renders to user {}",
                    charge_id,
                    quantity,
                    tier,
                    user_id
                );
                Ok(outcome)
            }
            Err(AppError::DuplicateChargeId(_)) => {
                tracing::info!("Payment {} was already credited, ignoring", charge_id);
                Ok(PaymentOutcome::AlreadyCredited)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn recent_payments(
        &self,
        user_id: i64,
        limit: Option<u64>
    ) -> Result<Vec<payment::Model>> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, MAX_HISTORY_LIMIT);
        self.repository.recent_payments(user_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;

    async fn setup() -> LedgerService {
        LedgerService::new(Arc::new(LedgerRepository::new(test_connection().await)))
    }

    fn payment(charge_id: &str, tier: QualityTier, quantity: u32) -> NewPayment {
        NewPayment {
            charge_id: charge_id.to_string(),
            user_id: 10,
            tier,
            quantity,
            amount: 100,
            currency: "XTR".to_string(),
            invoice_payload: format!("{}_pack", tier),
        }
    }

    #[tokio::test]
    async fn test_sixth_free_render_is_refused() {
        let ledger = setup().await;
        ledger.get_or_create(10, AccountProfile::default()).await.unwrap();

        for _ in 0..5 {
            assert!(ledger.consume(10, QualityTier::Standard).await.unwrap());
        }
        assert!(!ledger.consume(10, QualityTier::Standard).await.unwrap());
    }

    #[tokio::test]
    async fn test_consume_then_credit_restores_balance() {
        let ledger = setup().await;
        let before = ledger.get_or_create(10, AccountProfile::default()).await.unwrap();

        assert!(ledger.consume(10, QualityTier::Standard).await.unwrap());
        ledger.credit(10, QualityTier::Standard, 1).await.unwrap();

        let after = ledger.get_account(10).await.unwrap();
        assert_eq!(after.free_standard_remaining, before.free_standard_remaining);
    }

    #[tokio::test]
    async fn test_consume_at_zero_does_not_decrement() {
        let ledger = setup().await;
        ledger.get_or_create(10, AccountProfile::default()).await.unwrap();

        assert!(!ledger.consume(10, QualityTier::High).await.unwrap());
        assert_eq!(ledger.get_account(10).await.unwrap().premium_high_remaining, 0);
    }

    #[tokio::test]
    async fn test_duplicate_payment_credits_once() {
        let ledger = setup().await;
        ledger.get_or_create(10, AccountProfile::default()).await.unwrap();

        let first = ledger.record_payment(payment("ch_dup", QualityTier::Ultra, 2)).await.unwrap();
        let again = ledger.record_payment(payment("ch_dup", QualityTier::Ultra, 2)).await.unwrap();

        assert!(matches!(first, PaymentOutcome::Recorded(_)));
        assert_eq!(again, PaymentOutcome::AlreadyCredited);
        assert_eq!(ledger.get_account(10).await.unwrap().premium_ultra_remaining, 2);
    }

    #[tokio::test]
    async fn test_standard_cannot_be_purchased() {
        let ledger = setup().await;
        ledger.get_or_create(10, AccountProfile::default()).await.unwrap();

        let result = ledger.record_payment(payment("ch_std", QualityTier::Standard, 1)).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let ledger = setup().await;
        ledger.get_or_create(10, AccountProfile::default()).await.unwrap();

        assert!(ledger.credit(10, QualityTier::High, 0).await.is_err());
        assert!(ledger.record_payment(payment("ch_zero", QualityTier::High, 0)).await.is_err());
    }

    #[tokio::test]
    async fn test_credit_unknown_account() {
        let ledger = setup().await;
        let result = ledger.credit(12345, QualityTier::High, 1).await;

        assert!(matches!(result, Err(AppError::AccountNotFound)));
    }

    #[tokio::test]
    async fn test_history_defaults_to_ten() {
        let ledger = setup().await;
        ledger.get_or_create(10, AccountProfile::default()).await.unwrap();

        for i in 0..12 {
            ledger
                .record_payment(payment(&format!("ch_{}", i), QualityTier::High, 1)).await
                .unwrap();
        }

        assert_eq!(ledger.recent_payments(10, None).await.unwrap().len(), 10);
        assert_eq!(ledger.recent_payments(10, Some(3)).await.unwrap().len(), 3);
        assert_eq!(ledger.get_account(10).await.unwrap().total_spent, 1200);
    }
}
