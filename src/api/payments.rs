use axum::{ extract::{ Path, Query, State }, Json };
use serde::{ Deserialize, Serialize };

use crate::db::{ payment, NewPayment, PaymentOutcome, DEFAULT_CURRENCY };
use crate::enums::{ PaymentStatus, QualityTier };
use crate::error::Result;

use super::accounts::AccountResponse;
use super::AppState;

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

#[derive(Deserialize)]
pub struct PaymentBody {
    pub charge_id: String,
    pub user_id: i64,
    pub tier: QualityTier,
    pub quantity: u32,
    pub amount: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub invoice_payload: Option<String>,
}

#[derive(Serialize)]
pub struct RecordPaymentResponse {
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountResponse>,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<u64>,
}

#[derive(Serialize)]
pub struct PaymentResponse {
    pub charge_id: String,
    pub tier: String,
    pub quantity: i32,
    pub amount: i64,
    pub currency: String,
    pub invoice_payload: String,
    pub created_at: String,
}

impl From<payment::Model> for PaymentResponse {
    fn from(payment: payment::Model) -> Self {
        Self {
            charge_id: payment.charge_id,
            tier: payment.tier,
            quantity: payment.quantity,
            amount: payment.amount,
            currency: payment.currency,
            invoice_payload: payment.invoice_payload,
            created_at: payment.created_at.to_rfc3339(),
        }
    }
}

pub async fn record_payment(
    State(state): State<AppState>,
    Json(body): Json<PaymentBody>
) -> Result<Json<RecordPaymentResponse>> {
    let invoice_payload = body.invoice_payload.unwrap_or_else(||
        format!("{}_{}", body.tier, body.quantity)
    );

    let outcome = state.ledger_service.record_payment(NewPayment {
        charge_id: body.charge_id,
        user_id: body.user_id,
        tier: body.tier,
        quantity: body.quantity,
        amount: body.amount,
        currency: body.currency,
        invoice_payload,
    }).await?;

    let response = match outcome {
        PaymentOutcome::Recorded(account) =>
            RecordPaymentResponse {
                status: PaymentStatus::Recorded,
                account: Some(account.into()),
            },
        PaymentOutcome::AlreadyCredited =>
            RecordPaymentResponse {
                status: PaymentStatus::AlreadyCredited,
                account: None,
            },
    };

    Ok(Json(response))
}

pub async fn list_payments(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<HistoryQuery>
) -> Result<Json<Vec<PaymentResponse>>> {
    let payments = state.ledger_service.recent_payments(user_id, query.limit).await?;

    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}
