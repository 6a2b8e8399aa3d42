use axum::{ extract::{ Path, State }, response::Response, Json };
use serde::{ Deserialize, Serialize };

use crate::db::{ account, AccountProfile };
use crate::enums::QualityTier;
use crate::error::Result;

use super::render::RenderBody;
use super::{ png_response, AppState };

#[derive(Deserialize)]
pub struct ConsumeRequest {
    pub tier: QualityTier,
}

#[derive(Serialize)]
pub struct AccountResponse {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub free_standard_remaining: i32,
    pub premium_high_remaining: i32,
    pub premium_ultra_remaining: i32,
    pub total_spent: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<account::Model> for AccountResponse {
    fn from(account: account::Model) -> Self {
        Self {
            id: account.id,
            username: account.username,
            first_name: account.first_name,
            last_name: account.last_name,
            free_standard_remaining: account.free_standard_remaining,
            premium_high_remaining: account.premium_high_remaining,
            premium_ultra_remaining: account.premium_ultra_remaining,
            total_spent: account.total_spent,
            created_at: account.created_at.to_rfc3339(),
            updated_at: account.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct ConsumeResponse {
    pub consumed: bool,
    pub account: AccountResponse,
}

pub async fn upsert_account(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(profile): Json<AccountProfile>
) -> Result<Json<AccountResponse>> {
    let account = state.ledger_service.get_or_create(user_id, profile).await?;

    Ok(Json(account.into()))
}

pub async fn get_account(
    State(state): State<AppState>,
    Path(user_id): Path<i64>
) -> Result<Json<AccountResponse>> {
    let account = state.ledger_service.get_account(user_id).await?;

    Ok(Json(account.into()))
}

pub async fn consume(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(request): Json<ConsumeRequest>
) -> Result<Json<ConsumeResponse>> {
    let consumed = state.ledger_service.consume(user_id, request.tier).await?;
    let account = state.ledger_service.get_account(user_id).await?;

    Ok(
        Json(ConsumeResponse {
            consumed,
            account: account.into(),
        })
    )
}

/// Metered generation: charges one unit of the requested quality.
pub async fn generate_qr(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(body): Json<RenderBody>
) -> Result<Response> {
    let artifact = state.generation_service.generate(user_id, body.into_request()?).await?;
    let bytes = artifact.read().await?;

    if let Err(e) = artifact.release().await {
        tracing::warn!("Failed to release artifact for user {}: {}", user_id, e);
    }

    Ok(png_response(bytes))
}
