use thiserror::Error;

use crate::enums::QualityTier;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")] Database(#[from] sea_orm::DbErr),

    #[error("Image error: {0}")] Image(#[from] image::ImageError),

    #[error("I/O error: {0}")] Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")] InvalidInput(String),

    #[error("Payload too large for error-correction level H: {0}")] EncodingOverflow(String),

    #[error("Invalid quality/logo combination: {0}")] InvalidQualityLogoCombination(String),

    #[error("Logo could not be decoded: {0}")] LogoDecodeFailure(String),

    #[error("Logo download failed: {0}")] LogoFetch(String),

    #[error("No {tier} renders remaining")] InsufficientBalance {
        tier: QualityTier,
    },

    #[error("Payment {0} was already recorded")] DuplicateChargeId(String),

    #[error("Account not found")]
    AccountNotFound,

    #[error("Internal error: {0}")] Internal(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn to_error_response(&self) -> ErrorResponse {
        let (code, message, field) = match self {
            AppError::Database(e) => ("DATABASE_ERROR", e.to_string(), None),
            AppError::Image(e) => ("IMAGE_ERROR", e.to_string(), None),
            AppError::Io(e) => ("IO_ERROR", e.to_string(), None),
            AppError::InvalidInput(msg) => ("INVALID_INPUT", msg.clone(), None),
            AppError::EncodingOverflow(msg) =>
                ("ENCODING_OVERFLOW", msg.clone(), Some("payload".to_string())),
            AppError::InvalidQualityLogoCombination(msg) =>
                ("INVALID_QUALITY_LOGO_COMBINATION", msg.clone(), None),
            AppError::LogoDecodeFailure(msg) =>
                ("LOGO_DECODE_FAILURE", msg.clone(), Some("logo".to_string())),
            AppError::LogoFetch(msg) => ("LOGO_FETCH_FAILED", msg.clone(), Some("logo_url".to_string())),
            AppError::InsufficientBalance { tier } =>
                (
                    "INSUFFICIENT_BALANCE",
                    format!("No {} renders remaining, purchase a package to continue", tier),
                    Some("quality".to_string()),
                ),
            AppError::DuplicateChargeId(charge_id) =>
                (
                    "DUPLICATE_CHARGE_ID",
                    format!("Payment {} was already recorded", charge_id),
                    Some("charge_id".to_string()),
                ),
            AppError::AccountNotFound => ("ACCOUNT_NOT_FOUND", "Account not found".to_string(), None),
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone(), None),
        };

        ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
            },
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::AccountNotFound => axum::http::StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => axum::http::StatusCode::BAD_REQUEST,
            AppError::EncodingOverflow(_) | AppError::LogoDecodeFailure(_) => {
                axum::http::StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::LogoFetch(_) => axum::http::StatusCode::BAD_GATEWAY,
            AppError::InsufficientBalance { .. } => axum::http::StatusCode::PAYMENT_REQUIRED,
            AppError::DuplicateChargeId(_) => axum::http::StatusCode::CONFLICT,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let response = self.to_error_response();
        (status, axum::Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
