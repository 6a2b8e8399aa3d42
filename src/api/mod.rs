use std::sync::Arc;

use axum::{ http::header, response::{ IntoResponse, Response }, routing::{ get, post }, Router };
use tower_http::{ cors::CorsLayer, trace::TraceLayer };

pub mod render;
pub mod accounts;
pub mod payments;

use crate::services::{ GenerationService, LedgerService, LogoFetcher, RenderService };

#[derive(Clone)]
pub struct AppState {
    pub ledger_service: Arc<LedgerService>,
    pub render_service: Arc<RenderService>,
    pub logo_fetcher: Arc<LogoFetcher>,
    pub generation_service: Arc<GenerationService>,
}

impl AppState {
    pub fn new(
        ledger_service: Arc<LedgerService>,
        render_service: Arc<RenderService>,
        logo_fetcher: Arc<LogoFetcher>,
        generation_service: Arc<GenerationService>
    ) -> Self {
        Self {
            ledger_service,
            render_service,
            logo_fetcher,
            generation_service,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/render", post(render::render_qr))
        .route("/api/users/{id}", get(accounts::get_account).put(accounts::upsert_account))
        .route("/api/users/{id}/consume", post(accounts::consume))
        .route("/api/users/{id}/qr", post(accounts::generate_qr))
        .route("/api/users/{id}/payments", get(payments::list_payments))
        .route("/api/payments", post(payments::record_payment))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health_check() -> &'static str {
    "OK"
}

fn png_response(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "image/png")], bytes).into_response()
}
