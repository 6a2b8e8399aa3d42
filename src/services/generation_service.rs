use std::sync::Arc;

use crate::artifact::{ ArtifactStore, RenderedArtifact };
use crate::enums::QualityTier;
use crate::error::{ AppError, Result };
use crate::qr::{ LogoAsset, QrMatrix, RenderStyle };
use crate::services::ledger_service::LedgerService;
use crate::services::logo_fetcher::{ LogoFetcher, LogoSource };
use crate::services::render_service::RenderService;

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub payload: String,
    pub quality: QualityTier,
    pub style: RenderStyle,
    pub logo: Option<LogoSource>,
}

/// Metered generation: encode, charge one unit of the tier, render, and hand back a scoped file.
pub struct GenerationService {
    ledger: Arc<LedgerService>,
    renders: Arc<RenderService>,
    logos: Arc<LogoFetcher>,
    artifacts: Arc<ArtifactStore>,
}

impl GenerationService {
    pub fn new(
        ledger: Arc<LedgerService>,
        renders: Arc<RenderService>,
        logos: Arc<LogoFetcher>,
        artifacts: Arc<ArtifactStore>
    ) -> Self {
        Self { ledger, renders, logos, artifacts }
    }

    pub async fn generate(&self, user_id: i64, request: GenerationRequest) -> Result<RenderedArtifact> {
        // Payloads that cannot be encoded never cost the user anything.
        let matrix = QrMatrix::encode(&request.payload)?;
        let logo = self.logos.resolve(request.logo.as_ref()).await;

        if !self.ledger.consume(user_id, request.quality).await? {
            return Err(AppError::InsufficientBalance { tier: request.quality });
        }

        match self.render_and_store(matrix, &request, logo).await {
            Ok(artifact) => {
                tracing::info!(
                    "Generated {} QR code for user {} (logo: {})",
                    request.quality,
                    user_id,
                    artifact.logo_applied
                );
                Ok(artifact)
            }
            Err(e) => {
                tracing::error!("Render for user {} failed, refunding: {}", user_id, e);
                if let Err(refund_err) = self.ledger.credit(user_id, request.quality, 1).await {
                    tracing::error!(
                        "Refund of one {} render to user {} failed: {}",
                        request.quality,
                        user_id,
                        refund_err
                    );
                }
                Err(e)
            }
        }
    }

    async fn render_and_store(
        &self,
        matrix: QrMatrix,
        request: &GenerationRequest,
        logo: Option<LogoAsset>
    ) -> Result<RenderedArtifact> {
        let image = self.renders.render_matrix(
            matrix,
            request.quality,
            request.style,
            logo
        ).await?;
        self.artifacts.persist(image).await
    }
}
