use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::enums::QualityTier;
use crate::error::{ AppError, Result };
use crate::qr::{ LogoAsset, QrMatrix, RenderStyle, RenderedImage, Renderer };

/// Runs renders on the blocking pool, at most `max_concurrent` at a time.
pub struct RenderService {
    renderer: Arc<Renderer>,
    permits: Arc<Semaphore>,
    max_concurrent: usize,
}

impl RenderService {
    pub fn new(renderer: Renderer, max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);

        Self {
            renderer: Arc::new(renderer),
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Renders that could start right now without waiting.
    pub fn available_slots(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Encode `payload` and render it.
    pub async fn render(
        &self,
        payload: &str,
        quality: QualityTier,
        style: RenderStyle,
        logo: Option<LogoAsset>
    ) -> Result<RenderedImage> {
        let matrix = QrMatrix::encode(payload)?;
        self.render_matrix(matrix, quality, style, logo).await
    }

    pub async fn render_matrix(
        &self,
        matrix: QrMatrix,
        quality: QualityTier,
        style: RenderStyle,
        logo: Option<LogoAsset>
    ) -> Result<RenderedImage> {
        let permit = self.permits
            .clone()
            .acquire_owned().await
            .map_err(|_| AppError::Internal("Render pool is closed".to_string()))?;
        let renderer = self.renderer.clone();

        tokio::task
            ::spawn_blocking(move || {
                let _permit = permit;
                renderer.render(&matrix, quality, &style, logo.as_ref())
            }).await
            .map_err(|e| AppError::Internal(format!("Render task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_renders_through_pool() {
        let service = RenderService::new(Renderer::standard().unwrap(), 2);
        let image = service
            .render("https://example.com", QualityTier::Standard, RenderStyle::square(), None).await
            .unwrap();

        assert_eq!(image.width, 400);
        assert_eq!(service.available_slots(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_renders_share_bounded_pool() {
        let service = Arc::new(RenderService::new(Renderer::standard().unwrap(), 1));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .render(&format!("payload-{}", i), QualityTier::High, RenderStyle::circle(), None).await
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().width, 800);
        }
        assert_eq!(service.available_slots(), 1);
    }

    #[tokio::test]
    async fn test_zero_bound_is_raised_to_one() {
        let service = RenderService::new(Renderer::standard().unwrap(), 0);
        assert_eq!(service.max_concurrent(), 1);
    }

    #[tokio::test]
    async fn test_overflow_is_reported_before_rendering() {
        let service = RenderService::new(Renderer::standard().unwrap(), 1);
        let result = service.render(
            &"q".repeat(4000),
            QualityTier::Ultra,
            RenderStyle::square(),
            None
        ).await;

        assert!(matches!(result, Err(AppError::EncodingOverflow(_))));
    }
}
