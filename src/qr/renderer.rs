use image::codecs::png::{ CompressionType, FilterType as PngFilter, PngEncoder };
use image::{ imageops, DynamicImage, ExtendedColorType, ImageEncoder, RgbImage };

use crate::config::DEFAULT_EXCLUSION_SHRINK;
use crate::enums::QualityTier;
use crate::error::{ AppError, Result };

use super::logo::LogoAsset;
use super::matrix::QrMatrix;
use super::quality::{ QualityTable, TierGeometry };
use super::scene::{ RenderStyle, Scene };

/// Finished PNG plus what went into it.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub quality: QualityTier,
    pub logo_applied: bool,
}

/// Stateless QR renderer over a validated quality table.
#[derive(Debug, Clone)]
pub struct Renderer {
    table: QualityTable,
    exclusion_shrink: f32,
}

impl Renderer {
    pub fn new(table: QualityTable, exclusion_shrink: f32) -> Result<Self> {
        table.validate()?;

        if !(exclusion_shrink > 0.0 && exclusion_shrink <= 1.0) {
            return Err(
                AppError::InvalidQualityLogoCombination(
                    format!("Exclusion shrink must be in (0, 1], got {}", exclusion_shrink)
                )
            );
        }

        Ok(Self { table, exclusion_shrink })
    }

    /// Default tier table with the default exclusion shrink.
    pub fn standard() -> Result<Self> {
        Self::new(QualityTable::DEFAULT, DEFAULT_EXCLUSION_SHRINK)
    }

    pub fn geometry(&self, quality: QualityTier) -> TierGeometry {
        self.table.geometry(quality)
    }

    pub fn scene(&self, matrix: &QrMatrix, quality: QualityTier, style: &RenderStyle) -> Scene {
        Scene::build(matrix, &self.geometry(quality), style, self.exclusion_shrink)
    }

    /// Rasterize `matrix` and composite `logo` on top. An undecodable logo is skipped, not fatal.
    pub fn render(
        &self,
        matrix: &QrMatrix,
        quality: QualityTier,
        style: &RenderStyle,
        logo: Option<&LogoAsset>
    ) -> Result<RenderedImage> {
        let geometry = self.geometry(quality);
        let mut canvas = self.scene(matrix, quality, style).rasterize();

        let logo_applied = match logo {
            Some(logo) =>
                match composite_logo(&mut canvas, logo, &geometry) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!("Rendering without logo: {}", e);
                        false
                    }
                }
            None => false,
        };

        let bytes = encode_png(&canvas)?;

        tracing::debug!(
            "Rendered {}x{} {} QR ({} bytes, logo: {})",
            canvas.width(),
            canvas.height(),
            quality,
            bytes.len(),
            logo_applied
        );

        Ok(RenderedImage {
            bytes,
            width: canvas.width(),
            height: canvas.height(),
            quality,
            logo_applied,
        })
    }

    /// Encode `payload` and render it in one call.
    pub fn render_payload(
        &self,
        payload: &str,
        quality: QualityTier,
        style: &RenderStyle,
        logo: Option<&LogoAsset>
    ) -> Result<RenderedImage> {
        let matrix = QrMatrix::encode(payload)?;
        self.render(&matrix, quality, style, logo)
    }
}

fn composite_logo(canvas: &mut RgbImage, logo: &LogoAsset, geometry: &TierGeometry) -> Result<()> {
    let logo = logo.normalize(geometry.logo_size)?;
    let offset = ((geometry.canvas_size - geometry.logo_size) / 2) as i64;

    let mut rgba = DynamicImage::ImageRgb8(std::mem::take(canvas)).to_rgba8();
    imageops::overlay(&mut rgba, &logo, offset, offset);
    *canvas = DynamicImage::ImageRgba8(rgba).to_rgb8();

    Ok(())
}

fn encode_png(canvas: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut bytes, CompressionType::Best, PngFilter::Adaptive);
    encoder.write_image(canvas.as_raw(), canvas.width(), canvas.height(), ExtendedColorType::Rgb8)?;

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::logo::tests::png_logo;
    use crate::qr::scene::{ DARK, LIGHT };
    use image::Rgba;

    const URL: &str = "https://example.com";

    fn decode_png(bytes: &[u8]) -> RgbImage {
        image::load_from_memory(bytes).unwrap().to_rgb8()
    }

    fn read_qr(img: &RgbImage) -> String {
        let luma = DynamicImage::ImageRgb8(img.clone()).to_luma8();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            luma.width() as usize,
            luma.height() as usize,
            |x, y| luma.get_pixel(x as u32, y as u32)[0]
        );
        let grids = prepared.detect_grids();
        assert!(!grids.is_empty(), "no QR grid detected");
        let (_, content) = grids[0].decode().unwrap();
        content
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = Renderer::standard().unwrap();
        let style = RenderStyle::new(crate::enums::ModuleShape::Square, 0.25).unwrap();

        let first = renderer.render_payload(URL, QualityTier::High, &style, None).unwrap();
        let second = renderer.render_payload(URL, QualityTier::High, &style, None).unwrap();

        assert_eq!(first.bytes, second.bytes);
    }

    #[test]
    fn test_canvas_matches_tier() {
        let renderer = Renderer::standard().unwrap();

        for (tier, size) in [
            (QualityTier::Standard, 400),
            (QualityTier::High, 800),
            (QualityTier::Ultra, 1600),
        ] {
            let image = renderer.render_payload("tier", tier, &RenderStyle::circle(), None).unwrap();
            assert_eq!((image.width, image.height), (size, size));
            assert_eq!(decode_png(&image.bytes).dimensions(), (size, size));
        }
    }

    #[test]
    fn test_standard_square_decodes() {
        let renderer = Renderer::standard().unwrap();
        let image = renderer
            .render_payload(URL, QualityTier::Standard, &RenderStyle::square(), None)
            .unwrap();

        assert_eq!(read_qr(&decode_png(&image.bytes)), URL);
    }

    #[test]
    fn test_ultra_with_logo_still_decodes() {
        let renderer = Renderer::standard().unwrap();
        let logo = png_logo(64, 64, Rgba([220, 40, 40, 255]));
        let image = renderer
            .render_payload(URL, QualityTier::Ultra, &RenderStyle::square(), Some(&logo))
            .unwrap();

        assert!(image.logo_applied);
        let img = decode_png(&image.bytes);
        let center = img.get_pixel(800, 800);
        assert!(center[0] > 200 && center[1] < 60, "logo missing at center: {:?}", center);
        assert_eq!(read_qr(&img), URL);
    }

    #[test]
    fn test_styled_renders_decode() {
        let renderer = Renderer::standard().unwrap();
        let long = format!("https://example.com/share?ref={}", "q".repeat(290));
        let logo = png_logo(64, 64, Rgba([30, 90, 200, 255]));
        let styles = [
            RenderStyle::circle(),
            RenderStyle::new(crate::enums::ModuleShape::Square, 0.5).unwrap(),
        ];

        for style in &styles {
            for payload in [URL, long.as_str()] {
                for tier in [QualityTier::Standard, QualityTier::High] {
                    for logo in [None, Some(&logo)] {
                        let image = renderer.render_payload(payload, tier, style, logo).unwrap();
                        let decoded = read_qr(&decode_png(&image.bytes));

                        assert_eq!(
                            decoded,
                            payload,
                            "{:?} at {} with logo {}",
                            style,
                            tier,
                            logo.is_some()
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_exclusion_carved_without_logo() {
        let renderer = Renderer::standard().unwrap();
        let matrix = QrMatrix::from_modules(25, vec![true; 625]).unwrap();
        let image = renderer.render(&matrix, QualityTier::Standard, &RenderStyle::square(), None).unwrap();
        let img = decode_png(&image.bytes);

        assert!(!image.logo_applied);
        assert_eq!(*img.get_pixel(200, 200), LIGHT);
        assert_eq!(*img.get_pixel(30, 30), DARK);
    }

    #[test]
    fn test_corrupt_logo_falls_back_to_plain_render() {
        let renderer = Renderer::standard().unwrap();
        let plain = renderer
            .render_payload(URL, QualityTier::Standard, &RenderStyle::square(), None)
            .unwrap();

        let broken = LogoAsset::from_bytes(vec![0x89, b'P', b'N', b'G', 0, 1, 2]);
        let fallback = renderer
            .render_payload(URL, QualityTier::Standard, &RenderStyle::square(), Some(&broken))
            .unwrap();

        assert!(!fallback.logo_applied);
        assert_eq!(fallback.bytes, plain.bytes);
    }

    #[test]
    fn test_invalid_shrink_rejected() {
        assert!(Renderer::new(QualityTable::DEFAULT, 0.0).is_err());
        assert!(Renderer::new(QualityTable::DEFAULT, 1.2).is_err());
        assert!(Renderer::new(QualityTable::DEFAULT, 1.0).is_ok());
    }

    #[test]
    fn test_overflowing_payload_surfaces_error() {
        let renderer = Renderer::standard().unwrap();
        let result = renderer.render_payload(
            &"z".repeat(3000),
            QualityTier::Standard,
            &RenderStyle::square(),
            None
        );

        assert!(matches!(result, Err(AppError::EncodingOverflow(_))));
    }
}
