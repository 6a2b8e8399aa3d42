use image::imageops::{ self, FilterType };
use image::{ Rgba, RgbaImage };

use crate::error::{ AppError, Result };

/// Logo image bytes in any raster format `image` can decode. Consumed once per render.
#[derive(Clone)]
pub struct LogoAsset {
    bytes: Vec<u8>,
}

impl LogoAsset {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode and fit the logo into a transparent `size × size` square, keeping its aspect ratio.
    pub fn normalize(&self, size: u32) -> Result<RgbaImage> {
        let decoded = image
            ::load_from_memory(&self.bytes)
            .map_err(|e| AppError::LogoDecodeFailure(e.to_string()))?;

        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(AppError::LogoDecodeFailure("Logo has no pixels".to_string()));
        }

        if decoded.width() == size && decoded.height() == size {
            return Ok(decoded.to_rgba8());
        }

        let fitted = decoded.resize(size, size, FilterType::Lanczos3).to_rgba8();
        let mut square = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]));
        let x = (size - fitted.width()) / 2;
        let y = (size - fitted.height()) / 2;
        imageops::overlay(&mut square, &fitted, x as i64, y as i64);

        Ok(square)
    }
}

impl std::fmt::Debug for LogoAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogoAsset").field("len", &self.bytes.len()).finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// PNG-encoded solid logo for tests.
    pub(crate) fn png_logo(width: u32, height: u32, color: Rgba<u8>) -> LogoAsset {
        let img = RgbaImage::from_pixel(width, height, color);
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png).unwrap();
        LogoAsset::from_bytes(bytes)
    }

    #[test]
    fn test_normalize_resizes_to_square() {
        let logo = png_logo(40, 40, Rgba([200, 0, 0, 255]));
        let img = logo.normalize(80).unwrap();

        assert_eq!(img.dimensions(), (80, 80));
        assert_eq!(img.get_pixel(40, 40)[0], 200);
    }

    #[test]
    fn test_normalize_keeps_matching_size() {
        let logo = png_logo(80, 80, Rgba([0, 0, 255, 255]));
        let img = logo.normalize(80).unwrap();

        assert_eq!(*img.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_normalize_letterboxes_wide_logo() {
        let logo = png_logo(160, 40, Rgba([0, 128, 0, 255]));
        let img = logo.normalize(80).unwrap();

        assert_eq!(img.dimensions(), (80, 80));
        // 160x40 fits as 80x20, centered vertically.
        assert_eq!(img.get_pixel(40, 0)[3], 0);
        assert_eq!(img.get_pixel(40, 40)[3], 255);
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let logo = LogoAsset::from_bytes(b"definitely not an image".to_vec());
        assert!(matches!(logo.normalize(80), Err(AppError::LogoDecodeFailure(_))));
    }
}
