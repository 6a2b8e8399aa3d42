use qrcode::types::QrError;
use qrcode::{ Color, EcLevel, QrCode };

use crate::error::{ AppError, Result };

/// Longest payload accepted, counted in characters.
pub const MAX_PAYLOAD_CHARS: usize = 2048;

/// Square module grid of an encoded QR symbol. `true` is a dark module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    side: usize,
    modules: Vec<bool>,
}

impl QrMatrix {
    /// Encode `payload` at error-correction level H.
    pub fn encode(payload: &str) -> Result<Self> {
        if payload.is_empty() {
            return Err(AppError::InvalidInput("Payload must not be empty".to_string()));
        }

        let chars = payload.chars().count();
        if chars > MAX_PAYLOAD_CHARS {
            return Err(
                AppError::EncodingOverflow(
                    format!("{} characters given, at most {} allowed", chars, MAX_PAYLOAD_CHARS)
                )
            );
        }

        let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::H).map_err(
            |e| match e {
                QrError::DataTooLong =>
                    AppError::EncodingOverflow(
                        format!("{} bytes do not fit in a level-H QR code", payload.len())
                    ),
                other => AppError::Internal(format!("QR encoding failed: {}", other)),
            }
        )?;

        let side = code.width();
        let modules = code
            .to_colors()
            .into_iter()
            .map(|color| color == Color::Dark)
            .collect();

        tracing::debug!("Encoded {} bytes into a {}x{} matrix", payload.len(), side, side);

        Ok(Self { side, modules })
    }

    /// Build a matrix from raw row-major modules.
    pub fn from_modules(side: usize, modules: Vec<bool>) -> Result<Self> {
        if side == 0 || modules.len() != side * side {
            return Err(
                AppError::InvalidInput(
                    format!("Expected {} modules for side {}, got {}", side * side, side, modules.len())
                )
            );
        }

        Ok(Self { side, modules })
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        self.modules[row * self.side + col]
    }

    pub fn dark_count(&self) -> usize {
        self.modules
            .iter()
            .filter(|dark| **dark)
            .count()
    }
}
