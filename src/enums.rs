use std::fmt;
use std::str::FromStr;

use serde::{ Deserialize, Serialize };

use crate::error::AppError;

// ─── QualityTier ─────────────────────────────────────────────────────

/// Output resolution preset. Also names the balance a render is charged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Standard,
    High,
    Ultra,
}

impl QualityTier {
    /// Canonical string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Standard => "standard",
            QualityTier::High => "high",
            QualityTier::Ultra => "ultra",
        }
    }

    /// Human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            QualityTier::Standard => "Standard",
            QualityTier::High => "High",
            QualityTier::Ultra => "Ultra",
        }
    }

    /// Whether this tier is sold through payments. Standard is only granted as free quota.
    pub fn is_premium(&self) -> bool {
        !matches!(self, QualityTier::Standard)
    }

    pub fn all() -> &'static [QualityTier] {
        &[QualityTier::Standard, QualityTier::High, QualityTier::Ultra]
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityTier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(QualityTier::Standard),
            "high" => Ok(QualityTier::High),
            "ultra" => Ok(QualityTier::Ultra),
            _ =>
                Err(
                    AppError::InvalidInput(
                        format!("Invalid quality: {}. Supported: standard, high, ultra", s)
                    )
                ),
        }
    }
}

// ─── ModuleShape ─────────────────────────────────────────────────────

/// Drawing primitive used for each dark module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleShape {
    #[default]
    Square,
    Circle,
}

impl ModuleShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleShape::Square => "square",
            ModuleShape::Circle => "circle",
        }
    }
}

impl fmt::Display for ModuleShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleShape {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "square" => Ok(ModuleShape::Square),
            "circle" | "dots" => Ok(ModuleShape::Circle),
            _ =>
                Err(
                    AppError::InvalidInput(
                        format!("Invalid module shape: {}. Supported: square, circle", s)
                    )
                ),
        }
    }
}

// ─── PaymentStatus ───────────────────────────────────────────────────

/// Result of recording a payment notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Recorded,
    AlreadyCredited,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Recorded => "recorded",
            PaymentStatus::AlreadyCredited => "already_credited",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
