use crate::enums::QualityTier;
use crate::error::{ AppError, Result };

/// Pixel geometry of one quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierGeometry {
    pub canvas_size: u32,
    pub margin: u32,
    pub logo_size: u32,
    pub logo_padding: u32,
}

impl TierGeometry {
    pub const fn new(canvas_size: u32, margin: u32, logo_size: u32, logo_padding: u32) -> Self {
        Self {
            canvas_size,
            margin,
            logo_size,
            logo_padding,
        }
    }

    /// Side of the square the module grid is laid out in.
    pub fn content_size(&self) -> u32 {
        self.canvas_size.saturating_sub(2 * self.margin)
    }

    /// Diameter reserved for the logo and its padding.
    pub fn logo_reservation(&self) -> u32 {
        self.logo_size + 2 * self.logo_padding
    }

    /// The logo reservation must fit strictly inside the content area.
    pub fn validate(&self, tier: QualityTier) -> Result<()> {
        if self.canvas_size == 0 || self.logo_size == 0 {
            return Err(
                AppError::InvalidQualityLogoCombination(
                    format!("{} tier has a zero canvas or logo size", tier)
                )
            );
        }

        if 2 * self.margin >= self.canvas_size {
            return Err(
                AppError::InvalidQualityLogoCombination(
                    format!(
                        "{} tier margin {} leaves no content area on a {}px canvas",
                        tier,
                        self.margin,
                        self.canvas_size
                    )
                )
            );
        }

        if self.logo_reservation() >= self.content_size() {
            return Err(
                AppError::InvalidQualityLogoCombination(
                    format!(
                        "{} tier logo reservation {}px does not fit in {}px content area",
                        tier,
                        self.logo_reservation(),
                        self.content_size()
                    )
                )
            );
        }

        Ok(())
    }
}

/// Geometry for every tier. Validated once, then only read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityTable {
    standard: TierGeometry,
    high: TierGeometry,
    ultra: TierGeometry,
}

impl QualityTable {
    pub const DEFAULT: QualityTable = QualityTable {
        standard: TierGeometry::new(400, 20, 80, 8),
        high: TierGeometry::new(800, 40, 160, 16),
        ultra: TierGeometry::new(1600, 80, 320, 32),
    };

    pub fn new(standard: TierGeometry, high: TierGeometry, ultra: TierGeometry) -> Result<Self> {
        let table = Self { standard, high, ultra };
        table.validate()?;
        Ok(table)
    }

    pub fn geometry(&self, tier: QualityTier) -> TierGeometry {
        match tier {
            QualityTier::Standard => self.standard,
            QualityTier::High => self.high,
            QualityTier::Ultra => self.ultra,
        }
    }

    /// Check the fit invariant for every tier and that tiers grow monotonically.
    pub fn validate(&self) -> Result<()> {
        for &tier in QualityTier::all() {
            self.geometry(tier).validate(tier)?;
        }

        for pair in QualityTier::all().windows(2) {
            let (lower, upper) = (self.geometry(pair[0]), self.geometry(pair[1]));
            let grows =
                upper.canvas_size > lower.canvas_size &&
                upper.margin >= lower.margin &&
                upper.logo_size >= lower.logo_size &&
                upper.logo_padding >= lower.logo_padding;

            if !grows {
                return Err(
                    AppError::InvalidQualityLogoCombination(
                        format!("{} tier must be larger than {} tier", pair[1], pair[0])
                    )
                );
            }
        }

        Ok(())
    }
}

impl Default for QualityTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}
