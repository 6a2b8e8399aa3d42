//! Vector description of a styled QR symbol and its crisp rasterization.
//!
//! Coordinates are canvas pixels with the origin at the top-left corner. A pixel is covered by a
//! primitive when its center lies inside it, so edges are never antialiased.

use std::fmt::Write as _;

use image::{ Rgb, RgbImage };

use crate::enums::ModuleShape;

use super::matrix::QrMatrix;
use super::quality::TierGeometry;

pub const DARK: Rgb<u8> = Rgb([0, 0, 0]);
pub const LIGHT: Rgb<u8> = Rgb([255, 255, 255]);

/// Circles are inscribed at this fraction of the cell size.
const CIRCLE_FILL: f64 = 0.9;

/// Side of a finder pattern, in modules.
const FINDER_SIZE: usize = 7;

/// Smallest symbol (version 1) that carries finder patterns.
const MIN_SYMBOL_SIDE: usize = 21;

/// Whether `(row, col)` belongs to one of the three finder patterns. Readers locate the symbol
/// by these, so they are always drawn as solid squares.
fn is_finder_module(side: usize, row: usize, col: usize) -> bool {
    if side < MIN_SYMBOL_SIDE {
        return false;
    }

    let top = row < FINDER_SIZE;
    let left = col < FINDER_SIZE;
    let bottom = row >= side - FINDER_SIZE;
    let right = col >= side - FINDER_SIZE;

    (top && left) || (top && right) || (bottom && left)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    /// Square cell `[x, x + size) × [y, y + size)` with rounded corners of `radius`.
    RoundedSquare {
        x: f64,
        y: f64,
        size: f64,
        radius: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
}

impl Primitive {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        match *self {
            Primitive::RoundedSquare { x, y, size, radius } => {
                let (lx, ly) = (px - x, py - y);
                if lx < 0.0 || ly < 0.0 || lx >= size || ly >= size {
                    return false;
                }
                if radius <= 0.0 {
                    return true;
                }

                // Distance to the nearest corner arc center.
                let nx = lx.clamp(radius, size - radius);
                let ny = ly.clamp(radius, size - radius);
                let (dx, dy) = (lx - nx, ly - ny);
                dx * dx + dy * dy <= radius * radius
            }
            Primitive::Circle { cx, cy, r } => {
                let (dx, dy) = (px - cx, py - cy);
                dx * dx + dy * dy <= r * r
            }
        }
    }

    /// Bounding box as `(x0, y0, x1, y1)`.
    fn bounds(&self) -> (f64, f64, f64, f64) {
        match *self {
            Primitive::RoundedSquare { x, y, size, .. } => (x, y, x + size, y + size),
            Primitive::Circle { cx, cy, r } => (cx - r, cy - r, cx + r, cy + r),
        }
    }
}

/// Circular area around the grid center that is forced light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExclusionDisc {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

impl ExclusionDisc {
    pub fn for_geometry(geometry: &TierGeometry, shrink: f32) -> Self {
        let center = (geometry.margin as f64) + (geometry.content_size() as f64) / 2.0;

        Self {
            cx: center,
            cy: center,
            radius: ((geometry.logo_reservation() as f64) / 2.0) * (shrink as f64),
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (dx, dy) = (x - self.cx, y - self.cy);
        dx * dx + dy * dy < self.radius * self.radius
    }
}

/// Module shape and corner rounding for a render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    shape: ModuleShape,
    corner_radius: f32,
}

impl RenderStyle {
    pub fn new(shape: ModuleShape, corner_radius: f32) -> crate::Result<Self> {
        if !(0.0..1.0).contains(&corner_radius) {
            return Err(
                crate::AppError::InvalidInput(
                    format!("corner_radius must be in [0, 1), got {}", corner_radius)
                )
            );
        }

        Ok(Self { shape, corner_radius })
    }

    pub fn square() -> Self {
        Self { shape: ModuleShape::Square, corner_radius: 0.0 }
    }

    pub fn circle() -> Self {
        Self { shape: ModuleShape::Circle, corner_radius: 0.0 }
    }

    pub fn shape(&self) -> ModuleShape {
        self.shape
    }

    pub fn corner_radius(&self) -> f32 {
        self.corner_radius
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self::square()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    canvas_size: u32,
    exclusion: ExclusionDisc,
    primitives: Vec<Primitive>,
}

impl Scene {
    /// Lay out every dark module of `matrix` outside the exclusion disc.
    pub fn build(
        matrix: &QrMatrix,
        geometry: &TierGeometry,
        style: &RenderStyle,
        exclusion_shrink: f32
    ) -> Self {
        let side = matrix.side();
        let origin = geometry.margin as f64;
        let cell = (geometry.content_size() as f64) / (side as f64);
        let exclusion = ExclusionDisc::for_geometry(geometry, exclusion_shrink);
        let corner = ((style.corner_radius() as f64) * cell).min(cell / 2.0);

        let mut primitives = Vec::with_capacity(matrix.dark_count());
        for row in 0..side {
            for col in 0..side {
                if !matrix.is_dark(row, col) {
                    continue;
                }

                let x = origin + (col as f64) * cell;
                let y = origin + (row as f64) * cell;
                let (cx, cy) = (x + cell / 2.0, y + cell / 2.0);
                if exclusion.contains(cx, cy) {
                    continue;
                }

                if is_finder_module(side, row, col) {
                    primitives.push(Primitive::RoundedSquare { x, y, size: cell, radius: 0.0 });
                    continue;
                }

                primitives.push(match style.shape() {
                    ModuleShape::Square => Primitive::RoundedSquare { x, y, size: cell, radius: corner },
                    ModuleShape::Circle =>
                        Primitive::Circle { cx, cy, r: (cell * CIRCLE_FILL) / 2.0 },
                });
            }
        }

        Self {
            canvas_size: geometry.canvas_size,
            exclusion,
            primitives,
        }
    }

    pub fn canvas_size(&self) -> u32 {
        self.canvas_size
    }

    pub fn exclusion(&self) -> &ExclusionDisc {
        &self.exclusion
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Fill a light canvas and paint every primitive without antialiasing.
    pub fn rasterize(&self) -> RgbImage {
        let size = self.canvas_size;
        let mut canvas = RgbImage::from_pixel(size, size, LIGHT);

        for primitive in &self.primitives {
            let (x0, y0, x1, y1) = primitive.bounds();
            let px_start = clamp_px(x0.floor(), size);
            let px_end = clamp_px(x1.ceil(), size);
            let py_start = clamp_px(y0.floor(), size);
            let py_end = clamp_px(y1.ceil(), size);

            for py in py_start..py_end {
                for px in px_start..px_end {
                    if primitive.contains((px as f64) + 0.5, (py as f64) + 0.5) {
                        canvas.put_pixel(px, py, DARK);
                    }
                }
            }
        }

        canvas
    }

    /// SVG document of the same scene.
    pub fn to_svg(&self) -> String {
        let size = self.canvas_size;
        let mut svg = String::new();

        let _ = writeln!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{0}\" height=\"{0}\" viewBox=\"0 0 {0} {0}\" shape-rendering=\"crispEdges\">",
            size
        );
        svg.push_str("\t<rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>\n");
        for primitive in &self.primitives {
            let _ = match *primitive {
                Primitive::RoundedSquare { x, y, size, radius } =>
                    writeln!(
                        svg,
                        "\t<rect x=\"{:.3}\" y=\"{:.3}\" width=\"{:.3}\" height=\"{:.3}\" rx=\"{:.3}\" fill=\"#000000\"/>",
                        x,
                        y,
                        size,
                        size,
                        radius
                    ),
                Primitive::Circle { cx, cy, r } =>
                    writeln!(
                        svg,
                        "\t<circle cx=\"{:.3}\" cy=\"{:.3}\" r=\"{:.3}\" fill=\"#000000\"/>",
                        cx,
                        cy,
                        r
                    ),
            };
        }
        svg.push_str("</svg>\n");

        svg
    }
}

fn clamp_px(value: f64, size: u32) -> u32 {
    value.max(0.0).min(size as f64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(side: usize) -> QrMatrix {
        QrMatrix::from_modules(side, vec![true; side * side]).unwrap()
    }

    const GEOMETRY: TierGeometry = TierGeometry::new(400, 20, 80, 8);

    #[test]
    fn test_exclusion_radius_applies_shrink() {
        let disc = ExclusionDisc::for_geometry(&GEOMETRY, 0.85);

        assert_eq!(disc.cx, 200.0);
        assert_eq!(disc.cy, 200.0);
        assert!((disc.radius - 40.8).abs() < 1e-4);
    }

    #[test]
    fn test_center_modules_are_cleared() {
        let scene = Scene::build(&solid(21), &GEOMETRY, &RenderStyle::square(), 0.85);
        let img = scene.rasterize();

        assert_eq!(*img.get_pixel(200, 200), LIGHT);
        assert_eq!(*img.get_pixel(25, 25), DARK);
        assert!(scene.primitives().len() < 21 * 21);
    }

    #[test]
    fn test_margin_stays_light() {
        let img = Scene::build(&solid(21), &GEOMETRY, &RenderStyle::square(), 0.85).rasterize();

        assert_eq!(img.dimensions(), (400, 400));
        assert_eq!(*img.get_pixel(5, 5), LIGHT);
        assert_eq!(*img.get_pixel(19, 200), LIGHT);
        assert_eq!(*img.get_pixel(380, 200), LIGHT);
        assert_eq!(*img.get_pixel(379, 379), DARK);
    }

    #[test]
    fn test_even_side_lays_out_full_grid() {
        let scene = Scene::build(&solid(20), &GEOMETRY, &RenderStyle::square(), 0.85);
        let img = scene.rasterize();

        // 360 / 20 = 18px cells, so the first row spans y in [20, 38).
        assert_eq!(*img.get_pixel(20, 20), DARK);
        assert_eq!(*img.get_pixel(379, 379), DARK);
        assert_eq!(*img.get_pixel(200, 200), LIGHT);
    }

    #[test]
    fn test_circle_leaves_cell_corners_light() {
        let geometry = TierGeometry::new(400, 20, 8, 0);
        let img = Scene::build(&solid(3), &geometry, &RenderStyle::circle(), 0.85).rasterize();

        // 120px cells; the top-left circle has radius 54 around (80, 80).
        assert_eq!(*img.get_pixel(21, 21), LIGHT);
        assert_eq!(*img.get_pixel(139, 139), LIGHT);
        assert_eq!(*img.get_pixel(80, 30), DARK);
        assert_eq!(*img.get_pixel(80, 80), DARK);
    }

    #[test]
    fn test_rounded_square_clips_corner() {
        let rounded = Primitive::RoundedSquare { x: 0.0, y: 0.0, size: 10.0, radius: 4.0 };
        let sharp = Primitive::RoundedSquare { x: 0.0, y: 0.0, size: 10.0, radius: 0.0 };

        assert!(!rounded.contains(0.5, 0.5));
        assert!(sharp.contains(0.5, 0.5));
        assert!(rounded.contains(5.0, 0.5));
        assert!(rounded.contains(9.5, 5.0));
        assert!(!rounded.contains(10.0, 5.0));
    }

    #[test]
    fn test_render_style_rejects_out_of_range_radius() {
        assert!(RenderStyle::new(ModuleShape::Square, 0.3).is_ok());
        assert!(RenderStyle::new(ModuleShape::Square, 1.0).is_err());
        assert!(RenderStyle::new(ModuleShape::Square, -0.1).is_err());
    }

    #[test]
    fn test_svg_lists_every_primitive() {
        let scene = Scene::build(&solid(21), &GEOMETRY, &RenderStyle::circle(), 0.85);
        let svg = scene.to_svg();

        assert!(svg.starts_with("<svg"));
        assert_eq!(
            svg.matches("<circle").count() + svg.matches("<rect x=").count(),
            scene.primitives().len()
        );
    }

    #[test]
    fn test_finder_patterns_stay_square() {
        let scene = Scene::build(&solid(21), &GEOMETRY, &RenderStyle::circle(), 0.85);
        let img = scene.rasterize();
        let squares = scene
            .primitives()
            .iter()
            .filter(|p| matches!(p, Primitive::RoundedSquare { radius, .. } if *radius == 0.0))
            .count();

        assert_eq!(squares, 3 * 7 * 7);
        // Corner of the top-left finder cell is painted, unlike a circle's.
        assert_eq!(*img.get_pixel(20, 20), DARK);
        // Module (10, 0) is outside every finder and drawn as a circle.
        let cell = 360.0 / 21.0;
        let y = (20.0 + 10.0 * cell) as u32;
        assert_eq!(*img.get_pixel(20, y), LIGHT);
    }

    #[test]
    fn test_rounded_style_keeps_finder_corners_sharp() {
        let style = RenderStyle::new(ModuleShape::Square, 0.5).unwrap();
        let img = Scene::build(&solid(21), &GEOMETRY, &style, 0.85).rasterize();

        assert_eq!(*img.get_pixel(20, 20), DARK);
        assert_eq!(*img.get_pixel(379, 20), DARK);
        assert_eq!(*img.get_pixel(20, 379), DARK);
        // The bottom-right corner has no finder pattern, so it is rounded off.
        assert_eq!(*img.get_pixel(379, 379), LIGHT);
    }
}
