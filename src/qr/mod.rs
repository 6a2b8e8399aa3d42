pub mod matrix;
pub mod quality;
pub mod scene;
pub mod logo;
pub mod renderer;

pub use matrix::{ QrMatrix, MAX_PAYLOAD_CHARS };
pub use quality::{ QualityTable, TierGeometry };
pub use scene::{ RenderStyle, Scene };
pub use logo::LogoAsset;
pub use renderer::{ RenderedImage, Renderer };
