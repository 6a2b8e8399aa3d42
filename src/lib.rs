pub mod config;
pub mod enums;
pub mod error;
pub mod qr;
pub mod db;
pub mod artifact;
pub mod services;
pub mod api;

pub use config::Config;
pub use enums::{ ModuleShape, PaymentStatus, QualityTier };
pub use error::{ AppError, Result };
