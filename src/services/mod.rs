pub mod ledger_service;
pub mod logo_fetcher;
pub mod render_service;
pub mod generation_service;

pub use ledger_service::LedgerService;
pub use logo_fetcher::{ LogoFetcher, LogoSource };
pub use render_service::RenderService;
pub use generation_service::{ GenerationRequest, GenerationService };
