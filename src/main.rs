use std::sync::Arc;

use anyhow::Context;
use migration::MigratorTrait;
use qr_bot::api::{ self, AppState };
use qr_bot::artifact::ArtifactStore;
use qr_bot::db::LedgerRepository;
use qr_bot::qr::{ QualityTable, Renderer };
use qr_bot::services::{ GenerationService, LedgerService, LogoFetcher, RenderService };
use qr_bot::Config;
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "qr_bot=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    // Quality table and exclusion shrink are checked before anything else starts
    let renderer = Renderer::new(QualityTable::DEFAULT, config.logo_exclusion_shrink).context(
        "Invalid render configuration"
    )?;

    tracing::info!(
        "Starting qr-bot with {} concurrent renders, logo shrink {}",
        config.max_concurrent_renders,
        config.logo_exclusion_shrink
    );

    // Initialize database connection
    let db = sea_orm::Database
        ::connect(&config.database_url).await
        .context("Failed to connect to database")?;

    tracing::info!("Database connected successfully");

    // Run migrations
    migration::Migrator::up(&db, None).await.context("Failed to run migrations")?;

    tracing::info!("Migrations completed successfully");

    // Initialize services
    let ledger_service = Arc::new(LedgerService::new(Arc::new(LedgerRepository::new(db))));
    let render_service = Arc::new(RenderService::new(renderer, config.max_concurrent_renders));
    let logo_fetcher = Arc::new(
        LogoFetcher::new(config.logo_fetch_timeout, config.logo_max_bytes).context(
            "Failed to build logo fetcher"
        )?
    );
    let artifact_store = Arc::new(
        ArtifactStore::new(config.artifact_dir.clone()).await.context(
            "Failed to create artifact directory"
        )?
    );

    let generation_service = Arc::new(
        GenerationService::new(
            ledger_service.clone(),
            render_service.clone(),
            logo_fetcher.clone(),
            artifact_store
        )
    );

    // Create app state
    let app_state = AppState::new(ledger_service, render_service, logo_fetcher, generation_service);

    // Build application router
    let app = api::router(app_state);

    // Start server
    let addr = config.bind_addr();
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener
        ::bind(&addr).await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
