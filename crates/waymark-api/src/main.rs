//! Waymark API server entry point.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use waymark_api::config::ApiConfig;
use waymark_api::error::AppError;
use waymark_api::state::AppState;
use waymark_core::clock::SystemClock;
use waymark_core::ports::FlagStore;
use waymark_flag_store::memory::InMemoryFlagStore;
use waymark_flag_store::pg_flag_store::PgFlagStore;
use waymark_flag_store::schema::CREATE_TOUR_FLAGS_TABLE;
use waymark_sequencer::domain::registry::StaticTemplateRegistry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Waymark tour API server");

    let config = ApiConfig::from_env()?;

    // Load the template registry.
    let registry = match &config.templates_path {
        Some(path) => {
            let document = tokio::fs::read_to_string(path).await.map_err(|e| {
                AppError::Config(format!("cannot read WAYMARK_TEMPLATES `{}`: {e}", path.display()))
            })?;
            let registry = StaticTemplateRegistry::from_yaml(&document).map_err(AppError::from)?;
            tracing::info!(templates = registry.len(), "tour templates loaded");
            registry
        }
        None => StaticTemplateRegistry::default(),
    };

    // Choose the flag store.
    let flag_store: Arc<dyn FlagStore> = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await
                .map_err(AppError::from)?;
            sqlx::query(CREATE_TOUR_FLAGS_TABLE)
                .execute(&pool)
                .await
                .map_err(AppError::from)?;
            Arc::new(PgFlagStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, tour flags are kept in memory");
            Arc::new(InMemoryFlagStore::new())
        }
    };

    let app_state = AppState::new(
        config.tour.clone(),
        Arc::new(registry),
        flag_store,
        Arc::new(SystemClock),
    );

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = waymark_api::build_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server.
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
