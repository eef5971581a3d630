use bakery_api::{config::AppConfig, create_router, db, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Bakery API - Starting...");

    let config = AppConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    db::run_migrations(&pool).await?;

    let addr = config.bind_address();
    let app = create_router(AppState::from_pool(pool, config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Bakery API is running on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
