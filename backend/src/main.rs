use tabvote_backend::{
    build_rocket,
    config::{DatabaseConfig, PoolSettings},
    error::StartupError,
    pool::PoolManager,
    routes::AppState,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

async fn run() -> Result<(), StartupError> {
    let config = DatabaseConfig::from_env()?;
    info!(db_target = ?config.target, database = %config.database, "🚀 Starting Tabs vs Spaces server");

    let db = PoolManager::new(&config, PoolSettings::default());
    if let Err(e) = db.initialize().await {
        db.shutdown().await;
        return Err(e);
    }

    build_rocket(AppState::new(db))
        .launch()
        .await
        .map_err(Box::new)?;

    Ok(())
}

#[rocket::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}
