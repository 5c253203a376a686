pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vocab_core::calendar::local_today;

use crate::config::ServiceConfig;
use crate::db::Database;
use crate::error::Result;
use crate::services::cache::SetCache;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub cache: Arc<SetCache>,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    /// Connect to the configured database, migrate it, and build state
    pub async fn connect(config: ServiceConfig) -> Result<Self> {
        let db = Database::connect(&config.database_url).await?;
        db.run_migrations().await?;

        Ok(Self {
            db: Arc::new(db),
            cache: Arc::new(SetCache::new(config.set_cache_ttl)),
            config: Arc::new(config),
        })
    }

    /// Read configuration from the environment and build state
    pub async fn from_env() -> anyhow::Result<Self> {
        let config = ServiceConfig::from_env()?;
        tracing::info!(
            xp_per_correct = config.policy.xp_per_correct,
            intervals = ?config.policy.intervals.days(),
            "Loaded grading configuration"
        );

        tracing::info!("Connecting to database...");
        Ok(Self::connect(config).await?)
    }
}

/// Load `.env`, install logging, and bring the service up
pub async fn run() -> anyhow::Result<AppState> {
    dotenvy::dotenv().ok();
    init_tracing();

    let state = AppState::from_env().await?;
    tracing::info!(study_day = %local_today(), "Vocabulary service ready");
    Ok(state)
}

/// Install the global tracing subscriber, filtered by `RUST_LOG` (default `info`)
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
