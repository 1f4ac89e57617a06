use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use moving_estimate::cache::{start_cache_warmer, AppCache};
use moving_estimate::config::Config;
use moving_estimate::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moving_estimate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        "Pricing: {} per km, multipliers {:?}",
        config.pricing.price_per_km, config.pricing.multipliers
    );

    let db = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let cache = AppCache::new(config.reference_cache_ttl);
    tokio::spawn(start_cache_warmer(
        cache.clone(),
        db.clone(),
        config.reference_cache_ttl,
    ));

    let state = AppState {
        db,
        cache,
        pricing: config.pricing,
    };

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);
    axum::serve(listener, app(state)).await?;

    Ok(())
}
