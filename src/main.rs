use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::info;

use gasdelivery_web::auth::{
    Authorizer, HttpSessionVerifier, SessionVerifier, StaticSessionVerifier, Subject,
};
use gasdelivery_web::cache::{start_cache_warmer, AppCache};
use gasdelivery_web::config::{AuthConfig, Config};
use gasdelivery_web::{build_router, logging, AppState};

const CACHE_WARM_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_tracing();

    let config = Config::from_env().context("loading configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .context("connecting to database")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("running migrations")?;
    info!("Database ready");

    let cache = AppCache::new(config.service_cache_ttl);
    tokio::spawn(start_cache_warmer(
        cache.clone(),
        pool.clone(),
        CACHE_WARM_INTERVAL,
    ));

    let sessions: Arc<dyn SessionVerifier> = match &config.auth {
        AuthConfig::Remote { url, api_key } => {
            info!("Verifying sessions against {}", url);
            Arc::new(HttpSessionVerifier::new(url.clone(), api_key.clone()))
        }
        AuthConfig::DevToken(token) => {
            tracing::warn!("DEV_API_TOKEN in use, do not run this in production");
            Arc::new(StaticSessionVerifier::new().with_token(
                token.clone(),
                Subject {
                    user_id: "dev".to_string(),
                    email: None,
                    role: Some("admin".to_string()),
                },
            ))
        }
    };

    let state = AppState::new(pool, cache, sessions, Authorizer::allow_authenticated());
    let app = build_router(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
