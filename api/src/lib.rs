pub mod auth;
pub mod config;
mod error;
pub mod routes;
pub mod state;

use axum::Router;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use venue_office_service::access::AccessMutation;

pub use config::{AppConfig, ConfigError};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// The whole HTTP surface with its middleware, ready to serve
pub fn router(state: AppState) -> Router {
    routes::router()
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

#[tokio::main]
async fn start() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sea_orm=warn")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let conn = Database::connect(config.database_url.as_str()).await?;

    if config.run_migrations {
        Migrator::up(&conn, None).await?;
    }

    if let Some(email) = &config.bootstrap_admin_email {
        let admin = AccessMutation::ensure_admin(&conn, email).await?;
        info!(email = %admin.email, "bootstrap admin ready");
    }

    let server_url = config.server_url();
    let state = AppState::new(conn, config)?;

    let listener = tokio::net::TcpListener::bind(&server_url).await?;
    info!(%server_url, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub fn main() {
    let result = start();

    if let Some(err) = result.err() {
        println!("Error: {err}");
        std::process::exit(1);
    }
}
