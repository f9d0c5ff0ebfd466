use axum::Router;
use common::utils::logging::init_logging_from_env;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use configs::AppConfig;

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Public entry: build the app and run the HTTP server until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let has_static = common::env::ensure_env(&cfg.server.static_dir).await;

    let state = AppState::connect(&cfg).await?;
    let app: Router = routes::build_router(state, build_cors(), has_static.then_some(cfg.server.static_dir.as_str()));

    let addr = cfg.server.bind_addr();
    info!(%addr, "starting dailyfresh server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;
    Ok(())
}
