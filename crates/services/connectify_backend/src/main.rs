// File: services/connectify_backend/src/main.rs
use connectify_common::{logging, ConnectifyError, Context};
use connectify_config::load_config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::info;

mod app;

#[tokio::main]
async fn main() -> Result<(), ConnectifyError> {
    logging::init();

    let config = Arc::new(load_config().context("Failed to load config")?);
    let mut app = app::build_app(config.clone()).await?;

    // Serve static files in dev mode
    if cfg!(debug_assertions) {
        info!("Running in development mode, serving static files from ../../dist");
        let static_router = axum::Router::new().nest_service("/static", ServeDir::new("../../dist"));
        app = app.merge(static_router);
        app = app.fallback_service(ServeDir::new("../dist"));
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;
    Ok(())
}
