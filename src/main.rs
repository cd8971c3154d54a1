use std::{net::SocketAddr, sync::Arc};
use taskpulse::{
    AppConfig, AppState,
    branding::load_branding,
    gateway::{ApiClient, HttpGateway},
    preferences::PreferenceStore,
    router,
};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = AppConfig::from_env()?;
    if config.google_client_id.is_empty() {
        warn!("GOOGLE_CLIENT_ID is not set; the sign-in button will not work");
    }

    if let Some(parent) = config.prefs_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let branding = load_branding(&config.branding_path).await;
    let prefs = PreferenceStore::open(config.prefs_path.clone()).await;
    let api = ApiClient::new(Arc::new(HttpGateway::new(config.api_base_url.clone())));
    let state = AppState::new(api, prefs, branding, config.google_client_id.clone());
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(backend = %config.api_base_url, "listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
