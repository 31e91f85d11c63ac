use anyhow::Context;
use floorpath_service::{build_router, config::Config, AppState, VenueState};
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cfg = Config::from_env()?;
    let state = match cfg.venue_path.clone() {
        Some(path) => VenueState::load(path, cfg.options.clone())?,
        None => {
            warn!("FLOORPATH_VENUE not set, serving without a venue");
            VenueState::empty(None, cfg.options.clone())
        }
    };
    let app = build_router(AppState::new(state));
    let addr = cfg.addr();
    tracing::info!(core_version = %floorpath_core::version(), addr = %addr, "starting floorpath-service");
    let listener = tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
