use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use arc_swap::ArcSwap;
use axum::routing::{get, post};
use axum::Router;
use floorpath_core::{RoutingOptions, Venue, VenueData};
use tracing::info;

pub mod config;
pub mod errors;
pub mod routes;

/// What the service is currently routing over; swapped whole on reload.
#[derive(Clone, Debug)]
pub struct VenueState {
    pub path: Option<PathBuf>,
    pub venue: Option<Arc<Venue>>, // None until a venue file is loaded
    pub options: RoutingOptions,
    pub loaded_at_unix: u64,
}

impl VenueState {
    pub fn empty(path: Option<PathBuf>, options: RoutingOptions) -> Self {
        Self { path, venue: None, options, loaded_at_unix: 0 }
    }

    pub fn load(path: PathBuf, options: RoutingOptions) -> anyhow::Result<Self> {
        let venue = load_venue(&path, &options)?;
        Ok(Self { path: Some(path), venue: Some(Arc::new(venue)), options, loaded_at_unix: now_unix() })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub current: Arc<ArcSwap<VenueState>>, // atomic swap
}

impl AppState {
    pub fn new(state: VenueState) -> Self {
        Self { current: Arc::new(ArcSwap::from_pointee(state)) }
    }
}

pub fn now_unix() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

pub fn load_venue(path: &Path, options: &RoutingOptions) -> anyhow::Result<Venue> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading venue file {}", path.display()))?;
    let data = VenueData::from_json(&raw).with_context(|| format!("parsing venue file {}", path.display()))?;
    let venue = Venue::build(&data, options).with_context(|| format!("building venue from {}", path.display()))?;
    info!(path = %path.display(), floors = data.floors.len(), portals = data.portals.len(), "venue loaded");
    Ok(venue)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(routes::healthz))
        .route("/readyz", get(routes::readyz))
        .route("/version", get(routes::version))
        .route("/venue", get(routes::venue))
        .route("/route", post(routes::route))
        .route("/admin/reload", post(routes::reload))
        .with_state(state)
}
