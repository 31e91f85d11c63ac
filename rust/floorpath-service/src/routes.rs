use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use floorpath_core::{Route, RouteAssembler, RouteRequest, Venue, VenueSummary};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, info_span};

use crate::errors::AppError;
use crate::{AppState, VenueState};

#[derive(Debug, Serialize)]
pub struct Healthz {
    pub status: &'static str,
}

fn loaded(state: &AppState) -> Result<Arc<Venue>, AppError> {
    state.current.load().venue.clone().ok_or(AppError::NotReady)
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(Healthz { status: "ok" }))
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let current = state.current.load();
    match &current.venue {
        Some(_) => (StatusCode::OK, Json(json!({"ready": true, "loaded_at_unix": current.loaded_at_unix}))),
        None => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"ready": false}))),
    }
}

pub async fn version() -> impl IntoResponse {
    let svc_version = env!("CARGO_PKG_VERSION");
    let core_version = floorpath_core::version();
    (StatusCode::OK, Json(json!({"service_version": svc_version, "core_version": core_version})))
}

pub async fn venue(State(state): State<AppState>) -> Result<Json<VenueSummary>, AppError> {
    Ok(Json(loaded(&state)?.summary()))
}

pub async fn route(State(state): State<AppState>, Json(req): Json<RouteRequest>) -> Result<Json<Route>, AppError> {
    let span = info_span!("route", from = %req.from, to = %req.to);
    let _enter = span.enter();

    let venue = loaded(&state)?;
    let route = RouteAssembler::new(&venue).route(&req).map_err(|e| {
        error!(error = %e, "route rejected");
        AppError::from(e)
    })?;
    info!(legs = route.legs.len(), degraded = route.degraded, total_distance = route.total_distance, "route done");
    Ok(Json(route))
}

/// Re-read the configured venue file and swap it in; the old venue keeps
/// serving until the new one is built.
pub async fn reload(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let current = state.current.load_full();
    let Some(path) = current.path.clone() else {
        return Err(AppError::BadRequest("no venue file configured".to_string()));
    };
    let next = VenueState::load(path, current.options.clone())?;
    let floors = next.venue.as_ref().map_or(0, |v| v.floors().count());
    let loaded_at_unix = next.loaded_at_unix;
    state.current.store(Arc::new(next));
    info!(floors, "venue reloaded");
    Ok((StatusCode::OK, Json(json!({"reloaded": true, "floors": floors, "loaded_at_unix": loaded_at_unix}))))
}
