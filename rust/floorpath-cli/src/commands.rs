use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use floorpath_core::{RoomRef, RouteAssembler, RouteRequest, RoutingOptions, Venue, VenueData};
use tracing::{info, warn};

pub fn load_options(path: Option<&Path>) -> Result<RoutingOptions> {
    let Some(path) = path else { return Ok(RoutingOptions::default()) };
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read options {:?}", path))?;
    let value: serde_json::Value = serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {:?}", path))?;
    if !value.is_object() {
        anyhow::bail!("routing options in {:?} must be a JSON object", path);
    }
    serde_json::from_value(value).with_context(|| format!("invalid routing options in {:?}", path))
}

pub fn load_venue(path: &Path, options: &RoutingOptions) -> Result<Venue> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read venue {:?}", path))?;
    let data = VenueData::from_json(&raw).with_context(|| format!("invalid venue JSON in {:?}", path))?;
    let venue = Venue::build(&data, options).with_context(|| format!("failed to build venue from {:?}", path))?;
    info!(floors = data.floors.len(), portals = data.portals.len(), "venue loaded");
    Ok(venue)
}

pub fn summary(venue: &Venue) -> Result<String> {
    let s = venue.summary();
    if !s.unmatched.is_empty() {
        warn!(unmatched = s.unmatched.len(), "portals without a counterpart on their target floor");
    }
    Ok(serde_json::to_string_pretty(&s)?)
}

pub fn route(venue: &Venue, from: RoomRef, to: RoomRef) -> Result<String> {
    let request = RouteRequest { from, to };
    let route = RouteAssembler::new(venue)
        .route(&request)
        .with_context(|| format!("cannot route {} -> {}", request.from, request.to))?;
    if route.degraded {
        warn!("floor change could not be planned; route is a manual placeholder");
    }
    Ok(serde_json::to_string_pretty(&route)?)
}
