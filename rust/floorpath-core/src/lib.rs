pub mod bearing;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod models;
pub mod options;
pub mod planner;
pub mod portal;
pub mod route;
pub mod venue;

pub use bearing::{Bearing, BearingEstimator, CompassPoint, YAxis};
pub use engine::{NeighborProvider, PathResult, SearchResult};
pub use error::{NavError, Result};
pub use geometry::{Point, Segment};
pub use graph::{FloorGraph, NodeId};
pub use models::{FloorId, VenueData};
pub use options::RoutingOptions;
pub use planner::{Transition, TransitionPlanner};
pub use portal::{Portal, PortalKind, PortalLabel, TeleportPair};
pub use route::{Leg, LegKind, RoomRef, Route, RouteAssembler, RouteRequest};
pub use venue::{Venue, VenueSummary};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
