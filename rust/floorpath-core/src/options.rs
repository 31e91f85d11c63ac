use serde::{Deserialize, Serialize};

use crate::bearing::YAxis;

pub const DEFAULT_SNAP_TOLERANCE: f64 = 1.0;
pub const DEFAULT_MAX_HOPS: u32 = 10;
pub const DEFAULT_PATH_BEARING_LEGS: usize = 5;
pub const DEFAULT_MIN_SEGMENT_LENGTH: f64 = 1.0;
pub const DEFAULT_CONFIDENCE_DISTANCE: f64 = 500.0;
pub const DEFAULT_VIRTUAL_PORTAL_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_TELEPORT_WEIGHT: f64 = 0.001;
pub const DEFAULT_ALIGNMENT_TOLERANCE_DEG: f64 = 20.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingOptions {
    /// Two input points closer than this merge into one node.
    pub snap_tolerance: f64,
    /// Upper bound on floor hops per plan; guards against portal cycles.
    pub max_hops: u32,
    pub path_bearing_legs: usize,
    /// Path segments shorter than this are ignored by the bearing estimate.
    pub min_segment_length: f64,
    /// Straight-line distance at which a direct bearing reaches full confidence.
    pub confidence_distance: f64,
    pub virtual_portal_confidence: f64,
    pub teleport_weight: f64,
    pub use_teleports: bool,
    pub y_axis: YAxis,
    pub alignment_tolerance_deg: f64,
}

impl Default for RoutingOptions {
    fn default() -> Self {
        Self {
            snap_tolerance: DEFAULT_SNAP_TOLERANCE,
            max_hops: DEFAULT_MAX_HOPS,
            path_bearing_legs: DEFAULT_PATH_BEARING_LEGS,
            min_segment_length: DEFAULT_MIN_SEGMENT_LENGTH,
            confidence_distance: DEFAULT_CONFIDENCE_DISTANCE,
            virtual_portal_confidence: DEFAULT_VIRTUAL_PORTAL_CONFIDENCE,
            teleport_weight: DEFAULT_TELEPORT_WEIGHT,
            use_teleports: true,
            y_axis: YAxis::Down,
            alignment_tolerance_deg: DEFAULT_ALIGNMENT_TOLERANCE_DEG,
        }
    }
}
