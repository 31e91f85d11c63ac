use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Segment};

/// Numeric floor designator; `0` is the ground floor, negatives are basements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "FloorIdRepr")]
pub struct FloorId(pub i32);

impl FloorId {
    /// The neighbouring floor one step toward `dest`, or `self` when already there.
    pub fn step_toward(self, dest: FloorId) -> FloorId {
        FloorId(self.0 + (dest.0 - self.0).signum())
    }

    pub fn distance(self, other: FloorId) -> u32 {
        self.0.abs_diff(other.0)
    }
}

impl fmt::Display for FloorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FloorId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i32>().map(FloorId)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FloorIdRepr {
    Num(i32),
    Str(String),
}

impl TryFrom<FloorIdRepr> for FloorId {
    type Error = String;

    fn try_from(v: FloorIdRepr) -> Result<Self, Self::Error> {
        match v {
            FloorIdRepr::Num(n) => Ok(FloorId(n)),
            FloorIdRepr::Str(s) => s.parse().map_err(|_| format!("invalid floor id {s:?}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomInput {
    pub id: String,
    #[serde(rename = "type", default = "default_room_type")]
    pub room_type: String,
    /// Explicit anchor; when absent the outline's centroid is used.
    #[serde(default)]
    pub anchor: Option<Point>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outline: Vec<Point>,
}

fn default_room_type() -> String {
    "Unknown".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoorInput {
    pub id: String,
    pub p1: Point,
    pub p2: Point,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentInput {
    #[serde(default)]
    pub id: Option<String>,
    pub p1: Point,
    pub p2: Point,
}

impl From<&SegmentInput> for Segment {
    fn from(s: &SegmentInput) -> Self {
        Segment::new(s.p1, s.p2)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloorData {
    pub floor: FloorId,
    #[serde(default)]
    pub rooms: Vec<RoomInput>,
    #[serde(default)]
    pub doors: Vec<DoorInput>,
    #[serde(default)]
    pub segments: Vec<SegmentInput>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortalInput {
    /// Structured label `type.number.target`, e.g. `Elevator.2.-1` or `Stop.4.A`.
    pub id: String,
    pub floor: FloorId,
    #[serde(default)]
    pub status: String,
}

impl PortalInput {
    pub fn is_on(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("on")
    }
}

/// Venue-wide dataset as handed over by a geometry-extraction adapter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VenueData {
    #[serde(default)]
    pub floors: Vec<FloorData>,
    #[serde(default)]
    pub portals: Vec<PortalInput>,
}

impl VenueData {
    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn floor_id_accepts_numbers_and_strings() {
        let a: FloorId = serde_json::from_value(json!(-1)).unwrap();
        let b: FloorId = serde_json::from_value(json!("-1")).unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_value::<FloorId>(json!("roof")).is_err());
        assert_eq!(serde_json::to_value(FloorId(2)).unwrap(), json!(2));
    }

    #[test]
    fn floor_id_steps_toward_destination() {
        assert_eq!(FloorId(0).step_toward(FloorId(-2)), FloorId(-1));
        assert_eq!(FloorId(0).step_toward(FloorId(3)), FloorId(1));
        assert_eq!(FloorId(1).step_toward(FloorId(1)), FloorId(1));
        assert_eq!(FloorId(-2).distance(FloorId(1)), 3);
    }

    #[test]
    fn venue_data_deserializes_with_defaults() {
        let v = json!({
            "floors": [{
                "floor": "0",
                "rooms": [{ "id": "R1", "anchor": [1.0, 2.0] }],
                "segments": [{ "p1": [0, 0], "p2": [10, 0] }]
            }],
            "portals": [{ "id": "Elevator.1.-1", "floor": 0, "status": "On" }]
        });
        let data: VenueData = serde_json::from_value(v).unwrap();
        assert_eq!(data.floors[0].floor, FloorId(0));
        assert_eq!(data.floors[0].rooms[0].room_type, "Unknown");
        assert!(data.floors[0].doors.is_empty());
        assert!(data.portals[0].is_on());
    }

    #[test]
    fn portal_status_other_than_on_is_inactive() {
        let p = PortalInput { id: "Stairs.1.1".into(), floor: FloorId(0), status: "Off".into() };
        assert!(!p.is_on());
        let p = PortalInput { status: " on ".into(), ..p };
        assert!(p.is_on());
    }
}
