//! Turning a room-to-room request into drawable, bearing-annotated legs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::bearing::{is_aligned, Bearing, BearingEstimator};
use crate::error::{NavError, Result};
use crate::geometry::{polyline_length, Point};
use crate::models::FloorId;
use crate::planner::{Transition, TransitionPlanner};
use crate::venue::Venue;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRef {
    pub floor: FloorId,
    pub room: String,
}

impl RoomRef {
    pub fn new(floor: i32, room: impl Into<String>) -> Self {
        Self { floor: FloorId(floor), room: room.into() }
    }
}

impl fmt::Display for RoomRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.floor, self.room)
    }
}

/// `FLOOR:ROOM`, e.g. `-1:B12`.
impl FromStr for RoomRef {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (floor, room) = s.split_once(':').ok_or_else(|| format!("expected FLOOR:ROOM, got {s:?}"))?;
        let floor = floor.parse::<FloorId>().map_err(|e| format!("invalid floor in {s:?}: {e}"))?;
        let room = room.trim();
        if room.is_empty() {
            return Err(format!("missing room id in {s:?}"));
        }
        Ok(RoomRef { floor, room: room.to_string() })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub from: RoomRef,
    pub to: RoomRef,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegKind {
    DirectRoute,
    RouteToPortal,
    PortalTransition,
    RouteFromPortal,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Leg {
    pub floor: FloorId,
    pub kind: LegKind,
    pub from_id: String,
    pub to_id: String,
    pub from: Option<Point>,
    pub to: Option<Point>,
    /// Polyline to draw; empty for instruction-only legs.
    pub path: Vec<Point>,
    pub bearing: Option<Bearing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Leg {
    pub fn distance(&self) -> f64 {
        polyline_length(&self.path)
    }

    /// Whether a live `heading` lies within `tolerance` degrees of this leg's
    /// bearing; `None` when the leg carries no bearing.
    pub fn is_aligned(&self, heading: f64, tolerance: f64) -> Option<bool> {
        self.bearing.as_ref().map(|b| is_aligned(heading, b.compass_angle, tolerance))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Route {
    pub legs: Vec<Leg>,
    pub transitions: Vec<Transition>,
    /// Set when floor changes could not be planned and the route is a placeholder.
    pub degraded: bool,
    pub total_distance: f64,
}

impl Route {
    fn new(legs: Vec<Leg>, transitions: Vec<Transition>, degraded: bool) -> Self {
        let total_distance = legs.iter().map(Leg::distance).sum();
        Route { legs, transitions, degraded, total_distance }
    }
}

pub struct RouteAssembler<'v> {
    venue: &'v Venue,
    estimator: BearingEstimator,
    bearing_legs: usize,
}

impl<'v> RouteAssembler<'v> {
    pub fn new(venue: &'v Venue) -> Self {
        let options = venue.options();
        Self { venue, estimator: BearingEstimator::new(options), bearing_legs: options.path_bearing_legs }
    }

    /// Unknown floors or rooms are the only errors; everything else degrades.
    pub fn route(&self, request: &RouteRequest) -> Result<Route> {
        let RouteRequest { from, to } = request;
        let start = self.venue.access_point(from.floor, &from.room)?;
        let end = self.venue.access_point(to.floor, &to.room)?;

        if from.floor == to.floor {
            let leg = self.walk_leg(from.floor, LegKind::DirectRoute, &from.room, Some(start), &to.room, Some(end));
            return Ok(Route::new(vec![leg], Vec::new(), false));
        }

        match TransitionPlanner::new(self.venue).plan(from.floor, start, to.floor, Some(to.room.as_str())) {
            Ok(transitions) => {
                info!(%from, %to, hops = transitions.len(), "multi-floor route planned");
                self.multi_floor(from, to, start, end, transitions)
            }
            Err(NavError::TransitionPlanningFailed { reason }) => Ok(self.degraded(from, to, start, reason)),
            Err(e) => Err(e),
        }
    }

    fn multi_floor(
        &self,
        from: &RoomRef,
        to: &RoomRef,
        start: Point,
        end: Point,
        transitions: Vec<Transition>,
    ) -> Result<Route> {
        let mut legs = Vec::with_capacity(transitions.len() * 2 + 1);
        let mut floor = from.floor;
        let mut point = Some(start);
        let mut id = from.room.clone();

        for t in &transitions {
            if t.from_floor != floor {
                // passed through floors without portals; position unknown here
                point = None;
            }
            legs.push(self.walk_leg(t.from_floor, LegKind::RouteToPortal, &id, point, &t.portal.id, t.portal.center));
            legs.push(transition_leg(t));
            floor = t.to_floor;
            point = t.matching.center;
            id = t.matching.id.clone();
        }
        if floor != to.floor {
            point = None;
        }

        let last = if point.is_some() {
            self.walk_leg(to.floor, LegKind::RouteFromPortal, &id, point, &to.room, Some(end))
        } else {
            self.manual_entry_leg(to, &id, transitions.last(), end)?
        };
        legs.push(last);
        Ok(Route::new(legs, transitions, false))
    }

    /// Final leg when the arrival point on the destination floor is unknown:
    /// a low-confidence heading toward the destination room.
    fn manual_entry_leg(&self, to: &RoomRef, from_id: &str, last: Option<&Transition>, end: Point) -> Result<Leg> {
        let anchor = self.venue.room(to.floor, &to.room)?.anchor;
        // The portal centre lies in the source floor's coordinates, which are
        // not aligned with this floor; the heading is only a rough hint.
        let origin = last.and_then(|t| t.portal.center.map(|c| (t.from_floor, c)));
        let bearing = origin.and_then(|(_, o)| {
            self.estimator.direct(o, anchor).ok().map(|b| b.with_confidence(self.venue.options().virtual_portal_confidence))
        });
        let mut note = format!("Enter floor {} manually and head for {}", to.floor, to.room);
        if let (Some((source, _)), Some(_)) = (origin, &bearing) {
            note.push_str(&format!("; heading estimated from the portal position on floor {source}"));
        }
        warn!(floor = %to.floor, room = %to.room, "arrival point unknown, manual floor entry required");
        Ok(Leg {
            floor: to.floor,
            kind: LegKind::RouteFromPortal,
            from_id: from_id.to_string(),
            to_id: to.room.clone(),
            from: None,
            to: Some(end),
            path: Vec::new(),
            bearing,
            instruction: None,
            note: Some(note),
        })
    }

    fn degraded(&self, from: &RoomRef, to: &RoomRef, start: Point, reason: String) -> Route {
        warn!(%from, %to, %reason, "falling back to a manual floor change");
        let leg = Leg {
            floor: from.floor,
            kind: LegKind::PortalTransition,
            from_id: from.room.clone(),
            to_id: to.room.clone(),
            from: Some(start),
            to: None,
            path: Vec::new(),
            bearing: Some(Bearing::neutral(start, self.estimator.y_axis)),
            instruction: Some(format!("Change floors manually from floor {} to floor {}", from.floor, to.floor)),
            note: Some(reason),
        };
        Route::new(vec![leg], Vec::new(), true)
    }

    fn walk_leg(
        &self,
        floor: FloorId,
        kind: LegKind,
        from_id: &str,
        from: Option<Point>,
        to_id: &str,
        to: Option<Point>,
    ) -> Leg {
        let (path, bearing, note) = match (from, to) {
            (Some(a), Some(b)) => {
                let (path, bearing) = self.walk(floor, a, b);
                (path, bearing, None)
            }
            (None, _) => (Vec::new(), None, Some(format!("Position on floor {floor} unknown"))),
            (_, None) => (Vec::new(), None, Some(format!("{to_id} has no drawn position on floor {floor}"))),
        };
        Leg {
            floor,
            kind,
            from_id: from_id.to_string(),
            to_id: to_id.to_string(),
            from,
            to,
            path,
            bearing,
            instruction: None,
            note,
        }
    }

    /// Path from `a` to `b` with `a` prepended, and its bearing; a straight
    /// line and a direct bearing when the two are not connected.
    fn walk(&self, floor: FloorId, a: Point, b: Point) -> (Vec<Point>, Option<Bearing>) {
        let Some(found) = self.venue.find_path(floor, a, b) else {
            debug!(%floor, ?a, ?b, "no path, using direct bearing");
            return (vec![a, b], self.estimator.direct(a, b).ok());
        };
        let mut points = Vec::with_capacity(found.points.len() + 1);
        if found.points.first() != Some(&a) {
            points.push(a);
        }
        points.extend(found.points);
        let bearing = match self.estimator.along_path(&points, self.bearing_legs) {
            Ok(b) => Some(b),
            Err(e) => {
                debug!(%floor, error = %e, "path bearing unavailable, using direct bearing");
                self.estimator.direct(a, b).ok()
            }
        };
        (points, bearing)
    }
}

fn transition_leg(t: &Transition) -> Leg {
    let kind = t.portal.kind();
    let number = t.portal.number();
    let note = t
        .is_virtual()
        .then(|| format!("No {kind} {number} drawn on floor {}; change floors manually", t.to_floor));
    Leg {
        floor: t.from_floor,
        kind: LegKind::PortalTransition,
        from_id: t.portal.id.clone(),
        to_id: t.matching.id.clone(),
        from: t.portal.center,
        to: t.matching.center,
        path: Vec::new(),
        bearing: None,
        instruction: Some(format!("Take {kind} {number} from floor {} to floor {}", t.from_floor, t.to_floor)),
        note,
    }
}
