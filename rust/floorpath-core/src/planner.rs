//! Floor-to-floor hop planning.

use serde::Serialize;
use tracing::{debug, info_span, warn};

use crate::error::{NavError, Result};
use crate::geometry::Point;
use crate::models::FloorId;
use crate::portal::Portal;
use crate::venue::Venue;

/// One planned hop: take `portal` on `from_floor`, arrive at `matching` on `to_floor`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transition {
    pub from_floor: FloorId,
    pub to_floor: FloorId,
    pub portal: Portal,
    pub matching: Portal,
}

impl Transition {
    pub fn is_virtual(&self) -> bool {
        self.matching.is_virtual
    }
}

enum PlanState {
    Planning { floor: FloorId, point: Point, hops: u32 },
    Done,
    Failed(String),
}

/// Destination-floor portals from which the target room can be walked to,
/// nearest (by path cost) first.
struct Accessible<'v> {
    portals: Vec<&'v Portal>,
}

pub struct TransitionPlanner<'v> {
    venue: &'v Venue,
    max_hops: u32,
}

impl<'v> TransitionPlanner<'v> {
    pub fn new(venue: &'v Venue) -> Self {
        Self { venue, max_hops: venue.options().max_hops }
    }

    pub fn with_max_hops(mut self, max_hops: u32) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// Plan the hops from `start_floor` to `dest_floor`, starting at `start_point`.
    ///
    /// When `target_room` names a room on the destination floor, portals that
    /// cannot reach it are passed over in favour of ones that can.
    pub fn plan(
        &self,
        start_floor: FloorId,
        start_point: Point,
        dest_floor: FloorId,
        target_room: Option<&str>,
    ) -> Result<Vec<Transition>> {
        let span = info_span!("plan_transitions", from = %start_floor, to = %dest_floor);
        let _enter = span.enter();

        let accessible = match target_room {
            Some(room) => self.accessible(dest_floor, room)?,
            None => Accessible { portals: Vec::new() },
        };

        let mut transitions = Vec::new();
        let mut state = PlanState::Planning { floor: start_floor, point: start_point, hops: 0 };
        loop {
            state = match state {
                PlanState::Planning { floor, .. } if floor == dest_floor => PlanState::Done,
                PlanState::Planning { hops, .. } if hops >= self.max_hops => {
                    PlanState::Failed(format!("hop budget of {} exhausted", self.max_hops))
                }
                PlanState::Planning { floor, point, hops } => {
                    self.step(floor, point, hops, dest_floor, &accessible, &mut transitions)
                }
                PlanState::Done => {
                    debug!(hops = transitions.len(), "transition plan complete");
                    return Ok(transitions);
                }
                PlanState::Failed(reason) => {
                    warn!(%reason, "transition planning failed");
                    return Err(NavError::TransitionPlanningFailed { reason });
                }
            };
        }
    }

    fn accessible(&self, dest: FloorId, room: &str) -> Result<Accessible<'v>> {
        let target = self.venue.access_point(dest, room)?;
        let mut ranked: Vec<(&'v Portal, f64)> = self
            .venue
            .routable_portals_on(dest)
            .filter_map(|p| {
                let center = p.center?;
                let path = self.venue.find_path(dest, center, target)?;
                Some((p, path.cost))
            })
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        debug!(floor = %dest, accessible = ranked.len(), "destination portals reaching the target room");
        Ok(Accessible { portals: ranked.into_iter().map(|(p, _)| p).collect() })
    }

    fn step(
        &self,
        floor: FloorId,
        point: Point,
        hops: u32,
        dest: FloorId,
        accessible: &Accessible<'v>,
        transitions: &mut Vec<Transition>,
    ) -> PlanState {
        if self.venue.portals_on(floor).next().is_none() {
            let next = floor.step_toward(dest);
            debug!(%floor, %next, "floor without portals, passing through");
            return PlanState::Planning { floor: next, point, hops: hops + 1 };
        }
        let candidates: Vec<&'v Portal> = self.venue.routable_portals_on(floor).collect();

        let chosen = accessible_direct(&candidates, accessible, dest, point)
            .map(|(p, m)| (p, m.clone(), "accessible-direct"))
            .or_else(|| {
                nearest(candidates.iter().copied().filter(|p| p.declared_target() == Some(dest)), point)
                    .map(|p| (p, self.venue.match_portal(p, dest), "direct"))
            })
            .or_else(|| {
                let p = stepwise(&candidates, floor, dest, point)?;
                let target = p.declared_target()?;
                Some((p, self.venue.match_portal(p, target), "stepwise"))
            });

        let Some((portal, matching, rule)) = chosen else {
            return PlanState::Failed(format!("no usable portal on floor {floor} toward floor {dest}"));
        };
        let Some(next) = portal.declared_target() else {
            return PlanState::Failed(format!("portal {} has no target floor", portal.id));
        };
        debug!(%floor, %next, portal = %portal.id, matching = %matching.id, rule, "hop");

        let point = matching.center.unwrap_or(point);
        transitions.push(Transition { from_floor: floor, to_floor: next, portal: portal.clone(), matching });
        PlanState::Planning { floor: next, point, hops: hops + 1 }
    }
}

fn nearest<'a>(portals: impl Iterator<Item = &'a Portal>, point: Point) -> Option<&'a Portal> {
    portals.min_by(|a, b| a.distance_to(point).total_cmp(&b.distance_to(point)))
}

/// For each reachable destination portal in rank order, the nearest portal
/// here that is the same connector and declares the destination floor.
fn accessible_direct<'a>(
    candidates: &[&'a Portal],
    accessible: &Accessible<'a>,
    dest: FloorId,
    point: Point,
) -> Option<(&'a Portal, &'a Portal)> {
    accessible.portals.iter().find_map(|&target| {
        let here = candidates.iter().copied().filter(|p| p.matches(target) && p.declared_target() == Some(dest));
        nearest(here, point).map(|p| (p, target))
    })
}

/// Nearest portal leading strictly closer to `dest`, preferring the adjacent floor.
fn stepwise<'a>(candidates: &[&'a Portal], floor: FloorId, dest: FloorId, point: Point) -> Option<&'a Portal> {
    let adjacent = floor.step_toward(dest);
    let remaining = floor.distance(dest);
    nearest(candidates.iter().copied().filter(|p| p.declared_target() == Some(adjacent)), point).or_else(|| {
        nearest(
            candidates
                .iter()
                .copied()
                .filter(|p| p.declared_target().map_or(false, |t| t.distance(dest) < remaining)),
            point,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DoorInput, FloorData, PortalInput, RoomInput, SegmentInput, VenueData};
    use crate::options::RoutingOptions;

    fn seg(x1: f64, x2: f64) -> SegmentInput {
        SegmentInput { id: None, p1: Point::new(x1, 0.0), p2: Point::new(x2, 0.0) }
    }

    fn door(id: &str, x: f64) -> DoorInput {
        DoorInput { id: id.into(), p1: Point::new(x, 0.0), p2: Point::new(x, 2.0) }
    }

    fn on(id: &str, floor: i32) -> PortalInput {
        PortalInput { id: id.into(), floor: FloorId(floor), status: "On".into() }
    }

    fn floor(n: i32, segments: Vec<SegmentInput>, doors: Vec<DoorInput>) -> FloorData {
        FloorData { floor: FloorId(n), rooms: vec![], doors, segments }
    }

    fn build(floors: Vec<FloorData>, portals: Vec<PortalInput>) -> Venue {
        Venue::build(&VenueData { floors, portals }, &RoutingOptions::default()).unwrap()
    }

    #[test]
    fn prefers_portal_that_reaches_the_target_room() {
        let mut basement = floor(-1, vec![seg(0.0, 20.0), seg(80.0, 100.0)], vec![door("Elev.1.0", 5.0), door("Elev.2.0", 85.0)]);
        basement.rooms.push(RoomInput { id: "R".into(), room_type: "Office".into(), anchor: Some(Point::new(95.0, 5.0)), outline: vec![] });
        basement.doors.push(door("R_1", 95.0));
        let venue = build(
            vec![floor(0, vec![seg(0.0, 100.0)], vec![door("Elev.1.-1", 10.0), door("Elev.2.-1", 90.0)]), basement],
            vec![on("Elev.1.-1", 0), on("Elev.2.-1", 0), on("Elev.1.0", -1), on("Elev.2.0", -1)],
        );
        let planner = TransitionPlanner::new(&venue);

        let plan = planner.plan(FloorId(0), Point::new(0.0, 0.0), FloorId(-1), Some("R")).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].portal.id, "Elev.2.-1");
        assert_eq!(plan[0].matching.id, "Elev.2.0");

        let plain = planner.plan(FloorId(0), Point::new(0.0, 0.0), FloorId(-1), None).unwrap();
        assert_eq!(plain[0].portal.id, "Elev.1.-1");
    }

    #[test]
    fn steps_through_intermediate_floor() {
        let venue = build(
            vec![
                floor(0, vec![seg(0.0, 50.0)], vec![door("Stairs.1.1", 10.0)]),
                floor(1, vec![seg(0.0, 50.0)], vec![door("Stairs.1.0", 10.0), door("Stairs.2.2", 40.0)]),
                floor(2, vec![seg(0.0, 50.0)], vec![door("Stairs.2.1", 40.0)]),
            ],
            vec![on("Stairs.1.1", 0), on("Stairs.1.0", 1), on("Stairs.2.2", 1), on("Stairs.2.1", 2)],
        );
        let plan = TransitionPlanner::new(&venue).plan(FloorId(0), Point::new(0.0, 0.0), FloorId(2), None).unwrap();
        let hops: Vec<_> = plan.iter().map(|t| (t.from_floor.0, t.to_floor.0, t.portal.id.as_str())).collect();
        assert_eq!(hops, vec![(0, 1, "Stairs.1.1"), (1, 2, "Stairs.2.2")]);
        assert_eq!(plan[0].matching.id, "Stairs.1.0");
        assert!(!plan[1].is_virtual());
    }

    #[test]
    fn floor_without_portals_is_passed_through() {
        let venue = build(
            vec![floor(0, vec![seg(0.0, 50.0)], vec![door("Elev.1.1", 10.0)]), floor(2, vec![seg(0.0, 50.0)], vec![])],
            vec![on("Elev.1.1", 0)],
        );
        let plan = TransitionPlanner::new(&venue).plan(FloorId(0), Point::new(0.0, 0.0), FloorId(2), None).unwrap();
        assert_eq!(plan.len(), 1);
        assert!(plan[0].is_virtual());
        assert_eq!(plan[0].matching.center, None);
    }

    #[test]
    fn inactive_portals_fail_planning() {
        let venue = build(
            vec![floor(0, vec![seg(0.0, 50.0)], vec![door("Elev.1.1", 10.0)]), floor(1, vec![seg(0.0, 50.0)], vec![])],
            vec![PortalInput { id: "Elev.1.1".into(), floor: FloorId(0), status: "Off".into() }],
        );
        let err = TransitionPlanner::new(&venue).plan(FloorId(0), Point::new(0.0, 0.0), FloorId(1), None).unwrap_err();
        assert!(matches!(err, NavError::TransitionPlanningFailed { .. }));
    }

    #[test]
    fn hop_budget_bounds_planning() {
        let venue = build(
            vec![
                floor(0, vec![seg(0.0, 50.0)], vec![door("Stairs.1.1", 10.0)]),
                floor(1, vec![seg(0.0, 50.0)], vec![door("Stairs.1.0", 10.0), door("Stairs.2.2", 40.0)]),
                floor(2, vec![seg(0.0, 50.0)], vec![door("Stairs.2.1", 40.0)]),
            ],
            vec![on("Stairs.1.1", 0), on("Stairs.1.0", 1), on("Stairs.2.2", 1), on("Stairs.2.1", 2)],
        );
        let planner = TransitionPlanner::new(&venue).with_max_hops(1);
        let err = planner.plan(FloorId(0), Point::new(0.0, 0.0), FloorId(2), None).unwrap_err();
        assert_eq!(err, NavError::TransitionPlanningFailed { reason: "hop budget of 1 exhausted".into() });
    }

    #[test]
    fn same_floor_needs_no_transitions() {
        let venue = build(vec![floor(0, vec![seg(0.0, 50.0)], vec![])], vec![]);
        assert!(TransitionPlanner::new(&venue).plan(FloorId(0), Point::new(0.0, 0.0), FloorId(0), None).unwrap().is_empty());
    }
}
