use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::engine::{self, NeighborProvider, PathResult};
use crate::error::{NavError, Result};
use crate::geometry::{centroid, Point, Segment};
use crate::graph::{FloorGraph, TeleportLink};
use crate::models::{FloorData, FloorId, PortalInput, VenueData};
use crate::options::RoutingOptions;
use crate::portal::{find_match, Portal, PortalKind, PortalLabel, TeleportPair};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Room {
    pub id: String,
    #[serde(rename = "type")]
    pub room_type: String,
    pub anchor: Point,
    pub floor: FloorId,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Door {
    pub id: String,
    pub p1: Point,
    pub p2: Point,
    pub center: Point,
    pub floor: FloorId,
}

/// Rooms, doors and the walkable graph of one floor.
#[derive(Clone, Debug)]
pub struct Floor {
    pub id: FloorId,
    pub rooms: IndexMap<String, Room>,
    pub doors: IndexMap<String, Door>,
    pub graph: FloorGraph,
}

impl Floor {
    pub fn build(data: &FloorData, options: &RoutingOptions) -> Self {
        let id = data.floor;
        let mut rooms = IndexMap::with_capacity(data.rooms.len());
        for r in &data.rooms {
            let Some(anchor) = r.anchor.or_else(|| centroid(&r.outline)) else {
                warn!(floor = %id, room = %r.id, "room without anchor or outline skipped");
                continue;
            };
            let room = Room { id: r.id.clone(), room_type: r.room_type.clone(), anchor, floor: id };
            if rooms.insert(r.id.clone(), room).is_some() {
                warn!(floor = %id, room = %r.id, "duplicate room id, keeping the last one");
            }
        }
        let mut doors = IndexMap::with_capacity(data.doors.len());
        for d in &data.doors {
            let door = Door { id: d.id.clone(), p1: d.p1, p2: d.p2, center: d.p1.midpoint(d.p2), floor: id };
            doors.insert(d.id.clone(), door);
        }
        let segments: Vec<Segment> = data.segments.iter().map(Segment::from).collect();
        let graph = FloorGraph::build(&segments, options.snap_tolerance);
        Floor { id, rooms, doors, graph }
    }

    pub fn room(&self, room_id: &str) -> Result<&Room> {
        self.rooms.get(room_id).ok_or_else(|| NavError::UnknownRoom { floor: self.id, room: room_id.to_string() })
    }

    /// Where a room is entered and left: its own nearest door (id prefixed
    /// `roomId_`), else the nearest door on the floor, else the room anchor.
    pub fn access_point(&self, room_id: &str) -> Result<Point> {
        let room = self.room(room_id)?;
        let prefix = format!("{room_id}_");
        let own = nearest_door(self.doors.values().filter(|d| d.id.starts_with(&prefix)), room.anchor);
        Ok(own.or_else(|| nearest_door(self.doors.values(), room.anchor)).unwrap_or(room.anchor))
    }

    /// Centre of the drawn element standing for `portal_id` on this floor.
    fn portal_center(&self, portal_id: &str) -> Option<Point> {
        if let Some(d) = self.doors.get(portal_id) {
            return Some(d.center);
        }
        if let Some(r) = self.rooms.get(portal_id) {
            return Some(r.anchor);
        }
        let prefix = format!("{portal_id}_");
        self.doors.values().find(|d| d.id.starts_with(&prefix)).map(|d| d.center)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct FloorSummary {
    pub floor: FloorId,
    pub nodes: usize,
    pub edges: usize,
    pub rooms: usize,
    pub doors: usize,
    pub portals: usize,
    pub active_portals: usize,
    pub teleport_pairs: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct VenueSummary {
    pub floors: Vec<FloorSummary>,
    pub portals: Vec<Portal>,
    /// Routable portals with no counterpart on their declared floor.
    pub unmatched: Vec<String>,
}

/// Every floor of a building plus the connectors between them.
#[derive(Clone, Debug)]
pub struct Venue {
    floors: BTreeMap<FloorId, Floor>,
    portals: Vec<Portal>,
    teleports: Vec<TeleportPair>,
    options: RoutingOptions,
}

impl Venue {
    /// Floors are built first; portals are resolved only once every floor exists.
    pub fn build(data: &VenueData, options: &RoutingOptions) -> Result<Self> {
        if data.floors.is_empty() {
            return Err(NavError::EmptyInput);
        }
        let mut floors = BTreeMap::new();
        for fd in &data.floors {
            if floors.contains_key(&fd.floor) {
                warn!(floor = %fd.floor, "duplicate floor definition ignored");
                continue;
            }
            floors.insert(fd.floor, Floor::build(fd, options));
        }
        let portals: Vec<Portal> = data.portals.iter().map(|p| resolve_portal(&floors, p)).collect();
        let teleports = TeleportPair::collect(&portals);
        info!(floors = floors.len(), portals = portals.len(), teleport_pairs = teleports.len(), "venue built");
        Ok(Venue { floors, portals, teleports, options: options.clone() })
    }

    pub fn options(&self) -> &RoutingOptions {
        &self.options
    }

    pub fn floor(&self, id: FloorId) -> Result<&Floor> {
        self.floors.get(&id).ok_or(NavError::UnknownFloor(id))
    }

    pub fn floors(&self) -> impl Iterator<Item = &Floor> {
        self.floors.values()
    }

    pub fn room(&self, floor: FloorId, room_id: &str) -> Result<&Room> {
        self.floor(floor)?.room(room_id)
    }

    pub fn access_point(&self, floor: FloorId, room_id: &str) -> Result<Point> {
        self.floor(floor)?.access_point(room_id)
    }

    pub fn portals(&self) -> &[Portal] {
        &self.portals
    }

    /// All declared elevators and stairs on `floor`, active or not.
    pub fn portals_on(&self, floor: FloorId) -> impl Iterator<Item = &Portal> {
        self.portals.iter().filter(move |p| p.floor == floor && p.is_cross_floor())
    }

    pub fn routable_portals_on(&self, floor: FloorId) -> impl Iterator<Item = &Portal> {
        self.portals_on(floor).filter(|p| p.is_routable())
    }

    pub fn teleports_on(&self, floor: FloorId) -> impl Iterator<Item = &TeleportPair> {
        self.teleports.iter().filter(move |t| t.floor == floor)
    }

    /// Neighbour view of `floor`: walk edges plus the Stop links currently licensed.
    pub fn neighbors(&self, floor: FloorId) -> Result<NeighborProvider<'_>> {
        let f = self.floor(floor)?;
        if !self.options.use_teleports {
            return Ok(NeighborProvider::walk_only(&f.graph));
        }
        let links: Vec<TeleportLink> = self.teleports_on(floor).flat_map(|t| t.links()).collect();
        Ok(NeighborProvider::with_teleports(&f.graph, &links, self.options.teleport_weight))
    }

    /// Shortest path on `floor` between the nodes nearest `a` and `b`.
    pub fn find_path(&self, floor: FloorId, a: Point, b: Point) -> Option<PathResult> {
        let provider = self.neighbors(floor).ok()?;
        engine::find_path(&provider, a, b)
    }

    pub fn try_find_path(&self, floor: FloorId, a: Point, b: Point) -> Result<PathResult> {
        let provider = self.neighbors(floor)?;
        engine::find_path(&provider, a, b).ok_or(NavError::NoPathFound)
    }

    /// The active counterpart of `source` on `floor`.
    pub fn resolve_match(&self, source: &Portal, floor: FloorId) -> Result<&Portal> {
        find_match(self.routable_portals_on(floor), source).ok_or(NavError::UnresolvedPortal {
            kind: source.kind(),
            number: source.number(),
            floor,
        })
    }

    /// Like [`Venue::resolve_match`], but an unresolved connector yields a
    /// virtual portal instead of an error.
    pub fn match_portal(&self, source: &Portal, floor: FloorId) -> Portal {
        match self.resolve_match(source, floor) {
            Ok(p) => p.clone(),
            Err(e) => {
                warn!(portal = %source.id, error = %e, "using virtual portal");
                Portal::virtual_counterpart(source, floor)
            }
        }
    }

    pub fn summary(&self) -> VenueSummary {
        let floors = self
            .floors
            .values()
            .map(|f| FloorSummary {
                floor: f.id,
                nodes: f.graph.node_count(),
                edges: f.graph.edge_count(),
                rooms: f.rooms.len(),
                doors: f.doors.len(),
                portals: self.portals_on(f.id).count(),
                active_portals: self.routable_portals_on(f.id).count(),
                teleport_pairs: self.teleports_on(f.id).count(),
            })
            .collect();
        let unmatched = self
            .portals
            .iter()
            .filter(|p| p.is_routable())
            .filter(|p| p.declared_target().map_or(false, |t| self.resolve_match(p, t).is_err()))
            .map(|p| format!("{}@{}", p.id, p.floor))
            .collect();
        VenueSummary { floors, portals: self.portals.clone(), unmatched }
    }
}

/// Centre of the door closest to `to`; the first one wins on ties.
fn nearest_door<'a>(doors: impl Iterator<Item = &'a Door>, to: Point) -> Option<Point> {
    let mut best: Option<(Point, f64)> = None;
    for d in doors {
        let dist = d.center.distance(to);
        if best.map_or(true, |(_, b)| dist < b) {
            best = Some((d.center, dist));
        }
    }
    best.map(|(p, _)| p)
}

fn resolve_portal(floors: &BTreeMap<FloorId, Floor>, input: &PortalInput) -> Portal {
    let label = PortalLabel::parse_lenient(&input.id);
    let center = match floors.get(&input.floor) {
        Some(f) => f.portal_center(&input.id),
        None => {
            warn!(portal = %input.id, floor = %input.floor, "portal on undeclared floor");
            None
        }
    };
    if center.is_none() && label.kind != PortalKind::Unknown {
        debug!(portal = %input.id, floor = %input.floor, "portal centre unresolved");
    }
    Portal { id: input.id.clone(), label, floor: input.floor, center, active: input.is_on(), is_virtual: false }
}
