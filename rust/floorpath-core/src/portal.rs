//! Elevators, stairs and same-floor Stop connectors.
//!
//! Labels have the form `type.number.target`: `Elevator.2.-1` is elevator 2
//! leading to floor -1, `Stop.4.A` is side A of Stop pair 4.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::NavError;
use crate::geometry::Point;
use crate::graph::TeleportLink;
use crate::models::FloorId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PortalKind {
    Elevator,
    Stairs,
    Stop,
    Unknown,
}

impl PortalKind {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "elevator" | "elev" | "lift" => Some(PortalKind::Elevator),
            "stairs" | "staircase" | "stair" => Some(PortalKind::Stairs),
            "stop" => Some(PortalKind::Stop),
            _ => None,
        }
    }
}

impl fmt::Display for PortalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PortalKind::Elevator => "Elevator",
            PortalKind::Stairs => "Stairs",
            PortalKind::Stop => "Stop",
            PortalKind::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StopSide {
    A,
    B,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortalTarget {
    Floor(FloorId),
    Side(StopSide),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortalLabel {
    pub kind: PortalKind,
    pub number: u32,
    pub target: PortalTarget,
}

impl PortalLabel {
    /// Stand-in for labels that do not parse. Kept so malformed venue data
    /// still loads; portals carrying it are never used for routing.
    pub const UNKNOWN: PortalLabel =
        PortalLabel { kind: PortalKind::Unknown, number: 0, target: PortalTarget::Floor(FloorId(0)) };

    pub fn parse(label: &str) -> Result<Self, NavError> {
        let invalid = || NavError::InvalidLabel(label.to_string());
        let mut parts = label.trim().splitn(3, '.');
        let (Some(kind), Some(number), Some(target)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        let kind = PortalKind::parse(kind).ok_or_else(invalid)?;
        let number = number.trim().parse::<u32>().map_err(|_| invalid())?;
        let target = target.trim();
        let target = match kind {
            PortalKind::Stop => match target {
                "A" | "a" => PortalTarget::Side(StopSide::A),
                "B" | "b" => PortalTarget::Side(StopSide::B),
                _ => return Err(invalid()),
            },
            _ => PortalTarget::Floor(target.parse::<FloorId>().map_err(|_| invalid())?),
        };
        Ok(PortalLabel { kind, number, target })
    }

    /// Parse, falling back to [`PortalLabel::UNKNOWN`] with a warning.
    pub fn parse_lenient(label: &str) -> Self {
        Self::parse(label).unwrap_or_else(|e| {
            warn!(label, error = %e, "unparsable portal label, treating as Unknown");
            Self::UNKNOWN
        })
    }

    pub fn declared_floor(&self) -> Option<FloorId> {
        match self.target {
            PortalTarget::Floor(f) => Some(f),
            PortalTarget::Side(_) => None,
        }
    }
}

impl FromStr for PortalLabel {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PortalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            PortalTarget::Floor(floor) => write!(f, "{}.{}.{}", self.kind, self.number, floor),
            PortalTarget::Side(side) => write!(f, "{}.{}.{:?}", self.kind, self.number, side),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Portal {
    pub id: String,
    pub label: PortalLabel,
    pub floor: FloorId,
    pub center: Option<Point>,
    pub active: bool,
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
}

impl Portal {
    pub fn kind(&self) -> PortalKind {
        self.label.kind
    }

    pub fn number(&self) -> u32 {
        self.label.number
    }

    pub fn declared_target(&self) -> Option<FloorId> {
        self.label.declared_floor()
    }

    /// Elevators and stairs with a parsed target floor.
    pub fn is_cross_floor(&self) -> bool {
        matches!(self.kind(), PortalKind::Elevator | PortalKind::Stairs) && self.declared_target().is_some()
    }

    pub fn is_routable(&self) -> bool {
        self.active && !self.is_virtual && self.is_cross_floor()
    }

    /// Same connector: equal kind and number.
    pub fn matches(&self, other: &Portal) -> bool {
        self.kind() == other.kind() && self.number() == other.number()
    }

    /// Placeholder counterpart on `floor` for a connector that has no drawn end there.
    pub fn virtual_counterpart(source: &Portal, floor: FloorId) -> Portal {
        let label = PortalLabel { target: PortalTarget::Floor(source.floor), ..source.label };
        Portal { id: label.to_string(), label, floor, center: None, active: false, is_virtual: true }
    }

    pub fn distance_to(&self, p: Point) -> f64 {
        self.center.map_or(f64::INFINITY, |c| c.distance(p))
    }
}

/// First portal among `candidates` matching `source` by kind and number.
pub fn find_match<'a, I>(candidates: I, source: &Portal) -> Option<&'a Portal>
where
    I: IntoIterator<Item = &'a Portal>,
{
    candidates.into_iter().find(|p| p.matches(source))
}

/// Two ends of one same-floor connector. Each side's own `active` flag
/// licenses travel away from that side only.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TeleportPair {
    pub floor: FloorId,
    pub number: u32,
    pub a: Portal,
    pub b: Portal,
}

impl TeleportPair {
    /// Pair up every declared Stop by floor and number, regardless of activity.
    pub fn collect(portals: &[Portal]) -> Vec<TeleportPair> {
        let mut sides: std::collections::BTreeMap<(FloorId, u32), (Option<&Portal>, Option<&Portal>)> =
            std::collections::BTreeMap::new();
        for p in portals.iter().filter(|p| p.kind() == PortalKind::Stop) {
            let PortalTarget::Side(side) = p.label.target else { continue };
            let slot = sides.entry((p.floor, p.number())).or_default();
            let entry = match side {
                StopSide::A => &mut slot.0,
                StopSide::B => &mut slot.1,
            };
            if entry.is_some() {
                warn!(portal = %p.id, floor = %p.floor, "duplicate stop side ignored");
                continue;
            }
            *entry = Some(p);
        }
        let mut pairs = Vec::new();
        for ((floor, number), (a, b)) in sides {
            match (a, b) {
                (Some(a), Some(b)) => pairs.push(TeleportPair { floor, number, a: a.clone(), b: b.clone() }),
                _ => warn!(%floor, number, "stop without its opposite side"),
            }
        }
        pairs
    }

    /// Directed links currently licensed: A→B when A is active, B→A when B is.
    pub fn links(&self) -> Vec<TeleportLink> {
        let (Some(ca), Some(cb)) = (self.a.center, self.b.center) else { return Vec::new() };
        let mut links = Vec::with_capacity(2);
        if self.a.active {
            links.push(TeleportLink { from: ca, to: cb });
        }
        if self.b.active {
            links.push(TeleportLink { from: cb, to: ca });
        }
        links
    }
}
