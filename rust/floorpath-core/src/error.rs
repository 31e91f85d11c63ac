use thiserror::Error;

use crate::models::FloorId;
use crate::portal::PortalKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavError {
    #[error("nothing to route over")]
    EmptyInput,
    #[error("no path between the snapped start and end nodes")]
    NoPathFound,
    #[error("zero-length direction vector")]
    DegenerateInput,
    #[error("no {kind} {number} on floor {floor}")]
    UnresolvedPortal { kind: PortalKind, number: u32, floor: FloorId },
    #[error("transition planning failed: {reason}")]
    TransitionPlanningFailed { reason: String },
    #[error("unknown floor {0}")]
    UnknownFloor(FloorId),
    #[error("unknown room {room} on floor {floor}")]
    UnknownRoom { floor: FloorId, room: String },
    #[error("invalid portal label: {0}")]
    InvalidLabel(String),
}

impl NavError {
    /// True for errors caused by a request naming something the venue does not contain.
    pub fn is_structural(&self) -> bool {
        matches!(self, NavError::UnknownFloor(_) | NavError::UnknownRoom { .. })
    }
}

pub type Result<T> = std::result::Result<T, NavError>;
