//! Compass bearings from point pairs and path geometry.
//!
//! Angles are compass headings: 0° is North, increasing clockwise. Which
//! drawing axis points North is set by [`YAxis`].

use serde::{Deserialize, Serialize};

use crate::error::{NavError, Result};
use crate::geometry::{Point, Segment};
use crate::options::RoutingOptions;

/// Orientation of the drawing's y axis relative to North.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YAxis {
    /// y grows downward (SVG and screen space); -y is North.
    #[default]
    Down,
    /// y grows upward; +y is North.
    Up,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassPoint {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

const SIXTEEN: [CompassPoint; 16] = [
    CompassPoint::N,
    CompassPoint::NNE,
    CompassPoint::NE,
    CompassPoint::ENE,
    CompassPoint::E,
    CompassPoint::ESE,
    CompassPoint::SE,
    CompassPoint::SSE,
    CompassPoint::S,
    CompassPoint::SSW,
    CompassPoint::SW,
    CompassPoint::WSW,
    CompassPoint::W,
    CompassPoint::WNW,
    CompassPoint::NW,
    CompassPoint::NNW,
];

impl CompassPoint {
    /// Nearest of the eight principal directions; each sector spans ±22.5°.
    pub fn eight_point(angle: f64) -> Self {
        let a = normalize_degrees(angle);
        let sector = ((a + 22.5) / 45.0).floor() as usize % 8;
        SIXTEEN[sector * 2]
    }

    /// Nearest of sixteen directions; each sector spans ±11.25°.
    pub fn sixteen_point(angle: f64) -> Self {
        let a = normalize_degrees(angle);
        SIXTEEN[(a / 22.5).round() as usize % 16]
    }

    pub fn name(self) -> &'static str {
        match self {
            CompassPoint::N => "North",
            CompassPoint::NNE => "North-Northeast",
            CompassPoint::NE => "Northeast",
            CompassPoint::ENE => "East-Northeast",
            CompassPoint::E => "East",
            CompassPoint::ESE => "East-Southeast",
            CompassPoint::SE => "Southeast",
            CompassPoint::SSE => "South-Southeast",
            CompassPoint::S => "South",
            CompassPoint::SSW => "South-Southwest",
            CompassPoint::SW => "Southwest",
            CompassPoint::WSW => "West-Southwest",
            CompassPoint::W => "West",
            CompassPoint::WNW => "West-Northwest",
            CompassPoint::NW => "Northwest",
            CompassPoint::NNW => "North-Northwest",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bearing {
    /// Heading in [0, 360), clockwise from North.
    pub compass_angle: f64,
    /// Mathematical angle of the direction vector, `atan2(dy, dx)` in degrees.
    pub angle_degrees: f64,
    /// Unit direction in drawing space.
    pub direction: [f64; 2],
    pub compass: CompassPoint,
    pub compass16: CompassPoint,
    /// In [0, 1].
    pub confidence: f64,
    pub start: Point,
    pub end: Point,
    /// Straight-line length for direct bearings, usable path length otherwise.
    pub distance: f64,
    pub segments_used: usize,
}

impl Bearing {
    fn from_unit(dx: f64, dy: f64, y_axis: YAxis) -> (f64, f64) {
        let angle_degrees = dy.atan2(dx).to_degrees();
        (compass_angle(angle_degrees, y_axis), angle_degrees)
    }

    /// Zero-confidence placeholder facing North, used when no direction is known.
    pub fn neutral(at: Point, y_axis: YAxis) -> Self {
        let direction = match y_axis {
            YAxis::Down => [0.0f64, -1.0],
            YAxis::Up => [0.0f64, 1.0],
        };
        Bearing {
            compass_angle: 0.0,
            angle_degrees: direction[1].atan2(direction[0]).to_degrees(),
            direction,
            compass: CompassPoint::N,
            compass16: CompassPoint::N,
            confidence: 0.0,
            start: at,
            end: at,
            distance: 0.0,
            segments_used: 0,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }
}

/// Convert a mathematical angle (degrees, counter-clockwise from +x in a y-up
/// frame) into a compass heading.
pub fn compass_angle(angle_degrees: f64, y_axis: YAxis) -> f64 {
    let raw = match y_axis {
        YAxis::Up => 90.0 - angle_degrees,
        YAxis::Down => 90.0 + angle_degrees,
    };
    normalize_degrees(raw)
}

pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Signed rotation from `current` to `target`, in (-180, 180].
pub fn heading_delta(current: f64, target: f64) -> f64 {
    let d = normalize_degrees(target - current);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

/// Whether `current` lies within ±`tolerance` degrees of `target`, across the 0/360 seam.
pub fn is_aligned(current: f64, target: f64, tolerance: f64) -> bool {
    heading_delta(current, target).abs() <= tolerance
}

#[derive(Clone, Copy, Debug)]
pub struct BearingEstimator {
    pub y_axis: YAxis,
    pub confidence_distance: f64,
    pub min_segment_length: f64,
    pub alignment_tolerance: f64,
}

impl Default for BearingEstimator {
    fn default() -> Self {
        Self::new(&RoutingOptions::default())
    }
}

impl BearingEstimator {
    pub fn new(options: &RoutingOptions) -> Self {
        Self {
            y_axis: options.y_axis,
            confidence_distance: options.confidence_distance,
            min_segment_length: options.min_segment_length,
            alignment_tolerance: options.alignment_tolerance_deg,
        }
    }

    /// Whether a live sensor `heading` agrees with `bearing` within the configured window.
    pub fn is_aligned(&self, heading: f64, bearing: &Bearing) -> bool {
        is_aligned(heading, bearing.compass_angle, self.alignment_tolerance)
    }

    /// Straight-line bearing from `p1` to `p2`.
    pub fn direct(&self, p1: Point, p2: Point) -> Result<Bearing> {
        let (dx, dy) = p1.delta(p2);
        let length = dx.hypot(dy);
        if !(length > 0.0) || !length.is_finite() {
            return Err(NavError::DegenerateInput);
        }
        let (ux, uy) = (dx / length, dy / length);
        let (compass_angle, angle_degrees) = Bearing::from_unit(ux, uy, self.y_axis);
        Ok(Bearing {
            compass_angle,
            angle_degrees,
            direction: [ux, uy],
            compass: CompassPoint::eight_point(compass_angle),
            compass16: CompassPoint::sixteen_point(compass_angle),
            confidence: (length / self.confidence_distance).min(1.0),
            start: p1,
            end: p2,
            distance: length,
            segments_used: 1,
        })
    }

    /// Chord bearing from the start of the first segment to the end of the
    /// last of the first `max_legs` segments. Gaps between segments are ignored.
    pub fn chord(&self, segments: &[Segment], max_legs: usize) -> Result<Bearing> {
        let used = &segments[..max_legs.min(segments.len())];
        let (Some(first), Some(last)) = (used.first(), used.last()) else {
            return Err(NavError::EmptyInput);
        };
        let bearing = self.direct(first.a, last.b)?;
        Ok(Bearing { segments_used: used.len(), ..bearing })
    }

    /// Length-weighted mean heading of the first `max_legs` segments of `points`.
    ///
    /// Segments shorter than `min_segment_length` are skipped but still count
    /// toward `max_legs`. Confidence rewards both coherence of the segment
    /// directions and the number of usable segments.
    pub fn along_path(&self, points: &[Point], max_legs: usize) -> Result<Bearing> {
        if points.len() < 2 {
            return Err(NavError::EmptyInput);
        }
        let legs = max_legs.min(points.len() - 1);
        let mut sum = (0.0f64, 0.0f64);
        let mut total = 0.0f64;
        let mut used = 0usize;
        for w in points[..=legs].windows(2) {
            let (dx, dy) = w[0].delta(w[1]);
            let length = dx.hypot(dy);
            if length < self.min_segment_length {
                continue;
            }
            // unit direction weighted by its own length is the raw vector
            sum.0 += dx;
            sum.1 += dy;
            total += length;
            used += 1;
        }
        if total <= 0.0 {
            return Err(NavError::DegenerateInput);
        }
        let (ax, ay) = (sum.0 / total, sum.1 / total);
        let magnitude = ax.hypot(ay);
        if !(magnitude > f64::EPSILON) {
            return Err(NavError::DegenerateInput);
        }
        let (ux, uy) = (ax / magnitude, ay / magnitude);
        let (compass_angle, angle_degrees) = Bearing::from_unit(ux, uy, self.y_axis);
        Ok(Bearing {
            compass_angle,
            angle_degrees,
            direction: [ux, uy],
            compass: CompassPoint::eight_point(compass_angle),
            compass16: CompassPoint::sixteen_point(compass_angle),
            confidence: (magnitude * used as f64 / max_legs as f64).min(1.0),
            start: points[0],
            end: points[points.len() - 1],
            distance: total,
            segments_used: used,
        })
    }
}
