use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A coordinate in a floor's drawing space. Serialized as `[x, y]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Vector from `self` to `other`.
    pub fn delta(self, other: Point) -> (f64, f64) {
        (other.x - self.x, other.y - self.y)
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

impl From<[f64; 2]> for Point {
    fn from(v: [f64; 2]) -> Self {
        Point::new(v[0], v[1])
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl From<(f64, f64)> for Point {
    fn from(v: (f64, f64)) -> Self {
        Point::new(v.0, v.1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub a: Point,
    pub b: Point,
}

impl Segment {
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    pub fn length(&self) -> f64 {
        self.a.distance(self.b)
    }
}

/// Vertex average of an outline. `None` for an empty outline.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point::new(sx / n, sy / n))
}

/// Total length of a polyline.
pub fn polyline_length(points: &[Point]) -> f64 {
    points.iter().tuple_windows().map(|(a, b)| a.distance(*b)).sum()
}

/// First segment's start followed by every segment's end.
pub fn segments_to_points(segments: &[Segment]) -> Vec<Point> {
    let Some(first) = segments.first() else { return Vec::new() };
    let mut points = Vec::with_capacity(segments.len() + 1);
    points.push(first.a);
    points.extend(segments.iter().map(|s| s.b));
    points
}

pub fn points_to_segments(points: &[Point]) -> Vec<Segment> {
    points.iter().tuple_windows().map(|(a, b)| Segment::new(*a, *b)).collect()
}
