//! Planar geometry used by tile shapes, barriers and sensors
//!
//! Coordinates are in screen convention (+y south). Angles follow `atan2`
//! in that frame, so a positive sweep runs clockwise on screen.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Tolerance used when comparing coordinates.
pub const EPSILON: f32 = 1e-3;

// =============================================================================
// POINT
// =============================================================================

/// A point or vector in the plane
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector at `angle` radians.
    pub fn from_angle(angle: f32) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Point) -> f32 {
        (self - other).length()
    }

    pub fn dot(self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product. Positive when `other` is
    /// clockwise from `self` on screen.
    pub fn cross(self, other: Point) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// Angle of this vector as seen by `atan2`.
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    pub fn normalized(self) -> Self {
        let len = self.length();
        if len > 1e-9 {
            Self::new(self.x / len, self.y / len)
        } else {
            Self::ZERO
        }
    }

    /// Rotate a quarter turn clockwise on screen (north becomes east).
    pub fn cw_perp(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Rotate a quarter turn counter-clockwise on screen (north becomes west).
    pub fn ccw_perp(self) -> Self {
        Self::new(self.y, -self.x)
    }

    pub fn approx_eq(self, other: Point, tolerance: f32) -> bool {
        self.distance(other) <= tolerance
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;
    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Intersection of the lines `a + s*da` and `b + t*db`, or `None` if parallel.
pub fn line_intersection(a: Point, da: Point, b: Point, db: Point) -> Option<Point> {
    let denom = da.cross(db);
    if denom.abs() < 1e-9 {
        return None;
    }
    let s = (b - a).cross(db) / denom;
    Some(a + da * s)
}

/// Whether the closed segments `p1-p2` and `q1-q2` cross or touch.
pub fn segments_intersect(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = (p2 - p1).cross(q1 - p1);
    let d2 = (p2 - p1).cross(q2 - p1);
    let d3 = (q2 - q1).cross(p1 - q1);
    let d4 = (q2 - q1).cross(p2 - q1);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    let on_segment = |a: Point, b: Point, p: Point, d: f32| {
        d.abs() < 1e-6
            && p.x >= a.x.min(b.x) - 1e-6
            && p.x <= a.x.max(b.x) + 1e-6
            && p.y >= a.y.min(b.y) - 1e-6
            && p.y <= a.y.max(b.y) + 1e-6
    };
    on_segment(p1, p2, q1, d1)
        || on_segment(p1, p2, q2, d2)
        || on_segment(q1, q2, p1, d3)
        || on_segment(q1, q2, p2, d4)
}

/// Number of pieces an arc of `sweep` radians is split into so that no piece
/// exceeds `max_step` radians.
pub fn arc_pieces(sweep: f32, max_step: f32) -> usize {
    ((sweep.abs() / max_step) - 1e-4).ceil().max(1.0) as usize
}

// =============================================================================
// POLYGON
// =============================================================================

/// A simple polygon given by its vertices (implicitly closed)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    /// Build a polygon, dropping consecutive duplicate vertices.
    pub fn new(points: Vec<Point>) -> Self {
        let mut deduped: Vec<Point> = Vec::with_capacity(points.len());
        for p in points {
            if deduped.last().map_or(true, |last| !last.approx_eq(p, 1e-6)) {
                deduped.push(p);
            }
        }
        while deduped.len() > 1 && deduped[0].approx_eq(deduped[deduped.len() - 1], 1e-6) {
            deduped.pop();
        }
        Self { points: deduped }
    }

    /// Shoelace area; positive when the vertices run clockwise on screen.
    pub fn signed_area(&self) -> f32 {
        signed_area(&self.points)
    }

    /// Whether every turn along the outline goes the same way.
    /// Collinear vertices are tolerated.
    pub fn is_convex(&self) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut sign = 0.0f32;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let c = self.points[(i + 2) % n];
            let turn = (b - a).cross(c - b);
            if turn.abs() < 1e-5 {
                continue;
            }
            if sign == 0.0 {
                sign = turn.signum();
            } else if turn.signum() != sign {
                return false;
            }
        }
        sign != 0.0
    }

    /// Even-odd point containment.
    pub fn contains(&self, p: Point) -> bool {
        contains_point(&self.points, p)
    }

    pub fn translated(&self, offset: Point) -> Self {
        Self {
            points: self.points.iter().map(|&p| p + offset).collect(),
        }
    }
}

pub fn signed_area(points: &[Point]) -> f32 {
    let n = points.len();
    let mut sum = 0.0;
    for i in 0..n {
        sum += points[i].cross(points[(i + 1) % n]);
    }
    sum / 2.0
}

pub fn contains_point(points: &[Point], p: Point) -> bool {
    let n = points.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let a = points[i];
        let b = points[j];
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

pub fn bounds(points: &[Point]) -> (Point, Point) {
    let mut min = Point::new(f32::MAX, f32::MAX);
    let mut max = Point::new(f32::MIN, f32::MIN);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    (min, max)
}

// =============================================================================
// BOUNDARY PATHS
// =============================================================================

/// One piece of a boundary outline
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PathSegment {
    Line {
        start: Point,
        end: Point,
    },
    /// Circular arc; `sweep` is signed, positive = clockwise on screen.
    Arc {
        center: Point,
        radius: f32,
        start_angle: f32,
        sweep: f32,
        /// Fixed number of straight pieces, overriding the step split
        #[serde(default)]
        pieces: Option<u32>,
    },
}

impl PathSegment {
    pub fn start(&self) -> Point {
        match *self {
            PathSegment::Line { start, .. } => start,
            PathSegment::Arc { center, radius, start_angle, .. } => {
                center + Point::from_angle(start_angle) * radius
            }
        }
    }

    pub fn end(&self) -> Point {
        match *self {
            PathSegment::Line { end, .. } => end,
            PathSegment::Arc { center, radius, start_angle, sweep, .. } => {
                center + Point::from_angle(start_angle + sweep) * radius
            }
        }
    }

    /// Number of straight pieces this segment flattens into. Arcs split
    /// into pieces of at most `max_step` radians unless their count is fixed.
    pub fn pieces(&self, max_step: f32) -> usize {
        match *self {
            PathSegment::Line { .. } => 1,
            PathSegment::Arc { pieces: Some(n), .. } => n.max(1) as usize,
            PathSegment::Arc { sweep, .. } => arc_pieces(sweep, max_step),
        }
    }

    /// Append the points after the start of this segment.
    pub fn flatten_into(&self, out: &mut Vec<Point>, max_step: f32) {
        match *self {
            PathSegment::Line { end, .. } => out.push(end),
            PathSegment::Arc { center, radius, start_angle, sweep, .. } => {
                let pieces = self.pieces(max_step);
                for i in 1..=pieces {
                    let angle = start_angle + sweep * i as f32 / pieces as f32;
                    out.push(center + Point::from_angle(angle) * radius);
                }
            }
        }
    }

    pub fn translated(&self, offset: Point) -> Self {
        match *self {
            PathSegment::Line { start, end } => PathSegment::Line {
                start: start + offset,
                end: end + offset,
            },
            PathSegment::Arc { center, radius, start_angle, sweep, pieces } => PathSegment::Arc {
                center: center + offset,
                radius,
                start_angle,
                sweep,
                pieces,
            },
        }
    }
}

/// A chain of line and arc segments, each starting where the previous ended.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPath {
    pub segments: Vec<PathSegment>,
}

impl BoundaryPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a straight line; lines shorter than [`EPSILON`] are skipped.
    pub fn line(&mut self, start: Point, end: Point) {
        if start.distance(end) > EPSILON {
            self.segments.push(PathSegment::Line { start, end });
        }
    }

    pub fn arc(&mut self, center: Point, radius: f32, start_angle: f32, sweep: f32) {
        self.push_arc(center, radius, start_angle, sweep, None);
    }

    /// Arc that always flattens (and is walled) in exactly `pieces` pieces.
    pub fn arc_in_pieces(&mut self, center: Point, radius: f32, start_angle: f32, sweep: f32, pieces: u32) {
        self.push_arc(center, radius, start_angle, sweep, Some(pieces));
    }

    fn push_arc(&mut self, center: Point, radius: f32, start_angle: f32, sweep: f32, pieces: Option<u32>) {
        if radius > 1e-5 && sweep.abs() > 1e-6 {
            self.segments.push(PathSegment::Arc { center, radius, start_angle, sweep, pieces });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether every segment starts where the previous one ended, including
    /// the wrap from the last segment back to the first.
    pub fn is_closed(&self, tolerance: f32) -> bool {
        if self.segments.is_empty() {
            return false;
        }
        let n = self.segments.len();
        (0..n).all(|i| {
            self.segments[i]
                .end()
                .approx_eq(self.segments[(i + 1) % n].start(), tolerance)
        })
    }

    /// Flatten to a closed polyline (the first point is not repeated).
    pub fn flatten(&self, max_step: f32) -> Vec<Point> {
        let mut out = Vec::new();
        for segment in &self.segments {
            segment.flatten_into(&mut out, max_step);
        }
        out
    }

    pub fn translated(&self, offset: Point) -> Self {
        Self {
            segments: self.segments.iter().map(|s| s.translated(offset)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_perpendiculars() {
        let north = Point::new(0.0, -1.0);
        assert!(north.cw_perp().approx_eq(Point::new(1.0, 0.0), 1e-6));
        assert!(north.ccw_perp().approx_eq(Point::new(-1.0, 0.0), 1e-6));
        // East is clockwise from north on screen.
        assert!(north.cross(Point::new(1.0, 0.0)) > 0.0);
    }

    #[test]
    fn test_line_intersection() {
        let p = line_intersection(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, -3.0),
            Point::new(0.0, 1.0),
        )
        .unwrap();
        assert!(p.approx_eq(Point::new(2.0, 0.0), 1e-6));
        assert!(line_intersection(Point::ZERO, Point::new(1.0, 0.0), Point::new(0.0, 1.0), Point::new(2.0, 0.0)).is_none());
    }

    #[test]
    fn test_segments_intersect() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(2.0, 2.0);
        assert!(segments_intersect(a, b, Point::new(0.0, 2.0), Point::new(2.0, 0.0)));
        assert!(!segments_intersect(a, b, Point::new(3.0, 0.0), Point::new(4.0, 0.0)));
        // Touching at an endpoint counts.
        assert!(segments_intersect(a, b, b, Point::new(5.0, 0.0)));
    }

    #[test]
    fn test_arc_endpoints_and_flatten() {
        let arc = PathSegment::Arc {
            center: Point::ZERO,
            radius: 2.0,
            start_angle: 0.0,
            sweep: PI,
            pieces: None,
        };
        assert!(arc.start().approx_eq(Point::new(2.0, 0.0), 1e-5));
        assert!(arc.end().approx_eq(Point::new(-2.0, 0.0), 1e-5));

        let mut pts = Vec::new();
        arc.flatten_into(&mut pts, PI / 6.0);
        assert_eq!(pts.len(), 6);
        // Clockwise on screen passes through +y (south).
        assert!(pts[2].approx_eq(Point::new(0.0, 2.0), 1e-5));
    }

    #[test]
    fn test_arc_pieces_exact_multiples() {
        assert_eq!(arc_pieces(FRAC_PI_2, PI / 6.0), 3);
        assert_eq!(arc_pieces(PI / 4.0, PI / 6.0), 2);
        assert_eq!(arc_pieces(0.01, PI / 6.0), 1);
    }

    #[test]
    fn test_fixed_piece_count_overrides_step() {
        let mut path = BoundaryPath::new();
        path.arc_in_pieces(Point::ZERO, 5.0, 0.0, PI, 4);
        assert_eq!(path.segments[0].pieces(PI / 6.0), 4);
        let pts = path.flatten(PI / 6.0);
        assert_eq!(pts.len(), 4);
        assert!(pts[1].approx_eq(Point::new(0.0, 5.0), 1e-5));
    }

    #[test]
    fn test_polygon_area_and_convexity() {
        let square = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]);
        assert!((square.signed_area() - 1.0).abs() < 1e-6);
        assert!(square.is_convex());
        assert!(square.contains(Point::new(0.5, 0.5)));
        assert!(!square.contains(Point::new(1.5, 0.5)));

        let dart = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 1.0),
            Point::new(0.0, 2.0),
            Point::new(0.5, 1.0),
        ]);
        assert!(!dart.is_convex());
    }

    #[test]
    fn test_polygon_dedup() {
        let tri = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(0.0, 0.0),
        ]);
        assert_eq!(tri.points.len(), 3);
    }

    #[test]
    fn test_closed_path() {
        let mut path = BoundaryPath::new();
        path.line(Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        path.line(Point::new(1.0, 0.0), Point::new(1.0, 1.0));
        assert!(!path.is_closed(EPSILON));
        path.line(Point::new(1.0, 1.0), Point::new(0.0, 0.0));
        assert!(path.is_closed(EPSILON));
        assert_eq!(path.flatten(0.5).len(), 3);
    }
}
