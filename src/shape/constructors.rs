//! Boundary constructors, one per drivable turn class
//!
//! Each constructor appends the wall between two clockwise-adjacent exits,
//! running from the clockwise edge of the `from` mouth to the
//! counter-clockwise edge of the `to` mouth. The road is always on the
//! right of the direction of travel.

use std::f32::consts::PI;

use crate::direction::Direction;
use crate::error::{Result, TrackError};
use crate::geometry::{line_intersection, BoundaryPath, Point};
use crate::params::TrackParams;
use crate::track::TilePos;

/// Shortest straight stub or tangent distance treated as non-zero.
const MIN_REACH: f32 = 1e-3;

/// Where one exit's lane meets the tile edge, in tile-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaneEnd {
    pub direction: Direction,
    /// Unit vector pointing out of the tile through this exit
    pub outward: Point,
    /// Unit vector across the lane, clockwise from `outward`
    pub side: Point,
    /// Distance from the tile centre to the middle of the mouth
    pub reach: f32,
    /// Half the lane width in world units
    pub half_width: f32,
}

impl LaneEnd {
    pub fn new(direction: Direction, lane_width: f32, params: &TrackParams) -> Self {
        let outward = direction.unit();
        Self {
            direction,
            outward,
            side: outward.cw_perp(),
            reach: params.mouth_distance(direction),
            half_width: params.half_lane(lane_width),
        }
    }

    pub fn mouth_center(&self) -> Point {
        self.outward * self.reach
    }

    /// Lane edge on the clockwise side of the mouth.
    pub fn cw_edge(&self) -> Point {
        self.mouth_center() + self.side * self.half_width
    }

    /// Lane edge on the counter-clockwise side of the mouth.
    pub fn ccw_edge(&self) -> Point {
        self.mouth_center() - self.side * self.half_width
    }
}

// =============================================================================
// CONSTRUCTORS
// =============================================================================

/// Pieces in a dead-end cap, each a convex wall trapezoid.
pub const DEAD_END_PIECES: u32 = 4;

/// Single exit: a half circle of the lane's half width, centred on the
/// mouth, bulges into the tile and closes the end.
pub fn dead_end(end: &LaneEnd, path: &mut BoundaryPath) {
    path.arc_in_pieces(end.mouth_center(), end.half_width, end.side.angle(), PI, DEAD_END_PIECES);
}

/// Opposite exits: one straight wall, slanted if the widths differ.
pub fn straight(from: &LaneEnd, to: &LaneEnd, path: &mut BoundaryPath) {
    path.line(from.cw_edge(), to.ccw_edge());
}

/// Inner wall of a 90 degree left turn, centred on the tile corner.
pub fn left_90(pos: TilePos, from: &LaneEnd, to: &LaneEnd, path: &mut BoundaryPath) -> Result<()> {
    let radius = from.reach - from.half_width.max(to.half_width);
    fillet(pos, from, to, radius, path)
}

/// Outer wall of a 90 degree right turn, centred on the far tile corner.
pub fn right_90(pos: TilePos, from: &LaneEnd, to: &LaneEnd, path: &mut BoundaryPath) -> Result<()> {
    let radius = from.reach + from.half_width.min(to.half_width);
    fillet(pos, from, to, radius, path)
}

/// Wall of a 45 degree turn, left or right, between a cardinal and a
/// diagonal exit. Uses the largest radius whose tangent points stay between
/// the mouths; the fillet picks the bend direction from the exits.
pub fn gentle_45(pos: TilePos, from: &LaneEnd, to: &LaneEnd, path: &mut BoundaryPath) -> Result<()> {
    let (_, reach_from, reach_to) = wall_corner(from, to).ok_or_else(|| degenerate(pos, from, to))?;
    let radius = reach_from.min(reach_to) / (PI / 8.0).tan();
    fillet(pos, from, to, radius, path)
}

// =============================================================================
// FILLET
// =============================================================================

/// Where the wall leaving `from` meets the wall arriving at `to` if both
/// ran straight, plus the distance of that corner from each mouth edge.
fn wall_corner(from: &LaneEnd, to: &LaneEnd) -> Option<(Point, f32, f32)> {
    let a = from.cw_edge();
    let b = to.ccw_edge();
    let inbound = -from.outward;
    let corner = line_intersection(a, inbound, b, to.outward)?;
    Some((corner, (corner - a).dot(inbound), (b - corner).dot(to.outward)))
}

/// Straight stub, circular arc of `radius`, straight stub.
fn fillet(
    pos: TilePos,
    from: &LaneEnd,
    to: &LaneEnd,
    radius: f32,
    path: &mut BoundaryPath,
) -> Result<()> {
    let (corner, reach_from, reach_to) =
        wall_corner(from, to).ok_or_else(|| degenerate(pos, from, to))?;

    let d1 = -from.outward;
    let d2 = to.outward;
    let deflection = d1.dot(d2).clamp(-1.0, 1.0).acos();
    let tangent = radius * (deflection / 2.0).tan();

    if radius <= MIN_REACH
        || reach_from <= MIN_REACH
        || reach_to <= MIN_REACH
        || tangent > reach_from + MIN_REACH
        || tangent > reach_to + MIN_REACH
    {
        return Err(degenerate(pos, from, to));
    }

    let t1 = corner - d1 * tangent;
    let t2 = corner + d2 * tangent;

    // Positive cross product: clockwise turn, road inside the circle.
    let turn_sign = d1.cross(d2).signum();
    let normal = if turn_sign > 0.0 { d1.cw_perp() } else { d1.ccw_perp() };
    let center = t1 + normal * radius;

    path.line(from.cw_edge(), t1);
    path.arc(center, radius, (t1 - center).angle(), turn_sign * deflection);
    path.line(t2, to.ccw_edge());
    Ok(())
}

fn degenerate(pos: TilePos, from: &LaneEnd, to: &LaneEnd) -> TrackError {
    TrackError::DegenerateTurn {
        pos,
        from: from.direction,
        to: to.direction,
    }
}
