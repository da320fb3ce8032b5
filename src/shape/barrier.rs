//! Wall pieces bounding the drivable surface
//!
//! Walls sit on the outward side of the boundary, which is always to the
//! left of the clockwise travel direction. Every piece is convex.

use crate::geometry::{PathSegment, Point, Polygon};

/// Constant-thickness strip along a straight wall from `start` to `end`.
pub fn line_wall(start: Point, end: Point, thickness: f32) -> Option<Polygon> {
    let along = end - start;
    if along.length() < 1e-5 {
        return None;
    }
    let outward = along.normalized().ccw_perp() * thickness;
    Some(Polygon::new(vec![start, end, end + outward, start + outward]))
}

/// Trapezoids hugging an arc wall, one per arc piece. The road-side
/// vertices lie exactly on the arc so they match the flattened boundary.
pub fn arc_wall(
    center: Point,
    radius: f32,
    start_angle: f32,
    sweep: f32,
    thickness: f32,
    pieces: usize,
) -> Vec<Polygon> {
    // Clockwise arcs keep the road inside the circle.
    let far_radius = if sweep > 0.0 {
        radius + thickness
    } else {
        (radius - thickness).max(0.0)
    };

    let pieces = pieces.max(1);
    (0..pieces)
        .map(|i| {
            let a0 = start_angle + sweep * i as f32 / pieces as f32;
            let a1 = start_angle + sweep * (i + 1) as f32 / pieces as f32;
            let u0 = Point::from_angle(a0);
            let u1 = Point::from_angle(a1);
            Polygon::new(vec![
                center + u0 * radius,
                center + u1 * radius,
                center + u1 * far_radius,
                center + u0 * far_radius,
            ])
        })
        .collect()
}

/// Walls for one boundary segment, split the same way the segment flattens.
pub fn segment_walls(segment: &PathSegment, thickness: f32, max_step: f32) -> Vec<Polygon> {
    match *segment {
        PathSegment::Line { start, end } => line_wall(start, end, thickness).into_iter().collect(),
        PathSegment::Arc { center, radius, start_angle, sweep, .. } => arc_wall(
            center,
            radius,
            start_angle,
            sweep,
            thickness,
            segment.pieces(max_step),
        ),
    }
}
