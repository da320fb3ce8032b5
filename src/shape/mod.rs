//! Tile shape synthesis: road boundary, barriers and mouths per tile
//!
//! A tile's exits are walked clockwise ([`ExitWalk`]); each pair of
//! neighbouring exits is classified by [`Turn::between`] and handed to one
//! of six constructors. The result is a single closed boundary traversed
//! clockwise with the road on its right, a set of convex barrier pieces
//! along every wall, and one open mouth per exit.
//!
//! All coordinates here are tile-local (origin at the tile centre).
//! [`TrackGeometry`] translates them into world space.

pub mod barrier;
pub mod constructors;
pub mod walk;

pub use walk::{ExitPair, ExitWalk};

use rayon::prelude::*;

use crate::direction::{Direction, Turn};
use crate::error::{Result, TrackError};
use crate::geometry::{bounds, BoundaryPath, Point, Polygon};
use crate::params::TrackParams;
use crate::sensor::{checkpoint_sensor, Sensor};
use crate::track::{CheckpointKind, Tile, TilePos, Track};

use constructors::LaneEnd;

// =============================================================================
// TILE SHAPE
// =============================================================================

/// Opening in the boundary where a lane leaves the tile
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mouth {
    pub direction: Direction,
    /// Edge reached first when walking the boundary clockwise
    pub ccw_edge: Point,
    pub cw_edge: Point,
}

impl Mouth {
    pub fn width(&self) -> f32 {
        self.ccw_edge.distance(self.cw_edge)
    }

    fn translated(&self, offset: Point) -> Self {
        Self {
            direction: self.direction,
            ccw_edge: self.ccw_edge + offset,
            cw_edge: self.cw_edge + offset,
        }
    }
}

/// Renderable and collidable geometry of one tile
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TileShape {
    pub pos: TilePos,
    /// Closed outline of the drivable surface, including the mouth lines
    pub boundary: BoundaryPath,
    pub barriers: Vec<Polygon>,
    pub mouths: Vec<Mouth>,
}

impl TileShape {
    /// Reset for reuse as a scratch buffer.
    pub fn clear(&mut self) {
        self.boundary.segments.clear();
        self.barriers.clear();
        self.mouths.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.boundary.is_empty()
    }

    /// Boundary as a closed polyline with arcs split like the barriers.
    pub fn outline(&self, params: &TrackParams) -> Vec<Point> {
        self.boundary.flatten(params.max_arc_step())
    }

    pub fn translated(&self, offset: Point) -> Self {
        Self {
            pos: self.pos,
            boundary: self.boundary.translated(offset),
            barriers: self.barriers.iter().map(|b| b.translated(offset)).collect(),
            mouths: self.mouths.iter().map(|m| m.translated(offset)).collect(),
        }
    }
}

// =============================================================================
// SYNTHESIS
// =============================================================================

/// Check that every neighbouring exit pair on a tile has a constructor.
pub fn validate_topology(pos: TilePos, tile: &Tile) -> Result<()> {
    for pair in ExitWalk::new(tile) {
        if !pair.turn.is_drivable() {
            return Err(malformed(pos, pair));
        }
    }
    Ok(())
}

/// Build the shape of one tile, or `None` if it has no exits.
pub fn synthesize_tile(pos: TilePos, tile: &Tile, params: &TrackParams) -> Result<Option<TileShape>> {
    let mut shape = TileShape::default();
    if synthesize_into(pos, tile, params, &mut shape)? {
        Ok(Some(shape))
    } else {
        Ok(None)
    }
}

/// Build the shape of one tile into a caller-owned buffer, which is cleared
/// first. Returns `false` (leaving the buffer empty) for a tile with no exits.
pub fn synthesize_into(
    pos: TilePos,
    tile: &Tile,
    params: &TrackParams,
    out: &mut TileShape,
) -> Result<bool> {
    out.clear();
    out.pos = pos;

    let thickness = params.barrier_thickness;
    let max_step = params.max_arc_step();

    for pair in ExitWalk::new(tile) {
        let (Some(from_exit), Some(to_exit)) = (tile.exit(pair.from), tile.exit(pair.to)) else {
            continue;
        };
        let from = LaneEnd::new(pair.from, from_exit.lane_width, params);
        let to = LaneEnd::new(pair.to, to_exit.lane_width, params);

        let first_new = out.boundary.segments.len();
        let path = &mut out.boundary;
        match pair.turn {
            Turn::UTurn => constructors::dead_end(&to, path),
            Turn::Straight => constructors::straight(&from, &to, path),
            Turn::Left90 => constructors::left_90(pos, &from, &to, path)?,
            Turn::Right90 => constructors::right_90(pos, &from, &to, path)?,
            Turn::Left45 | Turn::Right45 => constructors::gentle_45(pos, &from, &to, path)?,
            Turn::SharpLeft | Turn::SharpRight => {
                out.clear();
                return Err(malformed(pos, pair));
            }
        }

        for segment in &out.boundary.segments[first_new..] {
            out.barriers
                .extend(barrier::segment_walls(segment, thickness, max_step));
        }

        out.boundary.line(to.ccw_edge(), to.cw_edge());
        out.mouths.push(Mouth {
            direction: to.direction,
            ccw_edge: to.ccw_edge(),
            cw_edge: to.cw_edge(),
        });
    }

    Ok(!out.is_empty())
}

fn malformed(pos: TilePos, pair: ExitPair) -> TrackError {
    TrackError::MalformedTile {
        pos,
        from: pair.from,
        to: pair.to,
        turn: pair.turn,
    }
}

// =============================================================================
// TRACK GEOMETRY
// =============================================================================

/// World-space geometry for a whole track: every tile shape plus the start
/// and checkpoint sensors. Built all at once or not at all.
#[derive(Clone, Debug)]
pub struct TrackGeometry {
    pub tile_size: f32,
    /// Tile shapes in row-major tile order
    pub shapes: Vec<TileShape>,
    pub start: Sensor,
    pub checkpoints: Vec<Sensor>,
}

impl TrackGeometry {
    pub fn synthesize(track: &Track, params: &TrackParams) -> Result<Self> {
        params.validate()?;

        let tiles: Vec<(TilePos, Tile)> = track.tiles().map(|(pos, tile)| (pos, *tile)).collect();
        let shapes = tiles
            .par_iter()
            .map(|&(pos, tile)| {
                let shape = synthesize_tile(pos, &tile, params)?;
                Ok(shape.map(|s| {
                    log::debug!(
                        "tile {}: {} segments, {} barriers, {} mouths",
                        pos,
                        s.boundary.segments.len(),
                        s.barriers.len(),
                        s.mouths.len()
                    );
                    s.translated(pos.center(params.tile_size))
                }))
            })
            .collect::<Result<Vec<Option<TileShape>>>>()?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();

        let world_sensor = |kind: CheckpointKind| -> Result<Sensor> {
            let checkpoint = track
                .all_checkpoints()
                .find(|c| c.kind == kind)
                .ok_or(TrackError::NoStart)?;
            let tile = track.tile(checkpoint.tile).ok_or(match kind {
                CheckpointKind::Start => TrackError::MissingStartTile(checkpoint.tile),
                CheckpointKind::Numbered(_) => TrackError::MissingCheckpointTile(checkpoint.tile),
            })?;
            let sensor = checkpoint_sensor(tile, checkpoint, params)?;
            Ok(sensor.translated(checkpoint.tile.center(params.tile_size)))
        };

        let start = world_sensor(CheckpointKind::Start)?;
        let checkpoints = track
            .checkpoints()
            .iter()
            .map(|c| world_sensor(c.kind))
            .collect::<Result<Vec<_>>>()?;

        log::info!(
            "synthesized '{}': {} tile shapes, {} barriers, {} sensors",
            track.name(),
            shapes.len(),
            shapes.iter().map(|s| s.barriers.len()).sum::<usize>(),
            checkpoints.len() + 1
        );

        Ok(Self {
            tile_size: params.tile_size,
            shapes,
            start,
            checkpoints,
        })
    }

    pub fn shape(&self, pos: TilePos) -> Option<&TileShape> {
        self.shapes.iter().find(|s| s.pos == pos)
    }

    pub fn sensor(&self, kind: CheckpointKind) -> Option<&Sensor> {
        match kind {
            CheckpointKind::Start => Some(&self.start),
            CheckpointKind::Numbered(i) => self.checkpoints.get(i as usize),
        }
    }

    pub fn barrier_count(&self) -> usize {
        self.shapes.iter().map(|s| s.barriers.len()).sum()
    }

    /// World-space bounds covering every barrier, as (min, max).
    pub fn bounds(&self) -> (Point, Point) {
        let points: Vec<Point> = self
            .shapes
            .iter()
            .flat_map(|s| s.barriers.iter().flat_map(|b| b.points.iter().copied()))
            .collect();
        if points.is_empty() {
            return (Point::ZERO, Point::ZERO);
        }
        bounds(&points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{segments_intersect, signed_area, contains_point, EPSILON};
    use crate::track::{samples, TrackBuilder};

    /// Every exit subset with no two exits 45 degrees apart.
    fn drivable_subsets() -> Vec<Vec<Direction>> {
        (1u16..256)
            .filter(|bits| {
                let b = *bits as u8;
                b & b.rotate_left(1) == 0
            })
            .map(|bits| {
                Direction::ALL
                    .into_iter()
                    .filter(|d| bits & (1 << d.index()) != 0)
                    .collect()
            })
            .collect()
    }

    fn tile_with(dirs: &[Direction], widths: &[f32]) -> Tile {
        let exits: Vec<(Direction, f32)> = dirs
            .iter()
            .enumerate()
            .map(|(i, &d)| (d, widths[i % widths.len()]))
            .collect();
        Tile::with_exits(&exits)
    }

    fn dedup(points: Vec<Point>) -> Vec<Point> {
        let mut out: Vec<Point> = Vec::new();
        for p in points {
            if out.last().map_or(true, |q| !q.approx_eq(p, 1e-2)) {
                out.push(p);
            }
        }
        while out.len() > 1 && out[0].approx_eq(out[out.len() - 1], 1e-2) {
            out.pop();
        }
        out
    }

    fn assert_simple(points: &[Point], label: &str) {
        let n = points.len();
        for i in 0..n {
            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue;
                }
                let crosses = segments_intersect(
                    points[i],
                    points[(i + 1) % n],
                    points[j],
                    points[(j + 1) % n],
                );
                assert!(!crosses, "{}: segments {} and {} intersect", label, i, j);
            }
        }
    }

    fn check_shape(dirs: &[Direction], widths: &[f32]) {
        let params = TrackParams::default();
        let tile = tile_with(dirs, widths);
        let label = format!("{:?} widths {:?}", dirs, widths);
        let shape = synthesize_tile(TilePos::default(), &tile, &params)
            .unwrap_or_else(|e| panic!("{}: {}", label, e))
            .unwrap();

        assert!(shape.boundary.is_closed(1e-2), "{}: open boundary", label);
        assert_eq!(shape.mouths.len(), dirs.len(), "{}", label);

        // Each mouth spans exactly its lane width.
        for mouth in &shape.mouths {
            let exit = tile.exit(mouth.direction).unwrap();
            let expected = exit.lane_width * params.tile_size;
            assert!((mouth.width() - expected).abs() < 1e-2, "{}", label);
        }

        let outline = dedup(shape.outline(&params));
        assert!(signed_area(&outline) > 0.0, "{}: not clockwise", label);
        assert_simple(&outline, &label);

        for barrier in &shape.barriers {
            assert!(barrier.is_convex(), "{}: concave barrier", label);
            // Barriers sit outside the road.
            let n = barrier.points.len() as f32;
            let centroid = barrier.points.iter().fold(Point::ZERO, |acc, p| acc + *p) * (1.0 / n);
            assert!(!contains_point(&outline, centroid), "{}: barrier on road", label);
        }

        // Every wall vertex is backed by a barrier vertex; only mouths are open.
        let on_mouth = |p: Point| {
            shape.mouths.iter().any(|m| {
                let along = m.cw_edge - m.ccw_edge;
                let t = (p - m.ccw_edge).dot(along) / along.dot(along);
                t > 1e-3 && t < 1.0 - 1e-3 && (m.ccw_edge + along * t).approx_eq(p, 1e-2)
            })
        };
        for p in &outline {
            if on_mouth(*p) {
                continue;
            }
            let covered = shape
                .barriers
                .iter()
                .any(|b| b.points.iter().any(|q| q.approx_eq(*p, 1e-2)));
            assert!(covered, "{}: wall vertex {:?} has no barrier", label, p);
        }
    }

    #[test]
    fn test_drivable_subset_count() {
        // Independent sets of an 8-cycle, minus the empty set.
        assert_eq!(drivable_subsets().len(), 46);
        assert!(drivable_subsets().iter().all(|s| s.len() <= 4));
    }

    #[test]
    fn test_all_combinations_standard_width() {
        for dirs in drivable_subsets() {
            check_shape(&dirs, &[0.35]);
        }
    }

    #[test]
    fn test_all_combinations_extreme_widths() {
        for dirs in drivable_subsets() {
            check_shape(&dirs, &[0.1]);
            check_shape(&dirs, &[0.8]);
        }
    }

    #[test]
    fn test_all_combinations_mixed_widths() {
        for dirs in drivable_subsets() {
            check_shape(&dirs, &[0.2, 0.5]);
            check_shape(&dirs, &[0.5, 0.2]);
        }
    }

    #[test]
    fn test_empty_tile_produces_nothing() {
        let params = TrackParams::default();
        assert!(synthesize_tile(TilePos::default(), &Tile::new(), &params)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_adjacent_exits_are_malformed() {
        let params = TrackParams::default();
        let tile = Tile::with_exits(&[(Direction::North, 0.3), (Direction::NorthEast, 0.3)]);
        let err = synthesize_tile(TilePos::new(2, 2), &tile, &params).unwrap_err();
        assert!(matches!(
            err,
            TrackError::MalformedTile { turn: Turn::SharpLeft, .. }
        ));
        assert!(validate_topology(TilePos::new(2, 2), &tile).is_err());
    }

    #[test]
    fn test_dead_end_barriers() {
        let params = TrackParams::default();
        let tile = Tile::with_exits(&[(Direction::East, 0.35)]);
        let shape = synthesize_tile(TilePos::default(), &tile, &params).unwrap().unwrap();
        // Four cap pieces and nothing else.
        assert_eq!(shape.barriers.len(), 4);
        assert_eq!(shape.mouths.len(), 1);
        assert!(shape.barriers.iter().all(|b| b.is_convex()));
        // The cap stays between the mouth and the tile centre.
        let outline = shape.outline(&params);
        assert!(outline.iter().all(|p| p.x >= 50.0 - 17.5 - EPSILON));
    }

    #[test]
    fn test_scratch_buffer_is_reused() {
        let params = TrackParams::default();
        let mut scratch = TileShape::default();
        let cross = Tile::with_exits(&[
            (Direction::North, 0.3),
            (Direction::East, 0.3),
            (Direction::South, 0.3),
            (Direction::West, 0.3),
        ]);
        assert!(synthesize_into(TilePos::default(), &cross, &params, &mut scratch).unwrap());
        assert_eq!(scratch.mouths.len(), 4);
        assert!(!synthesize_into(TilePos::new(1, 1), &Tile::new(), &params, &mut scratch).unwrap());
        assert!(scratch.is_empty());
        assert!(scratch.barriers.is_empty());
    }

    #[test]
    fn test_track_geometry_is_in_world_space() {
        let params = TrackParams::default();
        let track = samples::square_loop().unwrap();
        let geometry = TrackGeometry::synthesize(&track, &params).unwrap();
        assert_eq!(geometry.shapes.len(), 4);
        assert!(geometry.shapes.iter().all(|s| !s.is_empty()));

        let shape = geometry.shape(TilePos::new(1, 1)).unwrap();
        let outline = shape.outline(&params);
        let (min, max) = bounds(&outline);
        assert!(min.x >= 50.0 - EPSILON && max.x <= 150.0 + EPSILON);
        assert!(min.y >= 50.0 - EPSILON && max.y <= 150.0 + EPSILON);

        // Shared mouths line up across the tile edge.
        let a = geometry.shape(TilePos::new(0, 0)).unwrap();
        let east = a.mouths.iter().find(|m| m.direction == Direction::East).unwrap();
        let west = shape_mouth(&geometry, TilePos::new(1, 0), Direction::West);
        assert!(east.cw_edge.approx_eq(west.ccw_edge, 1e-3));
        assert!(east.ccw_edge.approx_eq(west.cw_edge, 1e-3));
    }

    fn shape_mouth(geometry: &TrackGeometry, pos: TilePos, direction: Direction) -> Mouth {
        *geometry
            .shape(pos)
            .unwrap()
            .mouths
            .iter()
            .find(|m| m.direction == direction)
            .unwrap()
    }

    #[test]
    fn test_oval_synthesizes_with_sensors() {
        let params = TrackParams::default();
        let track = samples::oval().unwrap();
        let geometry = TrackGeometry::synthesize(&track, &params).unwrap();
        assert_eq!(geometry.shapes.len(), 10);
        assert_eq!(geometry.checkpoints.len(), 3);
        assert!(geometry.barrier_count() > 20);
        assert_eq!(geometry.start.tile, TilePos::new(2, 0));
    }

    #[test]
    fn test_degenerate_tile_aborts_whole_track() {
        // Assembly accepts the pairing; only the fillet between a hairline
        // north lane and a full-width south-east lane is impossible.
        let track = TrackBuilder::new("pinch")
            .at(0, 0)
            .go_with_width(Direction::North, 0.05)
            .at(0, 0)
            .go_with_width(Direction::SouthEast, 0.8)
            .start_at((0, 0), Direction::North)
            .build()
            .unwrap();
        assert_eq!(track.tile_count(), 3);

        let params = TrackParams::default();
        let result = TrackGeometry::synthesize(&track, &params);
        assert!(matches!(
            result,
            Err(TrackError::DegenerateTurn { pos, .. }) if pos == TilePos::new(0, 0)
        ));

        // The dead ends on their own are fine.
        let end = track.tile(TilePos::new(1, 1)).unwrap();
        assert!(synthesize_tile(TilePos::new(1, 1), end, &params).unwrap().is_some());
    }
}
