//! Tile-based racetrack geometry library
//!
//! Re-exports modules for use by binaries and tools.

pub mod ascii;
pub mod direction;
pub mod error;
pub mod export;
pub mod geometry;
pub mod params;
pub mod pathfinder;
pub mod persistence;
pub mod progress;
pub mod sensor;
pub mod shape;
pub mod tilemap;
pub mod track;

pub use direction::{Direction, DirectionSet, Turn};
pub use error::{Result, TrackError};
pub use params::TrackParams;
pub use pathfinder::{Pathfinder, RaceRoutes};
pub use shape::{TileShape, TrackGeometry};
pub use track::{Track, TrackBuilder};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::StartGrid;
    use crate::track::{samples, TilePos};

    /// Build, synthesize, route and lay out the start of the 2x2 loop.
    #[test]
    fn test_square_loop_end_to_end() {
        let params = TrackParams::default();
        let track = samples::square_loop().unwrap();

        let geometry = TrackGeometry::synthesize(&track, &params).unwrap();
        assert_eq!(geometry.shapes.len(), 4);
        for shape in &geometry.shapes {
            assert!(!shape.is_empty());
            assert_eq!(shape.mouths.len(), 2);
            assert!(shape.boundary.is_closed(1e-2));
        }
        assert_eq!(geometry.start.tile, TilePos::new(0, 0));
        assert_eq!(geometry.start.direction, Direction::East);
        assert!(geometry.start.center.approx_eq(crate::geometry::Point::new(47.0, 0.0), 1e-3));

        let finder = Pathfinder::for_checkpoint(&track, track.start());
        let north: DirectionSet = [Direction::North].into_iter().collect();
        let east: DirectionSet = [Direction::East].into_iter().collect();
        assert_eq!(finder.next_step(TilePos::new(1, 1)), north);
        assert_eq!(finder.next_step(TilePos::new(0, 1)), east);

        let start_tile = track.tile(track.start().tile).unwrap();
        let grid = StartGrid::layout(start_tile, track.start(), &params, 4).unwrap();
        assert_eq!(grid.cells.len(), 4);
    }
}
