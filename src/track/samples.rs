//! Built-in tracks used by the CLI, the debug tools and tests

use crate::direction::Direction::*;
use crate::error::Result;

use super::{Track, TrackBuilder};

/// Smallest possible circuit: four tiles turning 90 degrees each.
/// Cars run counter-clockwise on screen, crossing the start at (0, 0)
/// heading west.
pub fn square_loop() -> Result<Track> {
    TrackBuilder::new("square loop")
        .at(0, 0)
        .go(East)
        .go(South)
        .go(West)
        .go(North)
        .start_at((0, 0), East)
        .build()
}

/// Ten-tile oval with diagonal corners and three checkpoints.
/// Cars run clockwise on screen.
pub fn oval() -> Result<Track> {
    TrackBuilder::new("oval")
        .material("asphalt")
        .at(1, 0)
        .go(East)
        .go(East)
        .go(SouthEast)
        .go(South)
        .go(SouthWest)
        .go(West)
        .go(West)
        .go(NorthWest)
        .go(North)
        .go(NorthEast)
        .start_at((2, 0), West)
        .checkpoint_at((4, 2), North)
        .checkpoint_at((2, 3), East)
        .checkpoint_at((0, 1), South)
        .placement("tyre_stack", 200.0, 150.0, 0.0)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::TilePos;

    #[test]
    fn test_samples_assemble() {
        let square = square_loop().unwrap();
        assert_eq!(square.tile_count(), 4);
        assert!(square.checkpoints().is_empty());

        let oval = oval().unwrap();
        assert_eq!(oval.tile_count(), 10);
        assert_eq!(oval.checkpoints().len(), 3);
        assert_eq!((oval.width(), oval.height()), (5, 4));
        assert_eq!(oval.origin(), TilePos::new(0, 0));
        // Every oval tile is a two-exit corner or straight.
        assert!(oval.tiles().all(|(_, t)| t.exit_count() == 2));
    }
}
