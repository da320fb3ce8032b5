//! Tiles, exits and grid positions

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::direction::{Direction, DirectionSet};
use crate::error::{Result, TrackError};
use crate::geometry::Point;

/// Integer grid position of a tile. Negative coordinates are allowed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbouring position one step in `direction`.
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Like [`TilePos::step`], but `None` at the edge of the `i32` grid.
    pub fn checked_step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.offset();
        Some(Self::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }

    /// Centre of this tile in world coordinates.
    pub fn center(self, tile_size: f32) -> Point {
        Point::new(self.x as f32 * tile_size, self.y as f32 * tile_size)
    }

    /// Key used in track files, e.g. `"3,-1"`.
    pub fn key(self) -> String {
        format!("{},{}", self.x, self.y)
    }

    pub fn from_key(key: &str) -> Result<Self> {
        let invalid = || TrackError::InvalidTileKey(key.to_string());
        let (x, y) = key.split_once(',').ok_or_else(invalid)?;
        let x = x.trim().parse::<i32>().map_err(|_| invalid())?;
        let y = y.trim().parse::<i32>().map_err(|_| invalid())?;
        Ok(Self::new(x, y))
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A connection from a tile to its neighbour.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exit {
    /// Lane width as a fraction of the tile size
    pub lane_width: f32,
}

impl Exit {
    pub fn new(lane_width: f32) -> Self {
        Self { lane_width }
    }
}

/// One square of track with up to eight exits.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tile {
    exits: [Option<Exit>; 8],
}

impl Tile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exits(exits: &[(Direction, f32)]) -> Self {
        let mut tile = Self::new();
        for &(direction, width) in exits {
            tile.set_exit(direction, Exit::new(width));
        }
        tile
    }

    pub fn exit(&self, direction: Direction) -> Option<Exit> {
        self.exits[direction.index()]
    }

    pub fn has_exit(&self, direction: Direction) -> bool {
        self.exits[direction.index()].is_some()
    }

    pub fn set_exit(&mut self, direction: Direction, exit: Exit) {
        self.exits[direction.index()] = Some(exit);
    }

    pub fn active_exits(&self) -> DirectionSet {
        Direction::ALL.into_iter().filter(|d| self.has_exit(*d)).collect()
    }

    /// Exits with their lane widths, clockwise from north.
    pub fn exits(&self) -> impl Iterator<Item = (Direction, Exit)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |d| self.exit(d).map(|e| (d, e)))
    }

    pub fn exit_count(&self) -> usize {
        self.exits.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.exit_count() == 0
    }

    /// First active exit scanning clockwise from north.
    pub fn first_exit(&self) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| self.has_exit(*d))
    }

    /// Next active exit strictly clockwise after `from`, wrapping around.
    /// Returns `from` itself when it is the only exit.
    pub fn next_exit_clockwise(&self, from: Direction) -> Option<Direction> {
        (1..=8)
            .map(|steps| from.rotate_cw(steps))
            .find(|d| self.has_exit(*d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_key_round_trip() {
        let pos = TilePos::new(-3, 12);
        assert_eq!(pos.key(), "-3,12");
        assert_eq!(TilePos::from_key(" -3, 12").unwrap(), pos);
        assert!(matches!(
            TilePos::from_key("3;4"),
            Err(TrackError::InvalidTileKey(_))
        ));
        assert!(TilePos::from_key("a,1").is_err());
    }

    #[test]
    fn test_step_and_center() {
        let pos = TilePos::new(1, 1);
        assert_eq!(pos.step(Direction::NorthWest), TilePos::new(0, 0));
        assert_eq!(pos.center(100.0), Point::new(100.0, 100.0));
        assert_eq!(format!("{}", pos), "(1, 1)");
    }

    #[test]
    fn test_clockwise_order_wraps() {
        let tile = Tile::with_exits(&[(Direction::West, 0.3), (Direction::East, 0.3)]);
        assert_eq!(tile.first_exit(), Some(Direction::East));
        assert_eq!(tile.next_exit_clockwise(Direction::East), Some(Direction::West));
        assert_eq!(tile.next_exit_clockwise(Direction::West), Some(Direction::East));
    }

    #[test]
    fn test_single_exit_wraps_to_itself() {
        let tile = Tile::with_exits(&[(Direction::South, 0.3)]);
        assert_eq!(tile.next_exit_clockwise(Direction::South), Some(Direction::South));
        assert!(Tile::new().first_exit().is_none());
        assert!(Tile::new().next_exit_clockwise(Direction::North).is_none());
    }
}
