//! Fluent, turtle-style construction of hand-authored tracks

use std::collections::BTreeMap;

use crate::direction::Direction;
use crate::error::Result;
use crate::params::TrackParams;

use super::{Exit, Placement, Tile, TilePos, Track, TrackLayout};

/// Builds a track by walking a cursor from tile to tile.
///
/// Every connection writes both halves of an exit pair, so a builder can
/// only fail on the checks that involve the whole track (start present,
/// lane widths in range, drivable topology).
///
/// ```
/// use tilerace::direction::Direction::*;
/// use tilerace::track::TrackBuilder;
///
/// let track = TrackBuilder::new("square")
///     .at(0, 0)
///     .go(East)
///     .go(South)
///     .go(West)
///     .go(North)
///     .start_at((0, 0), East)
///     .build()
///     .unwrap();
/// assert_eq!(track.tile_count(), 4);
/// ```
#[derive(Clone, Debug)]
pub struct TrackBuilder {
    layout: TrackLayout,
    cursor: TilePos,
    lane_width: f32,
}

impl TrackBuilder {
    pub fn new(name: &str) -> Self {
        Self::with_params(name, &TrackParams::default())
    }

    pub fn with_params(name: &str, params: &TrackParams) -> Self {
        Self {
            layout: TrackLayout {
                name: name.to_string(),
                material: "asphalt".to_string(),
                tiles: BTreeMap::new(),
                ..Default::default()
            },
            cursor: TilePos::default(),
            lane_width: params.default_lane_width,
        }
    }

    pub fn material(mut self, material: &str) -> Self {
        self.layout.material = material.to_string();
        self
    }

    /// Lane width used by subsequent connections.
    pub fn lane_width(mut self, width: f32) -> Self {
        self.lane_width = width;
        self
    }

    /// Move the cursor to `(x, y)`, creating an empty tile there if needed.
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.cursor = TilePos::new(x, y);
        self.layout.tiles.entry(self.cursor).or_default();
        self
    }

    /// Connect the cursor tile to its neighbour in `direction` and move there.
    pub fn go(self, direction: Direction) -> Self {
        let width = self.lane_width;
        self.go_with_width(direction, width)
    }

    pub fn go_with_width(mut self, direction: Direction, width: f32) -> Self {
        let from = self.cursor;
        self.link(from, direction, width);
        self.cursor = from.step(direction);
        self
    }

    /// Connect `(x, y)` to its neighbour in `direction` without moving the cursor.
    pub fn connect(mut self, (x, y): (i32, i32), direction: Direction) -> Self {
        let width = self.lane_width;
        self.link(TilePos::new(x, y), direction, width);
        self
    }

    /// Start line on the cursor tile.
    pub fn start(mut self, direction: Direction) -> Self {
        self.layout.start = Some((self.cursor, direction));
        self
    }

    pub fn start_at(mut self, (x, y): (i32, i32), direction: Direction) -> Self {
        self.layout.start = Some((TilePos::new(x, y), direction));
        self
    }

    /// Next numbered checkpoint on the cursor tile.
    pub fn checkpoint(mut self, direction: Direction) -> Self {
        self.layout.checkpoints.push((self.cursor, direction));
        self
    }

    pub fn checkpoint_at(mut self, (x, y): (i32, i32), direction: Direction) -> Self {
        self.layout.checkpoints.push((TilePos::new(x, y), direction));
        self
    }

    pub fn placement(mut self, kind: &str, x: f32, y: f32, rotation: f32) -> Self {
        self.layout.placements.push(Placement {
            kind: kind.to_string(),
            x,
            y,
            rotation,
        });
        self
    }

    pub fn cursor(&self) -> TilePos {
        self.cursor
    }

    /// The layout as authored so far, unvalidated.
    pub fn layout(&self) -> &TrackLayout {
        &self.layout
    }

    pub fn build(self) -> Result<Track> {
        Track::assemble(self.layout)
    }

    fn link(&mut self, from: TilePos, direction: Direction, width: f32) {
        let to = from.step(direction);
        let exit = Exit::new(width);
        self.layout
            .tiles
            .entry(from)
            .or_insert_with(Tile::new)
            .set_exit(direction, exit);
        self.layout
            .tiles
            .entry(to)
            .or_insert_with(Tile::new)
            .set_exit(direction.opposite(), exit);
    }
}
