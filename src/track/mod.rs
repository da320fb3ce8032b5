//! Track assembly: the tile exit graph plus start, checkpoints and placements
//!
//! [`Track::assemble`] is the only way to obtain a [`Track`], so every track
//! in the program has paired exits, valid lane widths, drivable tile
//! topology and checkpoints that face real exits.

pub mod builder;
pub mod samples;
pub mod tile;

pub use builder::TrackBuilder;
pub use tile::{Exit, Tile, TilePos};

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::error::{Result, TrackError};
use crate::params::MAX_LANE_WIDTH;
use crate::shape::validate_topology;
use crate::tilemap::Tilemap;

/// Largest bounding grid a track may span, in cells.
pub const MAX_GRID_CELLS: u64 = 1 << 20;

// =============================================================================
// CHECKPOINTS & PLACEMENTS
// =============================================================================

/// Which line a checkpoint is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CheckpointKind {
    /// The start/finish line, which also opens the lap counter
    Start,
    /// A numbered checkpoint, visited in increasing order each lap
    Numbered(u32),
}

impl fmt::Display for CheckpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointKind::Start => write!(f, "start"),
            CheckpointKind::Numbered(i) => write!(f, "checkpoint {}", i),
        }
    }
}

/// A line across the lane of one exit. Cars cross it moving along
/// `direction.opposite()`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Checkpoint {
    pub kind: CheckpointKind,
    pub tile: TilePos,
    pub direction: Direction,
}

/// A decoration or obstacle. Carried through assembly and persistence
/// without geometric interpretation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub kind: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub rotation: f32,
}

// =============================================================================
// LAYOUT (unvalidated input)
// =============================================================================

/// Raw track description, as authored or loaded, before validation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackLayout {
    pub name: String,
    pub material: String,
    pub tiles: BTreeMap<TilePos, Tile>,
    pub start: Option<(TilePos, Direction)>,
    pub checkpoints: Vec<(TilePos, Direction)>,
    pub placements: Vec<Placement>,
}

// =============================================================================
// TRACK
// =============================================================================

/// A validated, immutable track.
#[derive(Clone, Debug)]
pub struct Track {
    name: String,
    material: String,
    origin: TilePos,
    tiles: Tilemap<Option<Tile>>,
    tile_count: usize,
    start: Checkpoint,
    checkpoints: Vec<Checkpoint>,
    placements: Vec<Placement>,
}

impl Track {
    /// Validate a layout and freeze it into a track.
    pub fn assemble(layout: TrackLayout) -> Result<Self> {
        if layout.tiles.is_empty() {
            return Err(TrackError::EmptyTrack);
        }

        let min_x = layout.tiles.keys().map(|p| p.x).min().unwrap_or(0);
        let max_x = layout.tiles.keys().map(|p| p.x).max().unwrap_or(0);
        let min_y = layout.tiles.keys().map(|p| p.y).min().unwrap_or(0);
        let max_y = layout.tiles.keys().map(|p| p.y).max().unwrap_or(0);
        // Spans of extreme keys do not fit in i32, so measure in i64.
        let width = (i64::from(max_x) - i64::from(min_x) + 1) as u64;
        let height = (i64::from(max_y) - i64::from(min_y) + 1) as u64;
        if width.saturating_mul(height) > MAX_GRID_CELLS {
            return Err(TrackError::GridTooLarge {
                width,
                height,
                max: MAX_GRID_CELLS,
            });
        }
        let (width, height) = (width as usize, height as usize);

        for (&pos, tile) in &layout.tiles {
            check_exits(pos, tile, &layout.tiles)?;
            validate_topology(pos, tile)?;
        }

        let (start_pos, start_dir) = layout.start.ok_or(TrackError::NoStart)?;
        let start_tile = layout
            .tiles
            .get(&start_pos)
            .ok_or(TrackError::MissingStartTile(start_pos))?;
        check_facing(start_pos, start_tile, start_dir)?;
        let start = Checkpoint {
            kind: CheckpointKind::Start,
            tile: start_pos,
            direction: start_dir,
        };

        let mut checkpoints = Vec::with_capacity(layout.checkpoints.len());
        for (i, &(pos, direction)) in layout.checkpoints.iter().enumerate() {
            let tile = layout
                .tiles
                .get(&pos)
                .ok_or(TrackError::MissingCheckpointTile(pos))?;
            check_facing(pos, tile, direction)?;
            checkpoints.push(Checkpoint {
                kind: CheckpointKind::Numbered(i as u32),
                tile: pos,
                direction,
            });
        }

        let origin = TilePos::new(min_x, min_y);
        let mut tiles = Tilemap::new_with(width, height, None);
        for (&pos, &tile) in &layout.tiles {
            let x = (i64::from(pos.x) - i64::from(min_x)) as usize;
            let y = (i64::from(pos.y) - i64::from(min_y)) as usize;
            tiles.set(x, y, Some(tile));
        }

        log::info!(
            "assembled track '{}': {} tiles in a {}x{} grid, {} checkpoints",
            layout.name,
            layout.tiles.len(),
            width,
            height,
            checkpoints.len()
        );

        Ok(Self {
            name: layout.name,
            material: layout.material,
            origin,
            tile_count: layout.tiles.len(),
            tiles,
            start,
            checkpoints,
            placements: layout.placements,
        })
    }

    /// Unfreeze back into an editable layout.
    pub fn to_layout(&self) -> TrackLayout {
        TrackLayout {
            name: self.name.clone(),
            material: self.material.clone(),
            tiles: self.tiles().map(|(pos, tile)| (pos, *tile)).collect(),
            start: Some((self.start.tile, self.start.direction)),
            checkpoints: self
                .checkpoints
                .iter()
                .map(|c| (c.tile, c.direction))
                .collect(),
            placements: self.placements.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn material(&self) -> &str {
        &self.material
    }

    /// Grid position of the top-left cell of the bounding rectangle.
    pub fn origin(&self) -> TilePos {
        self.origin
    }

    pub fn width(&self) -> usize {
        self.tiles.width
    }

    pub fn height(&self) -> usize {
        self.tiles.height
    }

    pub fn tile_count(&self) -> usize {
        self.tile_count
    }

    pub fn start(&self) -> &Checkpoint {
        &self.start
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// The start followed by the numbered checkpoints.
    pub fn all_checkpoints(&self) -> impl Iterator<Item = &Checkpoint> {
        std::iter::once(&self.start).chain(self.checkpoints.iter())
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Cell coordinates of `pos` within the bounding grid.
    pub fn grid_index(&self, pos: TilePos) -> Option<(usize, usize)> {
        let x = pos.x.checked_sub(self.origin.x)?;
        let y = pos.y.checked_sub(self.origin.y)?;
        self.tiles
            .in_bounds(x, y)
            .then_some((x as usize, y as usize))
    }

    /// Grid position of a cell in the bounding grid.
    pub fn grid_pos(&self, x: usize, y: usize) -> TilePos {
        TilePos::new(self.origin.x + x as i32, self.origin.y + y as i32)
    }

    pub fn tile(&self, pos: TilePos) -> Option<&Tile> {
        let (x, y) = self.grid_index(pos)?;
        self.tiles.get(x, y).as_ref()
    }

    /// All tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (TilePos, &Tile)> + '_ {
        self.tiles
            .iter()
            .filter_map(move |(x, y, tile)| tile.as_ref().map(|t| (self.grid_pos(x, y), t)))
    }

    /// Tile reached by leaving `pos` through its exit in `direction`.
    pub fn neighbor(&self, pos: TilePos, direction: Direction) -> Option<TilePos> {
        let tile = self.tile(pos)?;
        if !tile.has_exit(direction) {
            return None;
        }
        let next = pos.checked_step(direction)?;
        self.tile(next).map(|_| next)
    }

    /// Every tile's exits and lane widths.
    pub fn exit_graph(&self) -> BTreeMap<TilePos, BTreeMap<Direction, f32>> {
        self.tiles()
            .map(|(pos, tile)| {
                let exits = tile.exits().map(|(d, e)| (d, e.lane_width)).collect();
                (pos, exits)
            })
            .collect()
    }
}

fn check_exits(pos: TilePos, tile: &Tile, tiles: &BTreeMap<TilePos, Tile>) -> Result<()> {
    for (direction, exit) in tile.exits() {
        let width = exit.lane_width;
        if !(width.is_finite() && width > 0.0 && width <= MAX_LANE_WIDTH) {
            return Err(TrackError::InvalidLaneWidth {
                pos,
                direction,
                width,
                max: MAX_LANE_WIDTH,
            });
        }
        let back = pos
            .checked_step(direction)
            .and_then(|next| tiles.get(&next))
            .and_then(|n| n.exit(direction.opposite()))
            .ok_or(TrackError::UnpairedExit { pos, direction })?;
        if (back.lane_width - width).abs() > 1e-6 {
            return Err(TrackError::MismatchedLaneWidth {
                pos,
                direction,
                here: width,
                there: back.lane_width,
            });
        }
    }
    Ok(())
}

fn check_facing(pos: TilePos, tile: &Tile, direction: Direction) -> Result<()> {
    if tile.has_exit(direction) {
        Ok(())
    } else {
        Err(TrackError::DanglingCheckpoint { pos, direction })
    }
}
