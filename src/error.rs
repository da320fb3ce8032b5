//! Error taxonomy for track assembly and geometry synthesis

use crate::direction::{Direction, Turn};
use crate::track::TilePos;

#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("track has no tiles")]
    EmptyTrack,

    #[error("invalid tile key '{0}' (expected \"x,y\")")]
    InvalidTileKey(String),

    #[error("tile {pos} exit {direction}: lane width {width} outside (0, {max}]")]
    InvalidLaneWidth {
        pos: TilePos,
        direction: Direction,
        width: f32,
        max: f32,
    },

    #[error("tile {pos} exit {direction} has no matching exit on its neighbour")]
    UnpairedExit { pos: TilePos, direction: Direction },

    #[error("tile {pos} exit {direction}: lane width {here} does not match neighbour's {there}")]
    MismatchedLaneWidth {
        pos: TilePos,
        direction: Direction,
        here: f32,
        there: f32,
    },

    #[error("track spans {width}x{height} tiles, more than {max} grid cells")]
    GridTooLarge { width: u64, height: u64, max: u64 },

    #[error("track has no start line")]
    NoStart,

    #[error("start tile {0} does not exist")]
    MissingStartTile(TilePos),

    #[error("checkpoint tile {0} does not exist")]
    MissingCheckpointTile(TilePos),

    #[error("checkpoint on tile {pos} faces {direction}, which has no exit")]
    DanglingCheckpoint { pos: TilePos, direction: Direction },

    #[error("tile {pos}: exits {from} -> {to} form a {turn:?} turn with no geometry")]
    MalformedTile {
        pos: TilePos,
        from: Direction,
        to: Direction,
        turn: Turn,
    },

    #[error("tile {pos}: lane widths between {from} and {to} are too mismatched to join")]
    DegenerateTurn {
        pos: TilePos,
        from: Direction,
        to: Direction,
    },

    #[error("lane width {lane_width} is narrower than one start cell ({cell})")]
    LaneTooNarrow { lane_width: f32, cell: f32 },

    #[error("all {0} start cells are blocked")]
    NoFreeStartCell(usize),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("unsupported track file version {0}")]
    UnsupportedVersion(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, TrackError>;
