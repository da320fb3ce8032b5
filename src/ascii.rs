//! ASCII rendering of a track's exit graph
//!
//! Each tile becomes a 3x3 block of characters: the centre marks the tile
//! (or its start/checkpoint line) and the eight surrounding characters show
//! the active exits.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::direction::Direction;
use crate::error::Result;
use crate::track::{CheckpointKind, Track};

/// Get ASCII character for an exit
pub fn exit_char(direction: Direction) -> char {
    match direction {
        Direction::North | Direction::South => '|',
        Direction::East | Direction::West => '-',
        Direction::NorthEast | Direction::SouthWest => '/',
        Direction::NorthWest | Direction::SouthEast => '\\',
    }
}

/// Render the exit graph as text, one line per character row.
pub fn render_track(track: &Track) -> String {
    let cols = track.width() * 3;
    let rows = track.height() * 3;
    let mut canvas = vec![vec![' '; cols]; rows];

    for (pos, tile) in track.tiles() {
        let Some((gx, gy)) = track.grid_index(pos) else {
            continue;
        };
        let cx = gx * 3 + 1;
        let cy = gy * 3 + 1;
        canvas[cy][cx] = 'o';
        for (direction, _) in tile.exits() {
            let (dx, dy) = direction.offset();
            let x = (cx as i32 + dx) as usize;
            let y = (cy as i32 + dy) as usize;
            canvas[y][x] = exit_char(direction);
        }
    }

    for checkpoint in track.all_checkpoints() {
        if let Some((gx, gy)) = track.grid_index(checkpoint.tile) {
            canvas[gy * 3 + 1][gx * 3 + 1] = match checkpoint.kind {
                CheckpointKind::Start => 'S',
                CheckpointKind::Numbered(i) => std::char::from_digit(i % 10, 10).unwrap_or('#'),
            };
        }
    }

    let mut out = String::with_capacity((cols + 1) * rows);
    for row in canvas {
        let line: String = row.into_iter().collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Export the ASCII view with a short header.
pub fn export_ascii(track: &Track, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "# {} ({} tiles, material {})", track.name(), track.tile_count(), track.material())?;
    writeln!(file, "# origin {}, {}x{} grid", track.origin(), track.width(), track.height())?;
    writeln!(file)?;
    write!(file, "{}", render_track(track))?;
    Ok(())
}
