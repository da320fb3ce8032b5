//! Track file save/load.
//!
//! Tracks are stored as JSON with tiles keyed by `"x,y"` and exits keyed by
//! compass name. Loading goes through [`Track::assemble`], so a file with
//! unpaired exits, a missing start or a dangling checkpoint is rejected.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::error::{Result, TrackError};
use crate::track::{Exit, Placement, Tile, TilePos, Track, TrackLayout};

/// Format version for forward compatibility
pub const TRACK_FILE_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackFile {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub material: String,
    pub tiles: BTreeMap<String, TileRecord>,
    pub start: CheckpointRecord,
    #[serde(default)]
    pub checkpoints: Vec<CheckpointRecord>,
    #[serde(default)]
    pub placements: Vec<Placement>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    /// Lane width per exit direction
    pub exits: BTreeMap<Direction, f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    /// Tile key, `"x,y"`
    pub tile: String,
    pub direction: Direction,
}

impl CheckpointRecord {
    fn new(pos: TilePos, direction: Direction) -> Self {
        Self {
            tile: pos.key(),
            direction,
        }
    }

    fn parse(&self) -> Result<(TilePos, Direction)> {
        Ok((TilePos::from_key(&self.tile)?, self.direction))
    }
}

impl TrackFile {
    pub fn from_track(track: &Track) -> Self {
        let tiles = track
            .exit_graph()
            .into_iter()
            .map(|(pos, exits)| (pos.key(), TileRecord { exits }))
            .collect();
        let start = track.start();
        Self {
            version: TRACK_FILE_VERSION,
            name: track.name().to_string(),
            material: track.material().to_string(),
            tiles,
            start: CheckpointRecord::new(start.tile, start.direction),
            checkpoints: track
                .checkpoints()
                .iter()
                .map(|c| CheckpointRecord::new(c.tile, c.direction))
                .collect(),
            placements: track.placements().to_vec(),
        }
    }

    /// Validate and assemble.
    pub fn into_track(self) -> Result<Track> {
        if self.version > TRACK_FILE_VERSION {
            return Err(TrackError::UnsupportedVersion(self.version));
        }

        let mut tiles = BTreeMap::new();
        for (key, record) in &self.tiles {
            let pos = TilePos::from_key(key)?;
            let mut tile = Tile::new();
            for (&direction, &width) in &record.exits {
                tile.set_exit(direction, Exit::new(width));
            }
            tiles.insert(pos, tile);
        }

        let checkpoints = self
            .checkpoints
            .iter()
            .map(CheckpointRecord::parse)
            .collect::<Result<Vec<_>>>()?;

        Track::assemble(TrackLayout {
            name: self.name,
            material: self.material,
            tiles,
            start: Some(self.start.parse()?),
            checkpoints,
            placements: self.placements,
        })
    }
}

pub fn to_json(track: &Track) -> Result<String> {
    Ok(serde_json::to_string_pretty(&TrackFile::from_track(track))?)
}

pub fn from_json(text: &str) -> Result<Track> {
    let file: TrackFile = serde_json::from_str(text)?;
    file.into_track()
}

pub fn save_track(track: &Track, path: &Path) -> Result<()> {
    fs::write(path, to_json(track)?)?;
    log::info!("saved track '{}' to {}", track.name(), path.display());
    Ok(())
}

pub fn load_track(path: &Path) -> Result<Track> {
    let text = fs::read_to_string(path)?;
    let track = from_json(&text)?;
    log::info!("loaded track '{}' from {}", track.name(), path.display());
    Ok(track)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::samples;

    #[test]
    fn test_save_and_load_round_trip() {
        let track = samples::oval().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oval.json");

        save_track(&track, &path).unwrap();
        let loaded = load_track(&path).unwrap();

        assert_eq!(loaded.name(), "oval");
        assert_eq!(loaded.exit_graph(), track.exit_graph());
        assert_eq!(loaded.checkpoints(), track.checkpoints());
        assert_eq!(loaded.start(), track.start());
        assert_eq!(loaded.placements(), track.placements());
    }

    #[test]
    fn test_file_layout() {
        let track = samples::square_loop().unwrap();
        let json = to_json(&track).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["start"]["tile"], "0,0");
        assert_eq!(value["start"]["direction"], "E");
        let width = value["tiles"]["1,1"]["exits"]["N"].as_f64().unwrap();
        assert!((width - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_load_rejects_unpaired_exit() {
        let text = r#"{
            "version": 1,
            "name": "broken",
            "tiles": {
                "0,0": { "exits": { "E": 0.3 } },
                "1,0": { "exits": {} }
            },
            "start": { "tile": "0,0", "direction": "E" }
        }"#;
        assert!(matches!(
            from_json(text),
            Err(TrackError::UnpairedExit { .. })
        ));
    }

    #[test]
    fn test_load_rejects_bad_key_and_future_version() {
        let text = r#"{
            "version": 1,
            "name": "broken",
            "tiles": { "zero": { "exits": {} } },
            "start": { "tile": "0,0", "direction": "E" }
        }"#;
        assert!(matches!(from_json(text), Err(TrackError::InvalidTileKey(_))));

        let text = r#"{
            "version": 9,
            "name": "future",
            "tiles": {},
            "start": { "tile": "0,0", "direction": "E" }
        }"#;
        assert!(matches!(from_json(text), Err(TrackError::UnsupportedVersion(9))));
    }

    #[test]
    fn test_load_rejects_dangling_start() {
        let text = r#"{
            "version": 1,
            "name": "dangling",
            "tiles": {
                "0,0": { "exits": { "E": 0.3 } },
                "1,0": { "exits": { "W": 0.3 } }
            },
            "start": { "tile": "0,0", "direction": "S" }
        }"#;
        assert!(matches!(
            from_json(text),
            Err(TrackError::DanglingCheckpoint { .. })
        ));
    }

    #[test]
    fn test_load_rejects_extreme_and_sparse_keys() {
        let extreme = r#"{
            "version": 1,
            "name": "extreme",
            "tiles": {
                "0,0": { "exits": { "E": 0.3 } },
                "1,0": { "exits": { "W": 0.3 } },
                "2147483647,0": { "exits": {} },
                "-2147483648,0": { "exits": {} }
            },
            "start": { "tile": "0,0", "direction": "E" }
        }"#;
        assert!(matches!(from_json(extreme), Err(TrackError::GridTooLarge { .. })));

        let sparse = r#"{
            "version": 1,
            "name": "sparse",
            "tiles": {
                "0,0": { "exits": { "E": 0.3 } },
                "1,0": { "exits": { "W": 0.3 } },
                "100000,100000": { "exits": {} }
            },
            "start": { "tile": "0,0", "direction": "E" }
        }"#;
        assert!(matches!(from_json(sparse), Err(TrackError::GridTooLarge { .. })));
    }
}
