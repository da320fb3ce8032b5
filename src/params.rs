//! Track geometry parameters and configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::error::{Result, TrackError};

/// Widest lane allowed, as a fraction of the tile size. Anything wider
/// leaves no room for the inner fillet of a 90 degree turn.
pub const MAX_LANE_WIDTH: f32 = 0.8;

/// Shared constants for shape, barrier and sensor synthesis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackParams {
    // =========================================================================
    // Tiles
    // =========================================================================

    /// Edge length of one square tile in world units (default: 100)
    pub tile_size: f32,

    /// Lane width used by the builder when none is given, as a fraction of
    /// the tile size (default: 0.35)
    pub default_lane_width: f32,

    // =========================================================================
    // Walls and sensors
    // =========================================================================

    /// Physical wall thickness, independent of lane width (default: 4)
    pub barrier_thickness: f32,

    /// Depth of a checkpoint sensor along the lane (default: 6)
    pub checkpoint_thickness: f32,

    /// Largest arc piece in degrees; arcs are split so every barrier piece
    /// stays convex (default: 30)
    pub max_arc_step_degrees: f32,

    // =========================================================================
    // Start grid
    // =========================================================================

    /// Distance between consecutive rows behind the start line (default: 24)
    pub start_row_spacing: f32,

    /// Distance between cars side by side in one row (default: 14)
    pub start_column_spacing: f32,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            tile_size: 100.0,
            default_lane_width: 0.35,
            barrier_thickness: 4.0,
            checkpoint_thickness: 6.0,
            max_arc_step_degrees: 30.0,
            start_row_spacing: 24.0,
            start_column_spacing: 14.0,
        }
    }
}

impl TrackParams {
    /// Read parameters from a JSON file; missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let params: TrackParams = serde_json::from_str(&text)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("tile_size", self.tile_size),
            ("barrier_thickness", self.barrier_thickness),
            ("checkpoint_thickness", self.checkpoint_thickness),
            ("max_arc_step_degrees", self.max_arc_step_degrees),
            ("start_row_spacing", self.start_row_spacing),
            ("start_column_spacing", self.start_column_spacing),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TrackError::InvalidParams(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if self.max_arc_step_degrees > 90.0 {
            return Err(TrackError::InvalidParams(format!(
                "max_arc_step_degrees must be at most 90, got {}",
                self.max_arc_step_degrees
            )));
        }
        if !(self.default_lane_width > 0.0 && self.default_lane_width <= MAX_LANE_WIDTH) {
            return Err(TrackError::InvalidParams(format!(
                "default_lane_width must be in (0, {}], got {}",
                MAX_LANE_WIDTH, self.default_lane_width
            )));
        }
        Ok(())
    }

    pub fn half_tile(&self) -> f32 {
        self.tile_size / 2.0
    }

    /// Extra reach of a diagonal exit: the tile corner lies this much
    /// further from the centre than the middle of an edge.
    pub fn diagonal_backup(&self) -> f32 {
        (std::f32::consts::SQRT_2 - 1.0) * self.half_tile()
    }

    /// Distance from the tile centre to the middle of the lane mouth.
    pub fn mouth_distance(&self, direction: Direction) -> f32 {
        if direction.is_diagonal() {
            self.half_tile() + self.diagonal_backup()
        } else {
            self.half_tile()
        }
    }

    /// Half of a lane, in world units.
    pub fn half_lane(&self, lane_width: f32) -> f32 {
        lane_width * self.tile_size / 2.0
    }

    pub fn max_arc_step(&self) -> f32 {
        self.max_arc_step_degrees.to_radians()
    }
}
