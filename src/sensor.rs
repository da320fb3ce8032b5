//! Checkpoint sensors and the start grid
//!
//! A sensor is a non-solid rectangle one lane wide and
//! `checkpoint_thickness` deep, placed just inside the tile at the exit the
//! checkpoint faces. The start grid lays car slots out behind the start
//! line, on the side cars arrive from.

use crate::direction::Direction;
use crate::error::{Result, TrackError};
use crate::geometry::{Point, Polygon};
use crate::params::TrackParams;
use crate::track::{Checkpoint, CheckpointKind, Tile, TilePos};

// =============================================================================
// SENSOR
// =============================================================================

/// Trigger volume across one lane
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sensor {
    pub kind: CheckpointKind,
    pub tile: TilePos,
    pub direction: Direction,
    pub center: Point,
    /// Unit vector of the facing direction
    pub axis: Point,
    /// Half the lane width, measured across the lane
    pub half_width: f32,
    /// Half the sensor depth, measured along the lane
    pub half_depth: f32,
}

impl Sensor {
    /// Corners in clockwise order.
    pub fn corners(&self) -> [Point; 4] {
        let across = self.axis.cw_perp() * self.half_width;
        let along = self.axis * self.half_depth;
        [
            self.center + along - across,
            self.center + along + across,
            self.center - along + across,
            self.center - along - across,
        ]
    }

    pub fn polygon(&self) -> Polygon {
        Polygon::new(self.corners().to_vec())
    }

    pub fn contains(&self, p: Point) -> bool {
        let d = p - self.center;
        d.dot(self.axis).abs() <= self.half_depth
            && d.dot(self.axis.cw_perp()).abs() <= self.half_width
    }

    pub fn translated(&self, offset: Point) -> Self {
        Self {
            center: self.center + offset,
            ..*self
        }
    }
}

/// Tile-local sensor for a checkpoint on `tile`.
pub fn checkpoint_sensor(tile: &Tile, checkpoint: &Checkpoint, params: &TrackParams) -> Result<Sensor> {
    let exit = tile
        .exit(checkpoint.direction)
        .ok_or(TrackError::DanglingCheckpoint {
            pos: checkpoint.tile,
            direction: checkpoint.direction,
        })?;

    let axis = checkpoint.direction.unit();
    let half_depth = params.checkpoint_thickness / 2.0;
    let reach = params.mouth_distance(checkpoint.direction);

    Ok(Sensor {
        kind: checkpoint.kind,
        tile: checkpoint.tile,
        direction: checkpoint.direction,
        center: axis * (reach - half_depth),
        axis,
        half_width: params.half_lane(exit.lane_width),
        half_depth,
    })
}

// =============================================================================
// START GRID
// =============================================================================

/// Car slots behind the start line, in row-major order (front row first).
#[derive(Clone, Debug, PartialEq)]
pub struct StartGrid {
    pub rows: usize,
    pub per_row: usize,
    pub cells: Vec<Point>,
}

impl StartGrid {
    /// Tile-local grid with room for at least `min_cells` cars.
    pub fn layout(
        tile: &Tile,
        start: &Checkpoint,
        params: &TrackParams,
        min_cells: usize,
    ) -> Result<Self> {
        let exit = tile.exit(start.direction).ok_or(TrackError::DanglingCheckpoint {
            pos: start.tile,
            direction: start.direction,
        })?;

        let lane = exit.lane_width * params.tile_size;
        let per_row = (lane / params.start_column_spacing).floor() as usize;
        if per_row == 0 {
            return Err(TrackError::LaneTooNarrow {
                lane_width: lane,
                cell: params.start_column_spacing,
            });
        }
        let rows = (min_cells + per_row - 1) / per_row;

        // Cars cross the line moving against the facing direction, so they
        // line up on the facing side of it.
        let back = start.direction.unit();
        let across = back.cw_perp();
        let reach = params.mouth_distance(start.direction);
        let middle = (per_row as f32 - 1.0) / 2.0;

        let mut cells = Vec::with_capacity(rows * per_row);
        for row in 0..rows {
            let depth = reach + params.start_row_spacing * (row as f32 + 0.5);
            for col in 0..per_row {
                let offset = (col as f32 - middle) * params.start_column_spacing;
                cells.push(back * depth + across * offset);
            }
        }

        Ok(Self { rows, per_row, cells })
    }

    pub fn translated(&self, offset: Point) -> Self {
        Self {
            rows: self.rows,
            per_row: self.per_row,
            cells: self.cells.iter().map(|&c| c + offset).collect(),
        }
    }

    /// First cell, in row-major order, that `is_blocked` rejects.
    pub fn first_free<F>(&self, mut is_blocked: F) -> Result<(usize, Point)>
    where
        F: FnMut(Point) -> bool,
    {
        self.cells
            .iter()
            .copied()
            .enumerate()
            .find(|&(_, cell)| !is_blocked(cell))
            .ok_or(TrackError::NoFreeStartCell(self.cells.len()))
    }
}
