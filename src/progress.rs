//! Lap and checkpoint progress for one car
//!
//! Only the sensor the car is expected to cross next is tested, so driving
//! through checkpoints out of order (or backwards over the start) does
//! nothing.

use crate::geometry::Point;
use crate::shape::TrackGeometry;
use crate::track::CheckpointKind;

/// What happened when a car was checked against its expected sensor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The car is not on the expected sensor
    Idle,
    /// First crossing of the start line; the lap counter is now running
    RaceStarted,
    Checkpoint(u32),
    /// The start line closed a lap; carries the number of completed laps
    LapCompleted(u32),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LapProgress {
    checkpoint_count: u32,
    expected: CheckpointKind,
    started: bool,
    laps: u32,
}

impl LapProgress {
    pub fn new(checkpoint_count: usize) -> Self {
        Self {
            checkpoint_count: checkpoint_count as u32,
            expected: CheckpointKind::Start,
            started: false,
            laps: 0,
        }
    }

    pub fn for_geometry(geometry: &TrackGeometry) -> Self {
        Self::new(geometry.checkpoints.len())
    }

    pub fn expected(&self) -> CheckpointKind {
        self.expected
    }

    pub fn laps(&self) -> u32 {
        self.laps
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    /// Record a crossing of `kind`. Anything but the expected line is ignored.
    pub fn cross(&mut self, kind: CheckpointKind) -> ProgressEvent {
        if kind != self.expected {
            return ProgressEvent::Idle;
        }
        let event = match kind {
            CheckpointKind::Start if !self.started => {
                self.started = true;
                ProgressEvent::RaceStarted
            }
            CheckpointKind::Start => {
                self.laps += 1;
                ProgressEvent::LapCompleted(self.laps)
            }
            CheckpointKind::Numbered(i) => ProgressEvent::Checkpoint(i),
        };
        self.expected = self.after(kind);
        event
    }

    /// Test a car position against the expected sensor only.
    pub fn update(&mut self, geometry: &TrackGeometry, car: Point) -> ProgressEvent {
        match geometry.sensor(self.expected) {
            Some(sensor) if sensor.contains(car) => self.cross(self.expected),
            _ => ProgressEvent::Idle,
        }
    }

    fn after(&self, kind: CheckpointKind) -> CheckpointKind {
        let next = match kind {
            CheckpointKind::Start => 0,
            CheckpointKind::Numbered(i) => i + 1,
        };
        if next < self.checkpoint_count {
            CheckpointKind::Numbered(next)
        } else {
            CheckpointKind::Start
        }
    }
}
