//! Auto-play pacing.
//!
//! The timer itself belongs to the caller (an event loop, a UI framework). `Playback` only
//! says how long to wait between ticks and what a tick does to the machine.

use crate::{machine::TuringMachine, types::Status};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Slider range for playback speed.
pub const MAX_SPEED: u64 = 1000;
/// Shortest delay between two auto-play steps.
pub const MIN_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playback {
    speed: u64,
}

impl Default for Playback {
    fn default() -> Self {
        Self { speed: 500 }
    }
}

impl Playback {
    /// Creates a playback setting, clamping `speed` to `0..=MAX_SPEED`.
    pub fn new(speed: u64) -> Self {
        Self {
            speed: speed.min(MAX_SPEED),
        }
    }

    pub fn speed(&self) -> u64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: u64) {
        self.speed = speed.min(MAX_SPEED);
    }

    /// Delay between ticks: `MAX_SPEED - speed` milliseconds, never below `MIN_INTERVAL`.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(MAX_SPEED - self.speed).max(MIN_INTERVAL)
    }

    /// One timer tick. Steps the machine only while it is running and returns whether a
    /// step was taken.
    pub fn tick(&self, machine: &mut TuringMachine) -> bool {
        if machine.status() != Status::Running {
            return false;
        }

        machine.step();
        true
    }
}
