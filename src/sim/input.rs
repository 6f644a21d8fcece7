//! Directional input
//!
//! Arrow keys map to a fixed-length step on the ground plane:
//! Up/Down move along z (forward), Left/Right along x (lateral).

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One of the four movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Map a DOM `KeyboardEvent.key` value. Anything but the arrows is ignored.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Unit axis for this direction
    pub fn axis(&self) -> Vec3 {
        match self {
            Direction::Up => Vec3::Z,
            Direction::Down => Vec3::NEG_Z,
            Direction::Left => Vec3::NEG_X,
            Direction::Right => Vec3::X,
        }
    }

    /// Step vector of the given length
    #[inline]
    pub fn delta(&self, magnitude: f32) -> Vec3 {
        self.axis() * magnitude
    }
}

/// A single key press. Not queued: presses outside `Playing` are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub direction: Direction,
    /// Host clock at the time of the press (ms)
    pub timestamp_ms: f64,
}

impl InputEvent {
    pub fn new(direction: Direction, timestamp_ms: f64) -> Self {
        Self {
            direction,
            timestamp_ms,
        }
    }

    pub fn from_key(key: &str, timestamp_ms: f64) -> Option<Self> {
        Direction::from_key(key).map(|direction| Self::new(direction, timestamp_ms))
    }
}
