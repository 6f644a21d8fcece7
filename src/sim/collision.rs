//! Collision response for the marble
//!
//! The engine detects contacts; this decides what happens to the marble's
//! velocity when it touches an obstacle.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::{DAMP_ANGULAR, DAMP_LINEAR};
use crate::engine::{BodyHandle, Engine};
use crate::error::EngineError;

/// What to do with the marble's motion on impact
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum CollisionPolicy {
    /// Kill all linear and angular velocity (fully inelastic)
    #[default]
    HardStop,
    /// Keep direction, scale magnitudes
    Damped { linear: f32, angular: f32 },
}

/// Marble velocities, before or after a response
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Motion {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl CollisionPolicy {
    /// Stock damped response: half the linear speed, 30% of the spin
    pub fn damped() -> Self {
        CollisionPolicy::Damped {
            linear: DAMP_LINEAR,
            angular: DAMP_ANGULAR,
        }
    }

    /// Pure response function
    pub fn respond(&self, motion: Motion) -> Motion {
        match *self {
            CollisionPolicy::HardStop => Motion::default(),
            CollisionPolicy::Damped { linear, angular } => Motion {
                linear: motion.linear * linear,
                angular: motion.angular * angular,
            },
        }
    }

    /// Read the body's velocities, respond, write them back.
    ///
    /// A velocity the engine can't report counts as zero.
    pub fn apply(&self, engine: &mut dyn Engine, body: BodyHandle) -> Result<Motion, EngineError> {
        let before = Motion {
            linear: engine.linear_velocity(body).unwrap_or(Vec3::ZERO),
            angular: engine.angular_velocity(body).unwrap_or(Vec3::ZERO),
        };
        let after = self.respond(before);
        engine.set_linear_velocity(body, after.linear)?;
        engine.set_angular_velocity(body, after.angular)?;
        Ok(after)
    }
}
