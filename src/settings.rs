//! Game settings
//!
//! Tunables for movement, collision response and the marble body.
//! Persisted in LocalStorage on the web, read from a JSON file on native.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::engine::BodyMaterial;
use crate::error::SettingsError;
use crate::sim::CollisionPolicy;

/// How a directional key press moves the marble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MovementMode {
    /// Shift the marble's position directly by the step vector
    #[default]
    Displace,
    /// Hand the step vector to the engine as an impulse at the marble's center
    Impulse,
}

/// Player marble body parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarbleSettings {
    pub diameter: f32,
    /// Spawn height, half the diameter so it rests on the ground
    pub spawn_height: f32,
    pub material: BodyMaterial,
}

impl Default for MarbleSettings {
    fn default() -> Self {
        Self {
            diameter: MARBLE_DIAMETER,
            spawn_height: MARBLE_SPAWN_HEIGHT,
            material: BodyMaterial {
                mass: MARBLE_MASS,
                restitution: MARBLE_RESTITUTION,
                friction: MARBLE_FRICTION,
            },
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Distance moved per key press (world units)
    pub move_speed: f32,
    pub movement: MovementMode,
    /// Response when the marble touches an obstacle
    pub collision_policy: CollisionPolicy,
    pub marble: MarbleSettings,
    /// Restitution of ground and obstacles
    pub obstacle_restitution: f32,
    pub gravity: Vec3,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            move_speed: MOVE_SPEED,
            movement: MovementMode::Displace,
            collision_policy: CollisionPolicy::HardStop,
            marble: MarbleSettings::default(),
            obstacle_restitution: OBSTACLE_RESTITUTION,
            gravity: Vec3::new(0.0, GRAVITY_Y, 0.0),
        }
    }
}

impl GameSettings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "marble_roll_settings";

    /// Parse and validate settings from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the session can't run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.move_speed.is_finite() || self.move_speed < 0.0 {
            return Err(invalid(
                "move_speed",
                format!("must be finite and >= 0, got {}", self.move_speed),
            ));
        }
        if let CollisionPolicy::Damped { linear, angular } = self.collision_policy {
            unit_interval("collision_policy.linear", linear)?;
            unit_interval("collision_policy.angular", angular)?;
        }

        let marble = &self.marble;
        if !marble.material.mass.is_finite() || !(marble.material.mass > 0.0) {
            return Err(invalid(
                "marble.material.mass",
                "the marble must be a dynamic body (finite mass > 0)".to_string(),
            ));
        }
        if !marble.diameter.is_finite() || !(marble.diameter > 0.0) {
            return Err(invalid(
                "marble.diameter",
                format!("must be finite and > 0, got {}", marble.diameter),
            ));
        }
        if !marble.spawn_height.is_finite() {
            return Err(invalid(
                "marble.spawn_height",
                format!("must be finite, got {}", marble.spawn_height),
            ));
        }
        unit_interval("marble.material.restitution", marble.material.restitution)?;
        if !marble.material.friction.is_finite() || marble.material.friction < 0.0 {
            return Err(invalid(
                "marble.material.friction",
                format!("must be finite and >= 0, got {}", marble.material.friction),
            ));
        }

        unit_interval("obstacle_restitution", self.obstacle_restitution)?;
        if !self.gravity.is_finite() {
            return Err(invalid(
                "gravity",
                format!("must be finite, got {:?}", self.gravity),
            ));
        }
        Ok(())
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Load settings from a JSON file, or defaults when no path is given
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: Option<&std::path::Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => {
                let json = std::fs::read_to_string(path)?;
                let settings = Self::from_json(&json)?;
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            None => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
        }
    }
}

fn invalid(field: &'static str, reason: String) -> SettingsError {
    SettingsError::Invalid { field, reason }
}

/// Factors and coefficients in [0, 1]. NaN fails the range check.
fn unit_interval(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("must be in [0, 1], got {}", value)))
    }
}
