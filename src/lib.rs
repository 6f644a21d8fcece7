//! Marble Roll - pick a marble, roll it around a heightmap, bump into things
//!
//! Core modules:
//! - `sim`: Session controller (selection, start, input, collision response)
//! - `engine`: Boundary to the scene/physics engine, plus a headless engine
//! - `scene`: Ground, obstacles and camera rigs built at session start
//! - `catalog`: Selectable ball variants
//! - `settings`: Data-driven tunables

pub mod catalog;
pub mod engine;
pub mod error;
pub mod scene;
pub mod settings;
pub mod sim;

pub use catalog::{BallCatalog, BallVariant, Swatch, VisualDescriptor};
pub use engine::{BodyHandle, Engine, HeadlessEngine};
pub use error::{EngineError, SessionError, SettingsError};
pub use settings::{GameSettings, MovementMode};
pub use sim::{CollisionPolicy, Direction, InputEvent, SessionController, SessionState};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Distance the marble moves per key press
    pub const MOVE_SPEED: f32 = 0.2;

    /// Marble defaults
    pub const MARBLE_DIAMETER: f32 = 1.0;
    pub const MARBLE_SPAWN_HEIGHT: f32 = 0.5; // Half the diameter, sits on the ground
    pub const MARBLE_MASS: f32 = 1.0;
    pub const MARBLE_RESTITUTION: f32 = 0.9;
    pub const MARBLE_FRICTION: f32 = 0.3;

    /// Ground and obstacles are static; this is their bounce
    pub const OBSTACLE_RESTITUTION: f32 = 0.6;

    /// Damped collision response factors
    pub const DAMP_LINEAR: f32 = 0.5;
    pub const DAMP_ANGULAR: f32 = 0.3;

    pub const GRAVITY_Y: f32 = -9.81;
}
