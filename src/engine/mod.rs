//! Scene engine boundary
//!
//! Rendering, rigid-body simulation and scene composition are owned by an
//! external engine. The session core only talks to it through [`Engine`]:
//! - Body creation (dynamic marble, static obstacles, heightmap ground)
//! - Position / velocity accessors and impulses
//! - Contact watches, reported back from [`Engine::step`]
//! - Camera rigs

pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use headless::HeadlessEngine;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::catalog::VisualDescriptor;
use crate::error::EngineError;

/// Opaque handle to a body owned by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// Opaque handle to a camera owned by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CameraHandle(pub u32);

/// Collision shape of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Sphere { diameter: f32 },
    Box { size: f32 },
    /// A cone is a cylinder with `diameter_top == 0`
    Cylinder {
        diameter_top: f32,
        diameter_bottom: f32,
        height: f32,
    },
}

impl Shape {
    /// Radius of a sphere enclosing the shape (centered on the body origin)
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            Shape::Sphere { diameter } => diameter / 2.0,
            Shape::Box { size } => (size / 2.0) * 3f32.sqrt(),
            Shape::Cylinder {
                diameter_top,
                diameter_bottom,
                height,
            } => {
                let r = diameter_top.max(diameter_bottom) / 2.0;
                (r * r + (height / 2.0) * (height / 2.0)).sqrt()
            }
        }
    }
}

/// Physical material parameters. Mass 0 means static.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyMaterial {
    pub mass: f32,
    pub restitution: f32,
    #[serde(default)]
    pub friction: f32,
}

impl BodyMaterial {
    pub fn fixed(restitution: f32) -> Self {
        Self {
            mass: 0.0,
            restitution,
            friction: 0.0,
        }
    }

    pub fn is_static(&self) -> bool {
        self.mass == 0.0
    }
}

/// Everything the engine needs to spawn a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDesc {
    pub name: String,
    pub shape: Shape,
    pub position: Vec3,
    pub material: BodyMaterial,
    pub visual: VisualDescriptor,
}

/// Static terrain that is not an ordinary primitive body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StaticGeometry {
    Heightmap {
        name: String,
        image_url: String,
        width: f32,
        depth: f32,
        subdivisions: u32,
        min_height: f32,
        max_height: f32,
        texture_url: String,
        texture_tiling: f32,
        receive_shadows: bool,
    },
}

/// Camera configuration handed to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CameraRig {
    /// User-steered camera that collides with the ground and falls under gravity
    Free {
        name: String,
        position: Vec3,
        apply_gravity: bool,
        check_collisions: bool,
        /// Extra key codes, added on top of the engine's arrow-key defaults
        keys_up: Vec<u32>,
        keys_down: Vec<u32>,
        keys_left: Vec<u32>,
        keys_right: Vec<u32>,
    },
    /// Chase camera locked onto a body
    Follow {
        name: String,
        target: BodyHandle,
        radius: f32,
        height_offset: f32,
        rotation_offset: f32,
        acceleration: f32,
        max_speed: f32,
    },
}

/// A reported contact between a watched body and one of its watch targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub body: BodyHandle,
    pub other: BodyHandle,
}

impl Contact {
    /// Decode a flat `[body, other, body, other, ...]` id list.
    /// A trailing unpaired id is dropped.
    pub fn from_pairs(ids: &[u32]) -> Vec<Contact> {
        if ids.len() % 2 != 0 {
            log::warn!("Dropping unpaired contact id {:?}", ids.last());
        }
        ids.chunks_exact(2)
            .map(|pair| Contact {
                body: BodyHandle(pair[0]),
                other: BodyHandle(pair[1]),
            })
            .collect()
    }
}

/// Vector from exactly three numeric components, as read off `[x, y, z]`
/// arrays or `{x, y, z}` objects. Anything else is "no value".
pub fn vec3_from_components(components: &[f64]) -> Option<Vec3> {
    match *components {
        [x, y, z] => Some(Vec3::new(x as f32, y as f32, z as f32)),
        _ => None,
    }
}

/// Capability set the session core needs from the scene engine.
///
/// Velocity getters return `None` when the engine has no value for the body
/// (never simulated yet, or handle dropped on the engine side); setters and
/// position accessors report unknown handles as errors.
pub trait Engine {
    /// Turn on rigid-body simulation with the given gravity
    fn enable_physics(&mut self, gravity: Vec3) -> Result<(), EngineError>;

    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, EngineError>;

    fn create_static_geometry(
        &mut self,
        geometry: &StaticGeometry,
        material: &BodyMaterial,
    ) -> Result<BodyHandle, EngineError>;

    fn position(&self, body: BodyHandle) -> Result<Vec3, EngineError>;
    fn set_position(&mut self, body: BodyHandle, position: Vec3) -> Result<(), EngineError>;

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec3>;
    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3)
    -> Result<(), EngineError>;

    fn angular_velocity(&self, body: BodyHandle) -> Option<Vec3>;
    fn set_angular_velocity(
        &mut self,
        body: BodyHandle,
        velocity: Vec3,
    ) -> Result<(), EngineError>;

    fn apply_impulse(
        &mut self,
        body: BodyHandle,
        impulse: Vec3,
        point: Vec3,
    ) -> Result<(), EngineError>;

    /// Report contacts between `body` and any of `against` from [`Engine::step`]
    fn watch_contacts(&mut self, body: BodyHandle, against: &[BodyHandle])
    -> Result<(), EngineError>;

    /// Advance the simulation and drain contacts seen for watched pairs
    fn step(&mut self, dt: f32) -> Vec<Contact>;

    fn attach_camera(&mut self, rig: &CameraRig) -> Result<CameraHandle, EngineError>;
    fn set_active_camera(&mut self, camera: CameraHandle) -> Result<(), EngineError>;
}
