//! In-memory engine
//!
//! Stores bodies and cameras without rendering anything. Good enough to drive
//! a session from tests or the native binary:
//! - `step` moves dynamic bodies by their linear velocity (no forces, no ground)
//! - contacts are bounding-sphere overlaps, reported once when they begin
//! - impulses act through the center of mass

use std::collections::HashSet;

use glam::Vec3;

use super::{
    BodyDesc, BodyHandle, BodyMaterial, CameraHandle, CameraRig, Contact, Engine, Shape,
    StaticGeometry,
};
use crate::error::EngineError;

#[derive(Debug, Clone)]
struct Body {
    name: String,
    /// `None` for terrain, which never takes part in contact checks
    shape: Option<Shape>,
    position: Vec3,
    material: BodyMaterial,
    /// `None` until first set or simulated
    linear: Option<Vec3>,
    angular: Option<Vec3>,
}

#[derive(Debug, Clone)]
struct Watch {
    body: BodyHandle,
    against: Vec<BodyHandle>,
}

/// Headless [`Engine`] implementation
#[derive(Debug, Clone, Default)]
pub struct HeadlessEngine {
    gravity: Option<Vec3>,
    /// Indexed by handle; `None` once a body is forgotten
    bodies: Vec<Option<Body>>,
    watches: Vec<Watch>,
    touching: HashSet<(BodyHandle, BodyHandle)>,
    cameras: Vec<CameraRig>,
    active_camera: Option<CameraHandle>,
    steps: u64,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn physics_enabled(&self) -> bool {
        self.gravity.is_some()
    }

    pub fn gravity(&self) -> Option<Vec3> {
        self.gravity
    }

    /// Number of live bodies (terrain included)
    pub fn body_count(&self) -> usize {
        self.bodies.iter().flatten().count()
    }

    /// Look a body up by the name it was created with
    pub fn find_body(&self, name: &str) -> Option<BodyHandle> {
        self.bodies
            .iter()
            .position(|b| b.as_ref().is_some_and(|b| b.name == name))
            .map(|i| BodyHandle(i as u32))
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    pub fn camera(&self, camera: CameraHandle) -> Option<&CameraRig> {
        self.cameras.get(camera.0 as usize)
    }

    pub fn active_camera(&self) -> Option<CameraHandle> {
        self.active_camera
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Drop a body, as if the engine disposed of it behind our back
    pub fn forget_body(&mut self, body: BodyHandle) {
        if let Some(slot) = self.bodies.get_mut(body.0 as usize) {
            *slot = None;
        }
        self.touching.retain(|&(a, b)| a != body && b != body);
    }

    fn body(&self, handle: BodyHandle) -> Result<&Body, EngineError> {
        self.bodies
            .get(handle.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(EngineError::UnknownBody(handle))
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut Body, EngineError> {
        self.bodies
            .get_mut(handle.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(EngineError::UnknownBody(handle))
    }

    fn insert(&mut self, body: Body) -> Result<BodyHandle, EngineError> {
        if !self.physics_enabled() {
            return Err(EngineError::NotInitialized);
        }
        if !body.position.is_finite() {
            return Err(EngineError::Rejected(format!(
                "body `{}` has a non-finite position",
                body.name
            )));
        }
        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(Some(body));
        Ok(handle)
    }

    fn overlapping(&self, a: BodyHandle, b: BodyHandle) -> bool {
        let (Ok(a), Ok(b)) = (self.body(a), self.body(b)) else {
            return false;
        };
        let (Some(sa), Some(sb)) = (a.shape, b.shape) else {
            return false;
        };
        a.position.distance(b.position) <= sa.bounding_radius() + sb.bounding_radius()
    }
}

impl Engine for HeadlessEngine {
    fn enable_physics(&mut self, gravity: Vec3) -> Result<(), EngineError> {
        self.gravity = Some(gravity);
        log::debug!("Headless physics enabled, gravity {:?}", gravity);
        Ok(())
    }

    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, EngineError> {
        self.insert(Body {
            name: desc.name.clone(),
            shape: Some(desc.shape),
            position: desc.position,
            material: desc.material,
            linear: None,
            angular: None,
        })
    }

    fn create_static_geometry(
        &mut self,
        geometry: &StaticGeometry,
        material: &BodyMaterial,
    ) -> Result<BodyHandle, EngineError> {
        let StaticGeometry::Heightmap { name, .. } = geometry;
        self.insert(Body {
            name: name.clone(),
            shape: None,
            position: Vec3::ZERO,
            material: BodyMaterial {
                mass: 0.0,
                ..*material
            },
            linear: None,
            angular: None,
        })
    }

    fn position(&self, body: BodyHandle) -> Result<Vec3, EngineError> {
        Ok(self.body(body)?.position)
    }

    fn set_position(&mut self, body: BodyHandle, position: Vec3) -> Result<(), EngineError> {
        self.body_mut(body)?.position = position;
        Ok(())
    }

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec3> {
        self.body(body).ok().and_then(|b| b.linear)
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> Result<(), EngineError> {
        self.body_mut(body)?.linear = Some(velocity);
        Ok(())
    }

    fn angular_velocity(&self, body: BodyHandle) -> Option<Vec3> {
        self.body(body).ok().and_then(|b| b.angular)
    }

    fn set_angular_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> Result<(), EngineError> {
        self.body_mut(body)?.angular = Some(velocity);
        Ok(())
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec3, _point: Vec3) -> Result<(), EngineError> {
        let b = self.body_mut(body)?;
        if b.material.is_static() {
            return Ok(());
        }
        let v = b.linear.unwrap_or(Vec3::ZERO);
        b.linear = Some(v + impulse / b.material.mass);
        Ok(())
    }

    fn watch_contacts(&mut self, body: BodyHandle, against: &[BodyHandle]) -> Result<(), EngineError> {
        self.body(body)?;
        for &other in against {
            self.body(other)?;
        }
        self.watches.push(Watch {
            body,
            against: against.to_vec(),
        });
        Ok(())
    }

    fn step(&mut self, dt: f32) -> Vec<Contact> {
        if !self.physics_enabled() {
            return Vec::new();
        }
        self.steps += 1;

        for body in self.bodies.iter_mut().flatten() {
            if body.material.is_static() {
                continue;
            }
            let v = *body.linear.get_or_insert(Vec3::ZERO);
            body.angular.get_or_insert(Vec3::ZERO);
            body.position += v * dt;
        }

        let mut contacts = Vec::new();
        for watch in &self.watches {
            for &other in &watch.against {
                let pair = (watch.body, other);
                if self.overlapping(watch.body, other) {
                    if !self.touching.contains(&pair) {
                        contacts.push(Contact {
                            body: watch.body,
                            other,
                        });
                    }
                } else {
                    self.touching.remove(&pair);
                }
            }
        }
        for contact in &contacts {
            self.touching.insert((contact.body, contact.other));
        }
        contacts
    }

    fn attach_camera(&mut self, rig: &CameraRig) -> Result<CameraHandle, EngineError> {
        if let CameraRig::Follow { target, .. } = rig {
            self.body(*target)?;
        }
        let handle = CameraHandle(self.cameras.len() as u32);
        self.cameras.push(rig.clone());
        Ok(handle)
    }

    fn set_active_camera(&mut self, camera: CameraHandle) -> Result<(), EngineError> {
        if self.camera(camera).is_none() {
            return Err(EngineError::Rejected(format!("unknown camera {:?}", camera)));
        }
        self.active_camera = Some(camera);
        Ok(())
    }
}
