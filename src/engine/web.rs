//! Browser engine bridge
//!
//! The scene engine lives on the JS side and is exposed as
//! `window.marbleBridge`. Calling conventions, shared by every method:
//! - Handles are non-negative integers (`u32`) chosen by the bridge
//! - Descriptors (`BodyDesc`, `StaticGeometry`, `BodyMaterial`, `CameraRig`)
//!   arrive as JSON strings in their serde form
//! - Vectors go in as three separate numbers and may come back as `[x, y, z]`,
//!   a `Float32Array`/`Float64Array`, or an `{x, y, z}` object
//! - Fallible methods report failure by throwing; the thrown value (string
//!   or anything else) becomes `EngineError::Rejected`
//! - Getters return `null`/`undefined` when they have no value

use glam::Vec3;
use wasm_bindgen::prelude::*;

use super::{
    BodyDesc, BodyHandle, BodyMaterial, CameraHandle, CameraRig, Contact, Engine, StaticGeometry,
    vec3_from_components,
};
use crate::error::EngineError;

#[wasm_bindgen]
extern "C" {
    /// JS-side scene engine
    pub type MarbleBridge;

    /// `enablePhysics(x, y, z)`: turn on simulation with this gravity. Throws on failure.
    #[wasm_bindgen(method, catch, js_name = enablePhysics)]
    fn enable_physics(this: &MarbleBridge, x: f32, y: f32, z: f32) -> Result<(), JsValue>;

    /// `createBody(descJson) -> handle`. Throws if physics is off or the
    /// descriptor is unusable.
    #[wasm_bindgen(method, catch, js_name = createBody)]
    fn create_body(this: &MarbleBridge, desc_json: &str) -> Result<u32, JsValue>;

    /// `createStaticGeometry(geometryJson, materialJson) -> handle`. The body is
    /// static (mass 0). Throws on failure.
    #[wasm_bindgen(method, catch, js_name = createStaticGeometry)]
    fn create_static_geometry(
        this: &MarbleBridge,
        geometry_json: &str,
        material_json: &str,
    ) -> Result<u32, JsValue>;

    /// `getPosition(handle) -> vector | null`. `null` for an unknown handle.
    #[wasm_bindgen(method, js_name = getPosition)]
    fn get_position(this: &MarbleBridge, body: u32) -> JsValue;

    /// `setPosition(handle, x, y, z)`. Throws for an unknown handle.
    #[wasm_bindgen(method, catch, js_name = setPosition)]
    fn set_position(this: &MarbleBridge, body: u32, x: f32, y: f32, z: f32) -> Result<(), JsValue>;

    /// `getLinearVelocity(handle) -> vector | null`. `null` when the body has
    /// not been simulated yet or the handle is unknown.
    #[wasm_bindgen(method, js_name = getLinearVelocity)]
    fn get_linear_velocity(this: &MarbleBridge, body: u32) -> JsValue;

    /// `setLinearVelocity(handle, x, y, z)`. Throws for an unknown handle.
    #[wasm_bindgen(method, catch, js_name = setLinearVelocity)]
    fn set_linear_velocity(this: &MarbleBridge, body: u32, x: f32, y: f32, z: f32) -> Result<(), JsValue>;

    /// `getAngularVelocity(handle) -> vector | null`, same rules as the linear getter
    #[wasm_bindgen(method, js_name = getAngularVelocity)]
    fn get_angular_velocity(this: &MarbleBridge, body: u32) -> JsValue;

    /// `setAngularVelocity(handle, x, y, z)`. Throws for an unknown handle.
    #[wasm_bindgen(method, catch, js_name = setAngularVelocity)]
    fn set_angular_velocity(this: &MarbleBridge, body: u32, x: f32, y: f32, z: f32) -> Result<(), JsValue>;

    /// `applyImpulse(handle, ix, iy, iz, px, py, pz)`: impulse `i` at world
    /// point `p`. Throws for an unknown handle.
    #[wasm_bindgen(method, catch, js_name = applyImpulse)]
    fn apply_impulse(
        this: &MarbleBridge,
        body: u32,
        ix: f32,
        iy: f32,
        iz: f32,
        px: f32,
        py: f32,
        pz: f32,
    ) -> Result<(), JsValue>;

    /// `watchContacts(handle, Uint32Array)`: report contacts between the body
    /// and any listed handle from `step`. Throws on failure.
    #[wasm_bindgen(method, catch, js_name = watchContacts)]
    fn watch_contacts(this: &MarbleBridge, body: u32, against: &[u32]) -> Result<(), JsValue>;

    /// `step(dt) -> Uint32Array | number[] | null`: advance by `dt` seconds and
    /// return contacts begun since the last step as flat
    /// `[body, other, body, other, ...]` pairs. Must not throw.
    #[wasm_bindgen(method)]
    fn step(this: &MarbleBridge, dt: f32) -> JsValue;

    /// `attachCamera(rigJson) -> handle`. Throws on failure.
    #[wasm_bindgen(method, catch, js_name = attachCamera)]
    fn attach_camera(this: &MarbleBridge, rig_json: &str) -> Result<u32, JsValue>;

    /// `setActiveCamera(handle)`. Throws for an unknown camera.
    #[wasm_bindgen(method, catch, js_name = setActiveCamera)]
    fn set_active_camera(this: &MarbleBridge, camera: u32) -> Result<(), JsValue>;
}

fn rejected(e: JsValue) -> EngineError {
    EngineError::Rejected(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, EngineError> {
    serde_json::to_string(value).map_err(|e| EngineError::Rejected(e.to_string()))
}

/// `null`/`undefined` -> `None`. Arrays, typed arrays and `{x, y, z}`
/// objects with three numbers -> `Some`.
fn vec3_from_js(value: &JsValue) -> Option<Vec3> {
    if value.is_null() || value.is_undefined() {
        return None;
    }
    let array_like = js_sys::Array::is_array(value)
        || value.is_instance_of::<js_sys::Float32Array>()
        || value.is_instance_of::<js_sys::Float64Array>();
    let components: Vec<f64> = if array_like {
        js_sys::Array::from(value)
            .iter()
            .map(|v| v.as_f64())
            .collect::<Option<_>>()?
    } else if value.is_object() {
        ["x", "y", "z"]
            .iter()
            .map(|key| {
                js_sys::Reflect::get(value, &JsValue::from_str(key))
                    .ok()
                    .and_then(|v| v.as_f64())
            })
            .collect::<Option<_>>()?
    } else {
        return None;
    };
    vec3_from_components(&components)
}

/// [`Engine`] backed by `window.marbleBridge`
pub struct BridgeEngine {
    bridge: MarbleBridge,
}

impl BridgeEngine {
    /// Find the bridge object on `window`
    pub fn from_window() -> Result<Self, EngineError> {
        let window = web_sys::window().ok_or(EngineError::NotInitialized)?;
        let bridge = js_sys::Reflect::get(&window, &JsValue::from_str("marbleBridge"))
            .map_err(rejected)?;
        if bridge.is_undefined() || bridge.is_null() {
            return Err(EngineError::NotInitialized);
        }
        Ok(Self {
            bridge: bridge.unchecked_into(),
        })
    }
}

impl Engine for BridgeEngine {
    fn enable_physics(&mut self, gravity: Vec3) -> Result<(), EngineError> {
        self.bridge
            .enable_physics(gravity.x, gravity.y, gravity.z)
            .map_err(rejected)
    }

    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, EngineError> {
        self.bridge
            .create_body(&to_json(desc)?)
            .map(BodyHandle)
            .map_err(rejected)
    }

    fn create_static_geometry(
        &mut self,
        geometry: &StaticGeometry,
        material: &BodyMaterial,
    ) -> Result<BodyHandle, EngineError> {
        self.bridge
            .create_static_geometry(&to_json(geometry)?, &to_json(material)?)
            .map(BodyHandle)
            .map_err(rejected)
    }

    fn position(&self, body: BodyHandle) -> Result<Vec3, EngineError> {
        vec3_from_js(&self.bridge.get_position(body.0)).ok_or(EngineError::UnknownBody(body))
    }

    fn set_position(&mut self, body: BodyHandle, p: Vec3) -> Result<(), EngineError> {
        self.bridge
            .set_position(body.0, p.x, p.y, p.z)
            .map_err(rejected)
    }

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec3> {
        vec3_from_js(&self.bridge.get_linear_velocity(body.0))
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, v: Vec3) -> Result<(), EngineError> {
        self.bridge
            .set_linear_velocity(body.0, v.x, v.y, v.z)
            .map_err(rejected)
    }

    fn angular_velocity(&self, body: BodyHandle) -> Option<Vec3> {
        vec3_from_js(&self.bridge.get_angular_velocity(body.0))
    }

    fn set_angular_velocity(&mut self, body: BodyHandle, v: Vec3) -> Result<(), EngineError> {
        self.bridge
            .set_angular_velocity(body.0, v.x, v.y, v.z)
            .map_err(rejected)
    }

    fn apply_impulse(&mut self, body: BodyHandle, i: Vec3, p: Vec3) -> Result<(), EngineError> {
        self.bridge
            .apply_impulse(body.0, i.x, i.y, i.z, p.x, p.y, p.z)
            .map_err(rejected)
    }

    fn watch_contacts(&mut self, body: BodyHandle, against: &[BodyHandle]) -> Result<(), EngineError> {
        let ids: Vec<u32> = against.iter().map(|h| h.0).collect();
        self.bridge.watch_contacts(body.0, &ids).map_err(rejected)
    }

    fn step(&mut self, dt: f32) -> Vec<Contact> {
        let raw = self.bridge.step(dt);
        if raw.is_null() || raw.is_undefined() {
            return Vec::new();
        }
        Contact::from_pairs(&js_sys::Uint32Array::new(&raw).to_vec())
    }

    fn attach_camera(&mut self, rig: &CameraRig) -> Result<CameraHandle, EngineError> {
        self.bridge
            .attach_camera(&to_json(rig)?)
            .map(CameraHandle)
            .map_err(rejected)
    }

    fn set_active_camera(&mut self, camera: CameraHandle) -> Result<(), EngineError> {
        self.bridge.set_active_camera(camera.0).map_err(rejected)
    }
}
