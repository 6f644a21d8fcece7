//! Static scene layout
//!
//! Descriptions of everything spawned when a session starts. Nothing here
//! touches the engine; the session controller hands these to it.

use glam::Vec3;

use crate::catalog::{BallVariant, VisualDescriptor};
use crate::engine::{BodyDesc, BodyHandle, BodyMaterial, CameraRig, Shape, StaticGeometry};
use crate::settings::GameSettings;

/// Heightmap ground extent (world units, square)
pub const GROUND_SIZE: f32 = 2000.0;
pub const GROUND_SUBDIVISIONS: u32 = 20;
pub const GROUND_MAX_HEIGHT: f32 = 100.0;
/// Grass texture repeats per side
pub const GROUND_TEXTURE_TILING: f32 = 20.0;

pub const HEIGHTMAP_URL: &str = "/images/hmap1.png";
pub const GRASS_TEXTURE_URL: &str = "/images/texture-grass.jpg";

/// Heightmap terrain the marble rolls on
pub fn ground() -> StaticGeometry {
    StaticGeometry::Heightmap {
        name: "ground".to_string(),
        image_url: HEIGHTMAP_URL.to_string(),
        width: GROUND_SIZE,
        depth: GROUND_SIZE,
        subdivisions: GROUND_SUBDIVISIONS,
        min_height: 0.0,
        max_height: GROUND_MAX_HEIGHT,
        texture_url: GRASS_TEXTURE_URL.to_string(),
        texture_tiling: GROUND_TEXTURE_TILING,
        receive_shadows: true,
    }
}

/// The three fixed obstacles: red box, blue cylinder, green cone.
///
/// Each is raised by half its height so it sits on y = 0.
pub fn obstacles(restitution: f32) -> Vec<BodyDesc> {
    let material = BodyMaterial::fixed(restitution);
    vec![
        BodyDesc {
            name: "obstacle1".to_string(),
            shape: Shape::Box { size: 1.0 },
            position: Vec3::new(2.0, 0.5, 2.0),
            material,
            visual: VisualDescriptor::color(Vec3::new(1.0, 0.0, 0.0)),
        },
        BodyDesc {
            name: "obstacle2".to_string(),
            shape: Shape::Cylinder {
                diameter_top: 1.0,
                diameter_bottom: 1.0,
                height: 2.0,
            },
            position: Vec3::new(-2.0, 1.0, -2.0),
            material,
            visual: VisualDescriptor::color(Vec3::new(0.0, 0.0, 1.0)),
        },
        BodyDesc {
            name: "obstacle3".to_string(),
            shape: Shape::Cylinder {
                diameter_top: 0.0,
                diameter_bottom: 1.0,
                height: 2.0,
            },
            position: Vec3::new(0.0, 1.0, 3.0),
            material,
            visual: VisualDescriptor::color(Vec3::new(0.0, 1.0, 0.0)),
        },
    ]
}

/// The player's marble, skinned with the chosen variant
pub fn marble(settings: &GameSettings, variant: &BallVariant) -> BodyDesc {
    BodyDesc {
        name: "marble".to_string(),
        shape: Shape::Sphere {
            diameter: settings.marble.diameter,
        },
        position: Vec3::new(0.0, settings.marble.spawn_height, 0.0),
        material: settings.marble.material,
        visual: variant.descriptor.clone(),
    }
}

/// Key codes for a character in both cases (AZERTY ZQSD layout)
fn both_cases(c: char) -> [u32; 2] {
    [c.to_ascii_lowercase() as u32, c.to_ascii_uppercase() as u32]
}

/// Overhead free-look camera, kept out of the ground
pub fn free_camera() -> CameraRig {
    CameraRig::Free {
        name: "freeCamera".to_string(),
        position: Vec3::new(0.0, 50.0, 0.0),
        apply_gravity: true,
        check_collisions: true,
        keys_up: both_cases('z').to_vec(),
        keys_down: both_cases('s').to_vec(),
        keys_left: both_cases('q').to_vec(),
        keys_right: both_cases('d').to_vec(),
    }
}

/// Chase camera behind and above the marble
pub fn follow_camera(target: BodyHandle) -> CameraRig {
    CameraRig::Follow {
        name: "marbleFollowCamera".to_string(),
        target,
        radius: 20.0,
        height_offset: 10.0,
        rotation_offset: 180.0,
        acceleration: 0.1,
        max_speed: 5.0,
    }
}
