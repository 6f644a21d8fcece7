//! Ball variant catalog
//!
//! The fixed, ordered list of marble skins offered on the selection screen.
//! Built once at startup and never modified.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Which material slot a texture is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureSlot {
    Diffuse,
    Bump,
}

/// A texture reference, resolved by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureRef {
    pub url: String,
    pub slot: TextureSlot,
    #[serde(default)]
    pub has_alpha: bool,
    /// Bump strength (only meaningful for [`TextureSlot::Bump`])
    #[serde(default)]
    pub level: Option<f32>,
}

/// Surface appearance of a body. Opaque to the session core, passed through
/// to the engine untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualDescriptor {
    pub diffuse: Vec3,
    #[serde(default)]
    pub ambient: Option<Vec3>,
    #[serde(default)]
    pub specular: Option<Vec3>,
    #[serde(default)]
    pub specular_power: Option<f32>,
    #[serde(default)]
    pub emissive: Option<Vec3>,
    pub alpha: f32,
    #[serde(default)]
    pub texture: Option<TextureRef>,
}

impl Default for VisualDescriptor {
    fn default() -> Self {
        Self {
            diffuse: Vec3::ONE,
            ambient: None,
            specular: None,
            specular_power: None,
            emissive: None,
            alpha: 1.0,
            texture: None,
        }
    }
}

impl VisualDescriptor {
    /// Plain diffuse colour
    pub fn color(diffuse: Vec3) -> Self {
        Self {
            diffuse,
            ..Default::default()
        }
    }

    /// The diffuse texture, if any (bump maps don't count)
    pub fn diffuse_texture(&self) -> Option<&TextureRef> {
        self.texture
            .as_ref()
            .filter(|t| t.slot == TextureSlot::Diffuse)
    }
}

/// How a variant is previewed in the selection list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Swatch {
    Image(String),
    Rgb(u8, u8, u8),
}

impl Swatch {
    /// CSS `background` value for the option element
    pub fn css_background(&self) -> String {
        match self {
            Swatch::Image(url) => format!("url({}) center / cover", url),
            Swatch::Rgb(r, g, b) => format!("rgb({}, {}, {})", r, g, b),
        }
    }
}

/// One selectable marble skin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallVariant {
    pub id: u32,
    pub name: String,
    pub descriptor: VisualDescriptor,
}

impl BallVariant {
    /// Preview swatch: the diffuse texture when there is one, otherwise the
    /// diffuse colour scaled to 0..=255 (over-bright channels saturate)
    pub fn swatch(&self) -> Swatch {
        if let Some(texture) = self.descriptor.diffuse_texture() {
            return Swatch::Image(texture.url.clone());
        }
        let to_byte = |c: f32| (c * 255.0).round().clamp(0.0, 255.0) as u8;
        let d = self.descriptor.diffuse;
        Swatch::Rgb(to_byte(d.x), to_byte(d.y), to_byte(d.z))
    }
}

/// Ordered, immutable list of ball variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallCatalog {
    variants: Vec<BallVariant>,
}

impl BallCatalog {
    /// Build a catalog from variants, assigning ids in list order
    pub fn new(variants: impl IntoIterator<Item = (String, VisualDescriptor)>) -> Self {
        let variants = variants
            .into_iter()
            .enumerate()
            .map(|(i, (name, descriptor))| BallVariant {
                id: i as u32,
                name,
                descriptor,
            })
            .collect();
        Self { variants }
    }

    /// The six stock marbles
    pub fn standard() -> Self {
        let world_map = "/images/world-map.jpg";
        Self::new([
            (
                "Ember".to_string(),
                VisualDescriptor {
                    diffuse: Vec3::new(5.0, 0.0, 0.0),
                    ambient: Some(Vec3::new(0.0, 0.5, 0.0)),
                    specular: Some(Vec3::ZERO),
                    ..Default::default()
                },
            ),
            (
                "Orchid".to_string(),
                VisualDescriptor {
                    diffuse: Vec3::new(5.0, 0.0, 1.0),
                    ambient: Some(Vec3::new(0.0, 0.5, 0.0)),
                    specular: Some(Vec3::new(0.0, 0.0, 3.0)),
                    specular_power: Some(256.0),
                    ..Default::default()
                },
            ),
            (
                "Rainbow".to_string(),
                VisualDescriptor {
                    emissive: Some(Vec3::new(0.0, 1.0, 0.0)),
                    texture: Some(TextureRef {
                        url: "/images/rainbow.jpg".to_string(),
                        slot: TextureSlot::Diffuse,
                        has_alpha: false,
                        level: None,
                    }),
                    ..Default::default()
                },
            ),
            (
                "Ghost".to_string(),
                VisualDescriptor {
                    diffuse: Vec3::new(1.0, 0.0, 0.0),
                    ambient: Some(Vec3::new(0.0, 0.8, 0.0)),
                    alpha: 0.5,
                    ..Default::default()
                },
            ),
            (
                "Globe".to_string(),
                VisualDescriptor {
                    emissive: Some(Vec3::new(1.0, 0.0, 0.0)),
                    texture: Some(TextureRef {
                        url: world_map.to_string(),
                        slot: TextureSlot::Diffuse,
                        has_alpha: true,
                        level: None,
                    }),
                    ..Default::default()
                },
            ),
            (
                "Relief".to_string(),
                VisualDescriptor {
                    ambient: Some(Vec3::new(0.0, 0.3, 0.0)),
                    texture: Some(TextureRef {
                        url: world_map.to_string(),
                        slot: TextureSlot::Bump,
                        has_alpha: false,
                        level: Some(15.0),
                    }),
                    ..Default::default()
                },
            ),
        ])
    }

    pub fn get(&self, id: u32) -> Option<&BallVariant> {
        self.variants.get(id as usize)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BallVariant> {
        self.variants.iter()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl Default for BallCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_ids_are_dense() {
        let catalog = BallCatalog::standard();
        assert_eq!(catalog.len(), 6);
        for (i, variant) in catalog.iter().enumerate() {
            assert_eq!(variant.id, i as u32);
        }
        assert!(catalog.get(6).is_none());
    }

    #[test]
    fn test_swatch_color_saturates() {
        let catalog = BallCatalog::standard();
        let ember = catalog.get(0).unwrap();
        assert_eq!(ember.swatch(), Swatch::Rgb(255, 0, 0));
        assert_eq!(ember.swatch().css_background(), "rgb(255, 0, 0)");
    }

    #[test]
    fn test_swatch_texture_uses_image() {
        let catalog = BallCatalog::standard();
        let rainbow = catalog.get(2).unwrap();
        assert_eq!(
            rainbow.swatch(),
            Swatch::Image("/images/rainbow.jpg".to_string())
        );
    }

    #[test]
    fn test_bump_only_variant_falls_back_to_diffuse_color() {
        // Bump maps don't show in the preview; default diffuse is white
        let catalog = BallCatalog::standard();
        let relief = catalog.get(5).unwrap();
        assert_eq!(relief.swatch(), Swatch::Rgb(255, 255, 255));
    }

    #[test]
    fn test_texture_json_ignores_unknown_keys() {
        let json = r#"{ "url": "/images/earth.png", "slot": "Bump", "level": 15.0, "tiling": 4.0 }"#;
        let texture: TextureRef = serde_json::from_str(json).unwrap();
        assert_eq!(texture.slot, TextureSlot::Bump);
        assert_eq!(texture.level, Some(15.0));
        assert!(!texture.has_alpha);
    }
}
