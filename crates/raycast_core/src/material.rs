//! Surface materials.

use raycast_math::Color;
use serde::{Deserialize, Serialize};

use crate::scene::TextureId;

/// Index of refraction used by [`dielectric`] when none is given (glass).
pub const DEFAULT_REFRACTION_INDEX: f32 = 1.5;

fn default_refraction_index() -> f32 {
    DEFAULT_REFRACTION_INDEX
}

/// How a surface scatters light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    /// Diffuse (Lambertian-like) reflection.
    Matte,
    /// Perfect mirror reflection tinted by the albedo.
    Metallic,
    /// Clear glass: reflects or refracts, never tints.
    Dielectric,
}

/// A surface material. Immutable once placed in a [`Scene`](crate::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub kind: MaterialKind,

    /// Attenuation colour (RGB, 0-1). Ignored by dielectrics.
    pub albedo: Color,

    /// Index of refraction, only read for dielectrics.
    #[serde(default = "default_refraction_index")]
    pub refraction_index: f32,

    /// Optional texture overriding `albedo`.
    #[serde(default)]
    pub texture: Option<TextureId>,
}

impl Material {
    pub fn new(kind: MaterialKind, albedo: Color) -> Self {
        Self {
            kind,
            albedo,
            refraction_index: DEFAULT_REFRACTION_INDEX,
            texture: None,
        }
    }

    /// Attach a texture from the scene's texture table.
    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }
}

/// A diffuse material.
pub fn matte(albedo: Color) -> Material {
    Material::new(MaterialKind::Matte, albedo)
}

/// A mirror-like metal.
pub fn metallic(albedo: Color) -> Material {
    Material::new(MaterialKind::Metallic, albedo)
}

/// A clear dielectric with the given index of refraction.
pub fn dielectric(refraction_index: f32) -> Material {
    Material {
        refraction_index,
        ..Material::new(MaterialKind::Dielectric, Color::ONE)
    }
}
