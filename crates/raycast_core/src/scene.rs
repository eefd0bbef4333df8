//! Scene graph types for the path tracer.
//!
//! A scene is a handful of flat collections: planes, spheres, materials
//! and textures, plus one camera. Primitives point at materials by index.

use std::path::Path;

use raycast_math::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::Camera;
use crate::material::Material;
use crate::texture::Texture;

/// Errors raised while building, validating or loading a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("{primitive} references material {index}, but the scene has {count} materials")]
    MaterialOutOfRange {
        primitive: String,
        index: usize,
        count: usize,
    },

    #[error("material {material} references texture {index}, but the scene has {count} textures")]
    TextureOutOfRange {
        material: usize,
        index: usize,
        count: usize,
    },

    #[error("Invalid primitive: {0}")]
    InvalidPrimitive(String),

    #[error("Invalid material: {0}")]
    InvalidMaterial(String),

    #[error("Invalid texture: {0}")]
    InvalidTexture(String),

    #[error("Invalid camera: {0}")]
    InvalidCamera(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene file error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Index of a material in [`Scene::materials`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(pub usize);

/// Index of a texture in [`Scene::textures`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextureId(pub usize);

/// A sphere primitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub material: MaterialId,
}

/// An infinite horizontal plane at height `z`, facing +Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub z: f32,
    pub material: MaterialId,
}

/// Create a sphere.
pub fn sphere(center: Vec3, radius: f32, material: MaterialId) -> Sphere {
    Sphere {
        center,
        radius,
        material,
    }
}

/// Create a horizontal plane at the given height.
pub fn plane(height: f32, material: MaterialId) -> Plane {
    Plane {
        z: height,
        material,
    }
}

/// The complete scene handed to the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub planes: Vec<Plane>,

    #[serde(default)]
    pub spheres: Vec<Sphere>,

    pub materials: Vec<Material>,

    #[serde(default)]
    pub textures: Vec<Texture>,

    pub camera: Camera,
}

impl Scene {
    /// Create an empty scene viewed through `camera`.
    pub fn new(camera: Camera) -> Self {
        Self {
            planes: Vec::new(),
            spheres: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            camera,
        }
    }

    /// Add a material and return its id.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    /// Add a texture and return its id.
    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        self.textures.push(texture);
        TextureId(self.textures.len() - 1)
    }

    pub fn add_sphere(&mut self, sphere: Sphere) {
        self.spheres.push(sphere);
    }

    pub fn add_plane(&mut self, plane: Plane) {
        self.planes.push(plane);
    }

    /// Look up a material.
    ///
    /// The scene must have passed [`Scene::validate`]; an out-of-range id
    /// panics.
    #[inline]
    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    /// Look up a texture. Same contract as [`Scene::material`].
    #[inline]
    pub fn texture(&self, id: TextureId) -> &Texture {
        &self.textures[id.0]
    }

    /// Number of planes plus spheres.
    pub fn primitive_count(&self) -> usize {
        self.planes.len() + self.spheres.len()
    }

    /// Check that every reference resolves and every primitive is well formed.
    pub fn validate(&self) -> SceneResult<()> {
        let count = self.materials.len();
        let check_material = |primitive: String, id: MaterialId| {
            if id.0 < count {
                Ok(())
            } else {
                Err(SceneError::MaterialOutOfRange {
                    primitive,
                    index: id.0,
                    count,
                })
            }
        };

        for (i, plane) in self.planes.iter().enumerate() {
            if !plane.z.is_finite() {
                return Err(SceneError::InvalidPrimitive(format!(
                    "plane {i} has non-finite height {}",
                    plane.z
                )));
            }
            check_material(format!("plane {i}"), plane.material)?;
        }

        for (i, sphere) in self.spheres.iter().enumerate() {
            if !(sphere.radius > 0.0 && sphere.radius.is_finite()) {
                return Err(SceneError::InvalidPrimitive(format!(
                    "sphere {i} has invalid radius {}",
                    sphere.radius
                )));
            }
            if !sphere.center.is_finite() {
                return Err(SceneError::InvalidPrimitive(format!(
                    "sphere {i} has non-finite center {:?}",
                    sphere.center
                )));
            }
            check_material(format!("sphere {i}"), sphere.material)?;
        }

        for (i, material) in self.materials.iter().enumerate() {
            if !material.albedo.is_finite() {
                return Err(SceneError::InvalidMaterial(format!(
                    "material {i} has non-finite albedo {:?}",
                    material.albedo
                )));
            }
            let ior = material.refraction_index;
            if !(ior > 0.0 && ior.is_finite()) {
                return Err(SceneError::InvalidMaterial(format!(
                    "material {i} has invalid refraction index {ior}"
                )));
            }
            if let Some(texture) = material.texture {
                if texture.0 >= self.textures.len() {
                    return Err(SceneError::TextureOutOfRange {
                        material: i,
                        index: texture.0,
                        count: self.textures.len(),
                    });
                }
            }
        }

        for (i, texture) in self.textures.iter().enumerate() {
            if let Texture::Checker { scale, .. } = *texture {
                if !(scale > 0.0 && scale.is_finite()) {
                    return Err(SceneError::InvalidTexture(format!(
                        "texture {i} has invalid checker scale {scale}"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Parse and validate a scene from JSON text.
    pub fn from_json_str(json: &str) -> SceneResult<Self> {
        let scene: Scene = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Load and validate a JSON scene file.
    pub fn load_json(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let scene = Self::from_json_str(&text)?;

        log::debug!(
            "Loaded {:?}: {} planes, {} spheres, {} materials, {} textures",
            path,
            scene.planes.len(),
            scene.spheres.len(),
            scene.materials.len(),
            scene.textures.len()
        );

        Ok(scene)
    }

    /// Serialize the scene as pretty-printed JSON.
    pub fn to_json_string(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
