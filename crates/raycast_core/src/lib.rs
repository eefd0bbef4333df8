//! raycast core - scene description for the path tracer.
//!
//! This crate provides:
//!
//! - **Materials and textures**: `Material`, `MaterialKind`, `Texture`
//! - **Primitives**: `Sphere`, `Plane` (infinite, horizontal)
//! - **Camera**: thin-lens camera with depth of field
//! - **Scene**: flat primitive/material collections with validation and
//!   JSON loading
//!
//! Primitives refer to materials by [`MaterialId`] rather than by
//! reference, so a material shared by many primitives can be edited in
//! one place and the whole scene stays `Sync` for parallel reads.
//!
//! # Example
//!
//! ```ignore
//! use raycast_core::{camera, matte, plane, sphere, Scene};
//!
//! let cam = camera(25.0, Vec3::new(0.0, 12.0, 5.0), Vec3::new(0.0, 0.0, 1.0), 10.0, 0.15, 640, 360)?;
//! let mut scene = Scene::new(cam);
//! let floor = scene.add_material(matte(Vec3::splat(0.5)));
//! scene.add_plane(plane(0.0, floor));
//! ```

pub mod camera;
pub mod material;
pub mod scene;
pub mod texture;

// Re-export commonly used types
pub use camera::{camera, Camera, CameraSettings};
pub use material::{dielectric, matte, metallic, Material, MaterialKind, DEFAULT_REFRACTION_INDEX};
pub use scene::{
    plane, sphere, MaterialId, Plane, Scene, SceneError, SceneResult, Sphere, TextureId,
};
pub use texture::Texture;
