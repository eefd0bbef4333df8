//! Procedural textures for materials.
//!
//! A material may carry an optional texture; when present, its value at
//! the world-space hit point replaces the material's flat albedo.

use raycast_math::{Color, Vec3};
use serde::{Deserialize, Serialize};

/// A procedural texture evaluated in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Texture {
    /// A single flat colour.
    Solid { color: Color },

    /// Alternating 3D cells of two colours. `scale` is the cell edge length.
    Checker { even: Color, odd: Color, scale: f32 },
}

impl Texture {
    /// Create a checker texture with the given cell size.
    pub fn checker(even: Color, odd: Color, scale: f32) -> Self {
        Self::Checker { even, odd, scale }
    }

    /// Colour of the texture at world-space point `p`.
    pub fn value(&self, p: Vec3) -> Color {
        match *self {
            Texture::Solid { color } => color,
            Texture::Checker { even, odd, scale } => {
                let cell = (p / scale).floor();
                let parity = (cell.x as i64 + cell.y as i64 + cell.z as i64).rem_euclid(2);
                if parity == 0 {
                    even
                } else {
                    odd
                }
            }
        }
    }
}
