//! Math primitives for the raycast path tracer.
//!
//! Vectors come from glam; this crate adds the ray type, the lane
//! abstraction used by the hot loops, and the deterministic random
//! source every sampler draws from.

// Re-export glam for convenience
pub use glam::*;

mod color;
mod interval;
mod lanes;
mod random;
mod ray;

pub use color::{Color, ColorExt};
pub use interval::Interval;
pub use lanes::{sphere_quadratic, Lane, Quadratic, Vec3x4, VectorOps};
pub use random::{
    gen_f32, gen_f32_signed, random_in_unit_disk, random_in_unit_sphere, SeedSource, XorShift32,
};
pub use ray::Ray;
