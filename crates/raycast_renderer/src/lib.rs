//! raycast renderer - tile-parallel CPU path tracing.
//!
//! Brute-force Monte Carlo path tracing over the flat primitive lists of
//! a [`raycast_core::Scene`]:
//! - Nearest-hit queries over planes and spheres
//! - Matte, metallic and dielectric scattering
//! - Thin-lens depth of field and multi-sampling per pixel
//! - A fixed worker pool claiming tiles from a shared queue
//!
//! Each tile carries its own seeded generator, so a render is
//! reproducible for a given seed and tile size.

mod encode;
mod integrator;
mod intersect;
mod material;
mod renderer;
mod tile;

pub use encode::{linear_to_gamma, linear_to_srgb, pack_pixel, unpack_pixel, ToneMap};
pub use integrator::{render_pixel, trace_path, PathSample};
pub use intersect::{
    hit_plane, hit_sphere, nearest_hit, nearest_hit_scalar, plane_distance, sphere_distance, Hit,
    MAX_DIST, MIN_DIST,
};
pub use material::{reflectance, refract, scatter, Scatter};
pub use renderer::{
    render, render_buffer, RenderConfig, RenderError, RenderResult, RenderStats, RenderedImage,
};
pub use tile::{partition, tile_edge, Tile, WorkQueue};
