//! Monte Carlo path integrator.
//!
//! Paths are traced iteratively: each bounce multiplies the running
//! attenuation, and whatever survives is lit by the sky colour.

use rand::RngCore;
use raycast_core::{Camera, Scene};
use raycast_math::{Color, Ray};

use crate::intersect::nearest_hit;
use crate::material::scatter;
use crate::renderer::RenderConfig;

/// Radiance carried back along one camera path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub color: Color,
    /// Number of surfaces the path scattered from
    pub bounces: u64,
}

/// Follow `ray` through the scene for at most `config.max_bounces` bounces.
///
/// An absorbed path is black. Otherwise the result is the accumulated
/// attenuation times the sky colour, whether the path escaped or ran out
/// of bounces.
pub fn trace_path<R: RngCore + ?Sized>(
    scene: &Scene,
    ray: Ray,
    config: &RenderConfig,
    rng: &mut R,
) -> PathSample {
    let mut attenuation = Color::ONE;
    let mut ray = ray;
    let mut bounces = 0;

    for _ in 0..config.max_bounces {
        let Some(hit) = nearest_hit(scene, &ray) else {
            break;
        };

        let material = scene.material(hit.material);
        let hit_point = ray.at(hit.t);
        match scatter(material, &scene.textures, &ray, hit_point, hit.normal, rng) {
            Some(scattered) => {
                attenuation *= scattered.attenuation;
                ray = scattered.ray;
                bounces += 1;
            }
            None => {
                attenuation = Color::ZERO;
                break;
            }
        }
    }

    PathSample {
        color: attenuation * config.sky_color,
        bounces,
    }
}

/// Average `config.rays_per_pixel` paths through pixel `(x, y)`.
///
/// Row 0 is the bottom of the image (`t = 0`). The returned bounce count
/// is the total over all samples.
pub fn render_pixel<R: RngCore + ?Sized>(
    scene: &Scene,
    camera: &Camera,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut R,
) -> PathSample {
    let s = x as f32 / config.width as f32;
    let t = y as f32 / config.height as f32;

    let mut color = Color::ZERO;
    let mut bounces = 0;
    for _ in 0..config.rays_per_pixel {
        let ray = camera.generate_ray(s, t, rng);
        let sample = trace_path(scene, ray, config, rng);
        color += sample.color;
        bounces += sample.bounces;
    }

    PathSample {
        color: color / config.rays_per_pixel as f32,
        bounces,
    }
}
