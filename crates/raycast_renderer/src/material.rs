//! Surface scattering.
//!
//! One bounce event: given the material at a hit, produce the outgoing
//! ray and its attenuation, or report that the path was absorbed.

use rand::RngCore;
use raycast_core::{Material, MaterialKind, Texture};
use raycast_math::{gen_f32, random_in_unit_sphere, Color, Ray, Vec3, VectorOps};

/// Result of a successful scatter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scatter {
    /// The outgoing ray, starting at the hit point
    pub ray: Ray,
    /// Per-channel energy kept by this bounce
    pub attenuation: Color,
}

/// Scatter `ray_in` off a surface at `hit_point` with outward `normal`.
///
/// Returns `None` when the surface absorbs the path.
pub fn scatter<R: RngCore + ?Sized>(
    material: &Material,
    textures: &[Texture],
    ray_in: &Ray,
    hit_point: Vec3,
    normal: Vec3,
    rng: &mut R,
) -> Option<Scatter> {
    match material.kind {
        MaterialKind::Matte => {
            let mut direction = normal + random_in_unit_sphere(rng);

            // Catch degenerate scatter direction
            if direction.length_squared() < 1e-8 {
                direction = normal;
            }

            Some(Scatter {
                ray: Ray::new(hit_point, VectorOps::normalize(direction)),
                attenuation: surface_color(material, textures, hit_point),
            })
        }
        MaterialKind::Metallic => {
            let reflected = VectorOps::reflect(ray_in.direction, normal);

            // A reflection into the surface is absorbed
            if reflected.dot(normal) > 0.0 {
                Some(Scatter {
                    ray: Ray::new(hit_point, reflected),
                    attenuation: surface_color(material, textures, hit_point),
                })
            } else {
                None
            }
        }
        MaterialKind::Dielectric => {
            let direction =
                dielectric_direction(ray_in.direction, normal, material.refraction_index, rng);
            Some(Scatter {
                ray: Ray::new(hit_point, direction),
                attenuation: Color::ONE,
            })
        }
    }
}

/// Albedo, or the texture value at `p` when the material has one.
#[inline]
fn surface_color(material: &Material, textures: &[Texture], p: Vec3) -> Color {
    match material.texture.and_then(|id| textures.get(id.0)) {
        Some(texture) => texture.value(p),
        None => material.albedo,
    }
}

/// Pick reflection or refraction through a dielectric boundary.
///
/// `normal` is the outward normal; when the ray is leaving the object it
/// is flipped here and the refraction ratio inverted.
fn dielectric_direction<R: RngCore + ?Sized>(
    direction: Vec3,
    normal: Vec3,
    refraction_index: f32,
    rng: &mut R,
) -> Vec3 {
    let unit_direction = direction.normalize();
    let front_face = unit_direction.dot(normal) < 0.0;
    let (normal, refraction_ratio) = if front_face {
        (normal, 1.0 / refraction_index)
    } else {
        (-normal, refraction_index)
    };

    let cos_theta = (-unit_direction).dot(normal).min(1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

    // Total internal reflection
    let cannot_refract = refraction_ratio * sin_theta > 1.0;

    if cannot_refract || reflectance(cos_theta, refraction_ratio) > gen_f32(rng) {
        VectorOps::reflect(unit_direction, normal)
    } else {
        refract(unit_direction, normal, refraction_ratio)
    }
}

/// Schlick's approximation for reflectance.
#[inline]
pub fn reflectance(cosine: f32, refraction_ratio: f32) -> f32 {
    let r0 = ((1.0 - refraction_ratio) / (1.0 + refraction_ratio)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Refract a unit vector through a surface.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

#[cfg(test)]
mod tests {
    use super::*;
    use raycast_core::{dielectric, matte, metallic, TextureId};
    use raycast_math::XorShift32;

    #[test]
    fn test_matte_always_scatters_above_surface() {
        let mat = matte(Color::new(0.9, 0.4, 0.7));
        let mut rng = XorShift32::new(11);
        let incoming = Ray::new(Vec3::new(0.0, 0.0, 2.0), -Vec3::Z);

        for _ in 0..500 {
            let s = scatter(&mat, &[], &incoming, Vec3::ZERO, Vec3::Z, &mut rng)
                .expect("matte never absorbs");
            assert_eq!(s.ray.origin, Vec3::ZERO);
            assert!((s.ray.direction.length() - 1.0).abs() < 1e-4);
            assert!(s.ray.direction.z >= 0.0);
            assert_eq!(s.attenuation, mat.albedo);
        }
    }

    #[test]
    fn test_metal_mirror_reflection() {
        let mat = metallic(Color::splat(0.8));
        let mut rng = XorShift32::new(1);
        let incoming = Ray::new(Vec3::new(-1.0, 0.0, 1.0), Vec3::new(1.0, 0.0, -1.0));

        let s = scatter(&mat, &[], &incoming, Vec3::ZERO, Vec3::Z, &mut rng).unwrap();
        assert_eq!(s.ray.direction, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(s.attenuation, Color::splat(0.8));
    }

    #[test]
    fn test_metal_absorbs_reflection_into_surface() {
        let mat = metallic(Color::ONE);
        let mut rng = XorShift32::new(1);

        // Arriving from below the outward normal: reflection points inward
        let from_inside = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.3, 0.0, 1.0));
        assert!(scatter(&mat, &[], &from_inside, Vec3::ZERO, Vec3::Z, &mut rng).is_none());

        // Grazing: reflected direction lies in the surface, dot == 0
        let grazing = Ray::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::X);
        assert!(scatter(&mat, &[], &grazing, Vec3::ZERO, Vec3::Z, &mut rng).is_none());
    }

    #[test]
    fn test_attenuation_never_increases_energy() {
        let materials = [
            matte(Color::new(0.9, 0.4, 0.7)),
            metallic(Color::new(0.95, 0.5, 0.2)),
        ];
        let mut rng = XorShift32::new(2024);

        for mat in &materials {
            let mut throughput = Color::ONE;
            let mut ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.2, 0.1, -1.0));
            for _ in 0..16 {
                let Some(s) = scatter(mat, &[], &ray, Vec3::ZERO, Vec3::Z, &mut rng) else {
                    break;
                };
                let next = throughput * s.attenuation;
                assert!(next.x < throughput.x && next.y < throughput.y && next.z < throughput.z);
                throughput = next;
                // Bounce back toward the surface for the next event
                ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), -s.ray.direction.abs());
            }
        }
    }

    #[test]
    fn test_texture_overrides_albedo() {
        let textures = [Texture::checker(Color::ONE, Color::ZERO, 1.0)];
        let mat = matte(Color::splat(0.5)).with_texture(TextureId(0));
        let mut rng = XorShift32::new(5);
        let incoming = Ray::new(Vec3::new(0.5, 0.5, 1.0), -Vec3::Z);

        let s = scatter(&mat, &textures, &incoming, Vec3::new(0.5, 0.5, 0.0), Vec3::Z, &mut rng)
            .unwrap();
        assert_eq!(s.attenuation, Color::ONE);

        let s = scatter(&mat, &textures, &incoming, Vec3::new(1.5, 0.5, 0.0), Vec3::Z, &mut rng)
            .unwrap();
        assert_eq!(s.attenuation, Color::ZERO);
    }

    #[test]
    fn test_dielectric_mostly_refracts_head_on() {
        let glass = dielectric(1.5);
        let mut rng = XorShift32::new(42);
        let incoming = Ray::new(Vec3::new(0.0, 0.0, 1.0), -Vec3::Z);

        let mut refracted = 0;
        for _ in 0..1000 {
            let s = scatter(&glass, &[], &incoming, Vec3::ZERO, Vec3::Z, &mut rng).unwrap();
            assert_eq!(s.attenuation, Color::ONE);
            if s.ray.direction.z < 0.0 {
                // Straight through at normal incidence
                assert!((s.ray.direction - -Vec3::Z).length() < 1e-4);
                refracted += 1;
            } else {
                assert!((s.ray.direction - Vec3::Z).length() < 1e-4);
            }
        }

        // Schlick gives 4% reflectance at normal incidence
        assert!(refracted > 900, "only {refracted} of 1000 refracted");
        assert!(refracted < 1000);
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        let glass = dielectric(1.5);
        let mut rng = XorShift32::new(8);

        // Leaving the glass at a grazing angle: the outward normal is +Z
        let incoming = Ray::new(Vec3::new(-1.0, 0.0, -0.1), Vec3::new(1.0, 0.0, 0.1));
        for _ in 0..50 {
            let s = scatter(&glass, &[], &incoming, Vec3::ZERO, Vec3::Z, &mut rng).unwrap();
            assert!(s.ray.direction.z < 0.0, "ray must stay inside");
            assert!(s.ray.direction.x > 0.0);
        }
    }

    #[test]
    fn test_reflectance_endpoints() {
        assert!((reflectance(1.0, 1.0 / 1.5) - 0.04).abs() < 1e-4);
        assert!((reflectance(0.0, 1.0 / 1.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_refract_bends_toward_normal() {
        let n = Vec3::Z;
        let incoming = Vec3::new(1.0, 0.0, -1.0).normalize();
        let out = refract(incoming, n, 1.0 / 1.5);

        assert!((out.length() - 1.0).abs() < 1e-4);
        // sin(out) = sin(in) / 1.5
        let sin_in = incoming.x;
        assert!((out.x - sin_in / 1.5).abs() < 1e-4);
        assert!(out.z < 0.0);
    }
}
