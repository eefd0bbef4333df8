//! Nearest-hit queries against the scene's primitive lists.
//!
//! A brute-force linear scan: planes first, then spheres. A candidate
//! only replaces the current best when it is strictly closer, so on an
//! exact tie the primitive scanned first wins.
//!
//! The distance kernels are generic over [`VectorOps`]. [`nearest_hit`]
//! runs the sphere kernel four spheres at a time on [`Vec3x4`];
//! [`nearest_hit_scalar`] runs it one sphere at a time. Both visit
//! candidates in scene order and agree exactly.

use raycast_core::{MaterialId, Plane, Scene, Sphere};
use raycast_math::{sphere_quadratic, Interval, Lane, Ray, Vec3, Vec3x4, Vec4, VectorOps};

/// Hits closer than this are ignored (avoids self-intersection on bounce).
pub const MIN_DIST: f32 = 0.001;

/// Hits at or beyond this distance count as an escape.
pub const MAX_DIST: f32 = 200.0;

/// The closest intersection found along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Ray parameter of the hit point
    pub t: f32,
    /// Outward surface normal (unit length)
    pub normal: Vec3,
    /// Material of the primitive that was hit
    pub material: MaterialId,
}

impl Hit {
    fn on_sphere(sphere: &Sphere, ray: &Ray, t: f32) -> Self {
        Self {
            t,
            normal: (ray.at(t) - sphere.center).normalize(),
            material: sphere.material,
        }
    }
}

/// Find the closest primitive hit by `ray`, if any lies within `(MIN_DIST, MAX_DIST)`.
///
/// Spheres are tested in batches of [`Vec3x4::LANES`].
pub fn nearest_hit(scene: &Scene, ray: &Ray) -> Option<Hit> {
    let (mut closest, mut hit) = nearest_plane(scene, ray);

    let origin = Vec3x4::from_vec3(ray.origin);
    let direction = Vec3x4::from_vec3(ray.direction);

    for batch in scene.spheres.chunks(Vec3x4::LANES) {
        // Unused lanes hold a degenerate sphere and are never read back
        let mut centers = [Vec3::ZERO; 4];
        let mut radii = [0.0; 4];
        for (lane, sphere) in batch.iter().enumerate() {
            centers[lane] = sphere.center;
            radii[lane] = sphere.radius;
        }

        let ts = sphere_distance(
            origin,
            direction,
            Vec3x4::from_lanes(centers),
            Vec4::from_array(radii),
        );

        for (lane, sphere) in batch.iter().enumerate() {
            let t = ts[lane];
            if Interval::new(MIN_DIST, closest).surrounds(t) {
                closest = t;
                hit = Some(Hit::on_sphere(sphere, ray, t));
            }
        }
    }

    hit
}

/// [`nearest_hit`] with every sphere tested on its own.
pub fn nearest_hit_scalar(scene: &Scene, ray: &Ray) -> Option<Hit> {
    let (mut closest, mut hit) = nearest_plane(scene, ray);

    for sphere in &scene.spheres {
        if let Some(t) = hit_sphere(sphere, ray, Interval::new(MIN_DIST, closest)) {
            closest = t;
            hit = Some(Hit::on_sphere(sphere, ray, t));
        }
    }

    hit
}

/// Closest plane hit, and the distance later candidates must beat.
fn nearest_plane(scene: &Scene, ray: &Ray) -> (f32, Option<Hit>) {
    let mut closest = MAX_DIST;
    let mut hit = None;

    for plane in &scene.planes {
        if let Some(t) = hit_plane(plane, ray, Interval::new(MIN_DIST, closest)) {
            closest = t;
            hit = Some(Hit {
                t,
                normal: Vec3::Z,
                material: plane.material,
            });
        }
    }

    (closest, hit)
}

/// Ray parameter where each lane's ray crosses the plane `z = plane_z`.
///
/// A ray parallel to the plane divides by zero and yields an infinity or
/// NaN, which no interval surrounds.
#[inline]
pub fn plane_distance<V: VectorOps>(plane_z: V::Lane, origin: V, direction: V) -> V::Lane {
    (plane_z - origin.z()) / direction.z()
}

/// Ray parameter of each lane's sphere hit: the nearer root past
/// `MIN_DIST`, else the farther one.
///
/// A miss comes back as NaN.
#[inline]
pub fn sphere_distance<V: VectorOps>(
    origin: V,
    direction: V,
    center: V,
    radius: V::Lane,
) -> V::Lane {
    let q = sphere_quadratic(origin, direction, center, radius);
    let two_a = <V::Lane as Lane>::splat(2.0) * q.a;

    // sqrt of a negative discriminant is NaN and poisons both roots
    let sqrt_d = q.discriminant.sqrt();
    let near = (-q.b - sqrt_d) / two_a;
    let far = (-q.b + sqrt_d) / two_a;

    // Origin inside the sphere (or just leaving it): only the far root counts
    near.select_gt(<V::Lane as Lane>::splat(MIN_DIST), near, far)
}

/// Distance to an infinite horizontal plane, if it lies within `range`.
#[inline]
pub fn hit_plane(plane: &Plane, ray: &Ray, range: Interval) -> Option<f32> {
    let t = plane_distance(plane.z, ray.origin, ray.direction);
    range.surrounds(t).then_some(t)
}

/// Distance to a sphere, if it lies within `range`.
#[inline]
pub fn hit_sphere(sphere: &Sphere, ray: &Ray, range: Interval) -> Option<f32> {
    let t = sphere_distance(ray.origin, ray.direction, sphere.center, sphere.radius);
    range.surrounds(t).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use raycast_core::{camera, matte, plane, sphere, CameraSettings, Camera};
    use raycast_math::Color;

    fn empty_scene() -> Scene {
        Scene::new(Camera::new(CameraSettings::default(), 4, 4).unwrap())
    }

    fn scene_with_sphere(radius: f32) -> Scene {
        let mut scene = empty_scene();
        let m = scene.add_material(matte(Color::splat(0.5)));
        scene.add_sphere(sphere(Vec3::ZERO, radius, m));
        scene
    }

    #[test]
    fn test_sphere_hit_front() {
        let scene = scene_with_sphere(1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);

        let hit = nearest_hit(&scene, &ray).expect("should hit");
        assert!((hit.t - 4.0).abs() < 1e-5); // d - r
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_sphere_hit_unnormalized_direction() {
        let scene = scene_with_sphere(1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -2.0));

        let hit = nearest_hit(&scene, &ray).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-5);
        assert!((ray.at(hit.t) - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss_when_aimed_away() {
        let scene = scene_with_sphere(1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(nearest_hit(&scene, &ray).is_none());

        let sideways = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::X);
        assert!(nearest_hit(&scene, &sideways).is_none());
    }

    #[test]
    fn test_sphere_tangent_hit() {
        let scene = scene_with_sphere(1.0);
        // Grazes the sphere at (1, 0, 0)
        let ray = Ray::new(Vec3::new(1.0, 0.0, 5.0), -Vec3::Z);

        let hit = nearest_hit(&scene, &ray).expect("tangent ray should hit");
        assert!((hit.t - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_sphere_from_inside_uses_far_root() {
        let scene = scene_with_sphere(2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let hit = nearest_hit(&scene, &ray).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-5);
        // Normal stays outward even though the ray is leaving
        assert!((hit.normal - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_plane_hit_and_parallel_miss() {
        let mut scene = empty_scene();
        let m = scene.add_material(matte(Color::ONE));
        scene.add_plane(plane(0.0, m));

        let down = Ray::new(Vec3::new(3.0, -2.0, 4.0), Vec3::new(0.0, 0.0, -2.0));
        let hit = nearest_hit(&scene, &down).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-6);
        assert_eq!(hit.normal, Vec3::Z);

        // Parallel above the plane: t = -inf
        let parallel = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::X);
        assert!(nearest_hit(&scene, &parallel).is_none());

        // Parallel inside the plane: t = 0/0 = NaN
        let inside = Ray::new(Vec3::ZERO, Vec3::Y);
        assert!(nearest_hit(&scene, &inside).is_none());
    }

    #[test]
    fn test_hits_beyond_max_dist_escape() {
        let mut scene = empty_scene();
        let m = scene.add_material(matte(Color::ONE));
        scene.add_sphere(sphere(Vec3::new(0.0, 0.0, -500.0), 1.0, m));

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        assert!(nearest_hit(&scene, &ray).is_none());
    }

    #[test]
    fn test_closest_wins_regardless_of_order() {
        let mut scene = empty_scene();
        let far = scene.add_material(matte(Color::splat(0.1)));
        let near = scene.add_material(matte(Color::splat(0.9)));
        scene.add_sphere(sphere(Vec3::new(0.0, 0.0, -10.0), 1.0, far));
        scene.add_sphere(sphere(Vec3::new(0.0, 0.0, -4.0), 1.0, near));
        scene.add_plane(plane(-20.0, far));

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let hit = nearest_hit(&scene, &ray).unwrap();
        assert_eq!(hit.material, near);
        assert!((hit.t - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_exact_tie_keeps_first_in_scan_order() {
        let mut scene = empty_scene();
        let first = scene.add_material(matte(Color::splat(0.2)));
        let second = scene.add_material(matte(Color::splat(0.8)));
        scene.add_sphere(sphere(Vec3::ZERO, 1.0, first));
        scene.add_sphere(sphere(Vec3::ZERO, 1.0, second));

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        assert_eq!(nearest_hit(&scene, &ray).unwrap().material, first);
    }

    #[test]
    fn test_min_dist_skips_surface_at_origin() {
        let scene = scene_with_sphere(1.0);
        // Starting exactly on the surface and heading outward
        let ray = Ray::new(Vec3::Z, Vec3::Z);
        assert!(nearest_hit(&scene, &ray).is_none());
    }

    #[test]
    fn test_wide_scan_matches_scalar_scan() {
        let mut scene = empty_scene();
        let m = scene.add_material(matte(Color::splat(0.5)));
        scene.add_plane(plane(-0.5, m));
        // Eleven spheres: two full batches and a partial one
        for i in 0..11 {
            let f = i as f32;
            let material = scene.add_material(matte(Color::splat(f / 11.0)));
            let center = Vec3::new(f - 5.0, (f * 1.7).sin() * 3.0, (f * 0.9).cos() * 2.0);
            scene.add_sphere(sphere(center, 0.4 + 0.1 * (i % 4) as f32, material));
        }
        // Duplicate of sphere 3 to exercise ties inside a batch
        let dup = scene.spheres[3];
        scene.add_sphere(dup);

        let mut rng = raycast_math::XorShift32::new(0xBEEF);
        let mut hits = 0;
        for _ in 0..2000 {
            let origin = Vec3::new(
                rng.gen_range(-8.0..8.0),
                rng.gen_range(-8.0..8.0),
                rng.gen_range(-3.0..6.0),
            );
            let direction = raycast_math::random_in_unit_sphere(&mut rng);
            let ray = Ray::new(origin, direction);

            let wide = nearest_hit(&scene, &ray);
            assert_eq!(wide, nearest_hit_scalar(&scene, &ray), "ray {:?}", ray);
            hits += wide.is_some() as u32;
        }
        assert!(hits > 0);
    }

    #[test]
    fn test_sphere_distance_wide_matches_scalar() {
        let origin = Vec3::new(0.0, 0.0, 5.0);
        let direction = -Vec3::Z;
        let centers = [
            Vec3::ZERO,                // front hit
            Vec3::new(3.0, 0.0, 0.0),  // miss
            Vec3::new(0.0, 0.0, 5.0),  // origin inside
            Vec3::new(1.0, 0.0, 0.0),  // tangent
        ];

        let wide = sphere_distance(
            Vec3x4::from_vec3(origin),
            Vec3x4::from_vec3(direction),
            Vec3x4::from_lanes(centers),
            Vec4::ONE,
        );

        for (i, center) in centers.iter().enumerate() {
            let scalar = sphere_distance(origin, direction, *center, 1.0);
            if scalar.is_nan() {
                assert!(wide[i].is_nan());
            } else {
                assert_eq!(wide[i], scalar);
            }
        }
        assert!((wide[0] - 4.0).abs() < 1e-5);
        assert!(wide[1].is_nan());
        assert!((wide[2] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_plane_distance_wide() {
        let origins = Vec3x4::from_lanes([
            Vec3::new(0.0, 0.0, 4.0),
            Vec3::new(1.0, 1.0, 2.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
        ]);
        let directions = Vec3x4::from_lanes([-Vec3::Z, Vec3::new(0.0, 0.0, -2.0), Vec3::X, Vec3::Z]);

        let t = plane_distance(Vec4::ZERO, origins, directions);
        assert_eq!(t[0], 4.0);
        assert_eq!(t[1], 1.0);
        assert!(t[2].is_infinite());
        assert_eq!(t[3], 1.0);
    }

    #[test]
    fn test_camera_factory_scene_hits_floor() {
        let cam = camera(
            25.0,
            Vec3::new(0.0, 12.0, 5.0),
            Vec3::new(0.0, 0.0, 1.0),
            10.0,
            0.0,
            4,
            4,
        )
        .unwrap();
        let mut scene = Scene::new(cam);
        let m = scene.add_material(matte(Color::ONE));
        scene.add_plane(plane(0.0, m));

        let mut rng = raycast_math::XorShift32::new(3);
        let ray = scene.camera.generate_ray(0.5, 0.0, &mut rng);
        assert!(nearest_hit(&scene, &ray).is_some());
    }
}
