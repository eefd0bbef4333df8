//! Built-in demo scenes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use raycast_core::{matte, metallic, plane, sphere, Camera, CameraSettings, Scene, SceneResult};
use raycast_math::{Color, Vec3};

/// A 4x4 grid of jittered spheres on a grey floor, each with its own
/// random matte or metallic material.
pub fn random_grid(seed: u64, width: u32, height: u32) -> SceneResult<Scene> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut scene = Scene::new(Camera::new(CameraSettings::default(), width, height)?);

    for j in -2..2 {
        for k in -3..1 {
            let center = Vec3::new(
                j as f32 * 2.5 + rng.gen::<f32>() * 0.5,
                k as f32 * 3.5 + rng.gen::<f32>(),
                0.6,
            );
            let albedo = Color::new(rng.gen(), rng.gen(), rng.gen());

            // 40% metal, 60% matte
            let material = if rng.gen::<f32>() > 0.6 {
                metallic(albedo)
            } else {
                matte(albedo)
            };

            let id = scene.add_material(material);
            scene.add_sphere(sphere(center, 0.6, id));
        }
    }

    let floor = scene.add_material(matte(Color::splat(0.5)));
    scene.add_plane(plane(0.0, floor));

    Ok(scene)
}

/// One pink sphere resting on a grey floor.
pub fn preview(width: u32, height: u32) -> SceneResult<Scene> {
    let mut scene = Scene::new(Camera::new(CameraSettings::default(), width, height)?);

    let floor = scene.add_material(matte(Color::splat(0.5)));
    let pink = scene.add_material(matte(Color::new(0.9, 0.4, 0.7)));
    scene.add_plane(plane(0.0, floor));
    scene.add_sphere(sphere(Vec3::new(0.0, 0.0, 1.0), 1.0, pink));

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_grid_shape() {
        let scene = random_grid(1, 64, 36).unwrap();
        assert_eq!(scene.spheres.len(), 16);
        assert_eq!(scene.planes.len(), 1);
        assert_eq!(scene.materials.len(), 17);
        assert!(scene.validate().is_ok());
        assert!(scene.spheres.iter().all(|s| s.radius == 0.6 && s.center.z == 0.6));
    }

    #[test]
    fn test_random_grid_is_seeded() {
        let a = random_grid(9, 8, 8).unwrap();
        let b = random_grid(9, 8, 8).unwrap();
        let c = random_grid(10, 8, 8).unwrap();
        assert_eq!(a.spheres, b.spheres);
        assert_eq!(a.materials, b.materials);
        assert_ne!(a.spheres, c.spheres);
    }

    #[test]
    fn test_preview_scene() {
        let scene = preview(16, 16).unwrap();
        assert_eq!(scene.primitive_count(), 2);
        assert!(scene.validate().is_ok());
    }
}
