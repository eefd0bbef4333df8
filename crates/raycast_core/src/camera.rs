//! Thin-lens camera for ray generation.
//!
//! World space is Z-up. The camera basis, viewport spans and lens radius
//! are derived once at construction; generating a ray only reads them.

use rand::RngCore;
use raycast_math::{random_in_unit_disk, Ray, Vec3};
use serde::{Deserialize, Serialize};

use crate::scene::{SceneError, SceneResult};

/// The user-facing parameters a [`Camera`] is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Eye position
    pub eye: Vec3,
    /// Point the camera looks at
    pub look_at: Vec3,
    /// Distance from the eye to the plane of perfect focus
    pub focus_distance: f32,
    /// Lens diameter; 0 gives a pinhole camera
    pub aperture: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov: 25.0,
            eye: Vec3::new(0.0, 12.0, 5.0),
            look_at: Vec3::new(0.0, 0.0, 1.0),
            focus_distance: 10.0,
            aperture: 0.15,
        }
    }
}

/// A depth-of-field camera. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CameraDescriptor", into = "CameraDescriptor")]
pub struct Camera {
    settings: CameraSettings,
    width: u32,
    height: u32,

    // Derived at construction
    position: Vec3,
    u: Vec3,
    v: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    lens_radius: f32,
}

/// Serialized form of a camera: its settings plus the image size.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CameraDescriptor {
    #[serde(flatten)]
    settings: CameraSettings,
    width: u32,
    height: u32,
}

impl TryFrom<CameraDescriptor> for Camera {
    type Error = SceneError;

    fn try_from(desc: CameraDescriptor) -> SceneResult<Self> {
        Camera::new(desc.settings, desc.width, desc.height)
    }
}

impl From<Camera> for CameraDescriptor {
    fn from(camera: Camera) -> Self {
        Self {
            settings: camera.settings,
            width: camera.width,
            height: camera.height,
        }
    }
}

impl Camera {
    /// Derive a camera for an image of `width` x `height` pixels.
    pub fn new(settings: CameraSettings, width: u32, height: u32) -> SceneResult<Self> {
        if width == 0 || height == 0 {
            return Err(SceneError::InvalidCamera(format!(
                "image size {width}x{height} has no pixels"
            )));
        }
        if !(settings.fov > 0.0 && settings.fov < 180.0) {
            return Err(SceneError::InvalidCamera(format!(
                "field of view {} is outside (0, 180) degrees",
                settings.fov
            )));
        }
        if !(settings.focus_distance > 0.0) {
            return Err(SceneError::InvalidCamera(format!(
                "focus distance {} must be positive",
                settings.focus_distance
            )));
        }
        if !(settings.aperture >= 0.0) {
            return Err(SceneError::InvalidCamera(format!(
                "aperture {} must not be negative",
                settings.aperture
            )));
        }

        let theta = settings.fov.to_radians();
        let aspect_ratio = width as f32 / height as f32;
        let viewport_height = 2.0 * (theta / 2.0).tan();
        let viewport_width = aspect_ratio * viewport_height;

        let w = (settings.eye - settings.look_at).normalize_or_zero();
        if w == Vec3::ZERO {
            return Err(SceneError::InvalidCamera(
                "eye and look-at points coincide".to_string(),
            ));
        }
        let u = Vec3::Z.cross(w).normalize_or_zero();
        if u == Vec3::ZERO {
            return Err(SceneError::InvalidCamera(
                "view direction is parallel to the world up axis".to_string(),
            ));
        }
        let v = w.cross(u);

        let position = settings.eye;
        let horizontal = settings.focus_distance * viewport_width * u;
        let vertical = settings.focus_distance * viewport_height * v;
        let lower_left_corner =
            position - horizontal / 2.0 - vertical / 2.0 - settings.focus_distance * w;

        Ok(Self {
            settings,
            width,
            height,
            position,
            u,
            v,
            lower_left_corner,
            horizontal,
            vertical,
            lens_radius: settings.aperture / 2.0,
        })
    }

    /// Rebuild the same camera for a different image size.
    pub fn with_resolution(&self, width: u32, height: u32) -> SceneResult<Self> {
        Self::new(self.settings, width, height)
    }

    /// Generate a ray through normalized image coordinates `s`, `t` in `[0, 1]`.
    ///
    /// `(0, 0)` is the lower-left corner of the image. The origin is jittered
    /// across the lens disk; the direction is left unnormalized.
    pub fn generate_ray<R: RngCore + ?Sized>(&self, s: f32, t: f32, rng: &mut R) -> Ray {
        let rd = self.lens_radius * random_in_unit_disk(rng);
        let offset = self.u * rd.x + self.v * rd.y;

        let origin = self.position + offset;
        let direction =
            self.lower_left_corner + s * self.horizontal + t * self.vertical - self.position - offset;

        Ray::new(origin, direction)
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn lens_radius(&self) -> f32 {
        self.lens_radius
    }
}

/// Build a camera from the usual scene-authoring parameters.
pub fn camera(
    fov_degrees: f32,
    eye: Vec3,
    look_at: Vec3,
    focus_distance: f32,
    aperture: f32,
    width: u32,
    height: u32,
) -> SceneResult<Camera> {
    let settings = CameraSettings {
        fov: fov_degrees,
        eye,
        look_at,
        focus_distance,
        aperture,
    };
    Camera::new(settings, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use raycast_math::XorShift32;

    fn preview_camera(aperture: f32) -> Camera {
        camera(
            25.0,
            Vec3::new(0.0, 12.0, 5.0),
            Vec3::new(0.0, 0.0, 1.0),
            10.0,
            aperture,
            16,
            16,
        )
        .unwrap()
    }

    #[test]
    fn test_camera_basis_is_orthonormal() {
        let cam = preview_camera(0.15);
        assert!((cam.u.length() - 1.0).abs() < 1e-5);
        assert!((cam.v.length() - 1.0).abs() < 1e-5);
        assert!(cam.u.dot(cam.v).abs() < 1e-5);
        assert!((cam.lens_radius() - 0.075).abs() < 1e-6);
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let cam = preview_camera(0.0);
        let mut rng = XorShift32::new(1);

        let ray = cam.generate_ray(0.5, 0.5, &mut rng);
        let expected = (Vec3::new(0.0, 0.0, 1.0) - cam.position()).normalize();

        // Pinhole: no lens jitter at all
        assert_eq!(ray.origin, cam.position());
        assert!((ray.direction.normalize() - expected).length() < 1e-4);
    }

    #[test]
    fn test_rays_converge_on_focus_plane() {
        let cam = preview_camera(1.0);
        let mut rng = XorShift32::new(77);

        // Every lens sample for the same (s, t) hits the same focus-plane point
        let focus_point = |ray: Ray| ray.at(1.0);
        let first = focus_point(cam.generate_ray(0.3, 0.7, &mut rng));
        for _ in 0..16 {
            let p = focus_point(cam.generate_ray(0.3, 0.7, &mut rng));
            assert!((p - first).length() < 1e-3);
        }
    }

    #[test]
    fn test_generate_ray_is_deterministic() {
        let cam = preview_camera(0.15);
        let mut a = XorShift32::new(9);
        let mut b = XorShift32::new(9);
        assert_eq!(
            cam.generate_ray(0.1, 0.9, &mut a),
            cam.generate_ray(0.1, 0.9, &mut b)
        );
    }

    #[test]
    fn test_invalid_cameras() {
        let settings = CameraSettings::default();
        assert!(matches!(
            Camera::new(settings, 0, 10),
            Err(SceneError::InvalidCamera(_))
        ));

        let straight_down = CameraSettings {
            eye: Vec3::new(0.0, 0.0, 10.0),
            look_at: Vec3::ZERO,
            ..settings
        };
        assert!(Camera::new(straight_down, 10, 10).is_err());

        let same_point = CameraSettings {
            look_at: settings.eye,
            ..settings
        };
        assert!(Camera::new(same_point, 10, 10).is_err());
    }

    #[test]
    fn test_with_resolution_keeps_settings() {
        let cam = preview_camera(0.15);
        let wide = cam.with_resolution(32, 16).unwrap();
        assert_eq!(wide.settings(), cam.settings());
        assert_eq!((wide.width(), wide.height()), (32, 16));
    }

    #[test]
    fn test_json_roundtrip_rederives() {
        let cam = preview_camera(0.15);
        let json = serde_json::to_string(&cam).unwrap();
        assert!(json.contains("\"fov\""));
        let back: Camera = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cam);
    }
}
