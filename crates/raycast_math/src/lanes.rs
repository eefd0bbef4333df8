//! Lane abstraction over 3-component vectors.
//!
//! Geometry kernels are written once against [`VectorOps`]. The scalar
//! backend (`Vec3`, one lane) is always available; [`Vec3x4`] packs four vectors in
//! structure-of-arrays form on top of `Vec4` so the same kernel can
//! test one ray against four primitives at once.

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::{Vec3, Vec4};

/// Per-lane scalar type: `f32` for one lane, `Vec4` for four.
pub trait Lane:
    Copy
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    fn splat(v: f32) -> Self;
    fn sqrt(self) -> Self;
    /// Per lane: `a` where `self > threshold`, else `b`. NaN picks `b`.
    fn select_gt(self, threshold: Self, a: Self, b: Self) -> Self;
}

impl Lane for f32 {
    #[inline]
    fn splat(v: f32) -> Self {
        v
    }

    #[inline]
    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }

    #[inline]
    fn select_gt(self, threshold: Self, a: Self, b: Self) -> Self {
        if self > threshold {
            a
        } else {
            b
        }
    }
}

impl Lane for Vec4 {
    #[inline]
    fn splat(v: f32) -> Self {
        Vec4::splat(v)
    }

    #[inline]
    fn sqrt(self) -> Self {
        Vec4::from_array(self.to_array().map(f32::sqrt))
    }

    #[inline]
    fn select_gt(self, threshold: Self, a: Self, b: Self) -> Self {
        Vec4::select(self.cmpgt(threshold), a, b)
    }
}

/// Vector operations shared by the scalar and wide backends.
pub trait VectorOps:
    Copy
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
{
    type Lane: Lane;

    /// Number of vectors processed per operation.
    const LANES: usize;

    fn splat(v: f32) -> Self;
    /// The z component of every lane.
    fn z(self) -> Self::Lane;
    /// Multiply every component by a per-lane scalar.
    fn scale(self, s: Self::Lane) -> Self;
    fn dot(self, rhs: Self) -> Self::Lane;
    fn cross(self, rhs: Self) -> Self;

    #[inline]
    fn length_squared(self) -> Self::Lane {
        VectorOps::dot(self, self)
    }

    #[inline]
    fn length(self) -> Self::Lane {
        VectorOps::length_squared(self).sqrt()
    }

    #[inline]
    fn normalize(self) -> Self {
        self.scale(<Self::Lane as Lane>::splat(1.0) / VectorOps::length(self))
    }

    /// Mirror `self` about `normal` (`normal` is expected to be unit length).
    #[inline]
    fn reflect(self, normal: Self) -> Self {
        let two = <Self::Lane as Lane>::splat(2.0);
        self - normal.scale(two * VectorOps::dot(self, normal))
    }
}

impl VectorOps for Vec3 {
    type Lane = f32;
    const LANES: usize = 1;

    #[inline]
    fn splat(v: f32) -> Self {
        Vec3::splat(v)
    }

    #[inline]
    fn z(self) -> f32 {
        self.z
    }

    #[inline]
    fn scale(self, s: f32) -> Self {
        self * s
    }

    #[inline]
    fn dot(self, rhs: Self) -> f32 {
        Vec3::dot(self, rhs)
    }

    #[inline]
    fn cross(self, rhs: Self) -> Self {
        Vec3::cross(self, rhs)
    }
}

/// Four `Vec3`s stored as three `Vec4` component rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3x4 {
    pub x: Vec4,
    pub y: Vec4,
    pub z: Vec4,
}

impl Vec3x4 {
    pub fn new(x: Vec4, y: Vec4, z: Vec4) -> Self {
        Self { x, y, z }
    }

    /// Broadcast one vector into every lane.
    pub fn from_vec3(v: Vec3) -> Self {
        Self::new(Vec4::splat(v.x), Vec4::splat(v.y), Vec4::splat(v.z))
    }

    pub fn from_lanes(lanes: [Vec3; 4]) -> Self {
        Self::new(
            Vec4::from_array(lanes.map(|v| v.x)),
            Vec4::from_array(lanes.map(|v| v.y)),
            Vec4::from_array(lanes.map(|v| v.z)),
        )
    }

    /// Extract lane `i` (0..4).
    pub fn lane(&self, i: usize) -> Vec3 {
        Vec3::new(self.x[i], self.y[i], self.z[i])
    }
}

impl Add for Vec3x4 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3x4 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul for Vec3x4 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }
}

impl Mul<Vec4> for Vec3x4 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Vec4) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3x4 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl VectorOps for Vec3x4 {
    type Lane = Vec4;
    const LANES: usize = 4;

    #[inline]
    fn splat(v: f32) -> Self {
        Self::from_vec3(Vec3::splat(v))
    }

    #[inline]
    fn z(self) -> Vec4 {
        self.z
    }

    #[inline]
    fn scale(self, s: Vec4) -> Self {
        self * s
    }

    #[inline]
    fn dot(self, rhs: Self) -> Vec4 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }
}

/// Coefficients of the ray/sphere quadratic `a t² + b t + c = 0`.
#[derive(Debug, Clone, Copy)]
pub struct Quadratic<L> {
    pub a: L,
    pub b: L,
    pub c: L,
    pub discriminant: L,
}

/// Set up the ray/sphere quadratic for `origin + t * direction`.
///
/// `direction` need not be normalized; `a` absorbs its length.
#[inline]
pub fn sphere_quadratic<V: VectorOps>(
    origin: V,
    direction: V,
    center: V,
    radius: V::Lane,
) -> Quadratic<V::Lane> {
    let displacement = origin - center;
    let two = <V::Lane as Lane>::splat(2.0);
    let four = <V::Lane as Lane>::splat(4.0);

    let a = VectorOps::dot(direction, direction);
    let b = two * VectorOps::dot(direction, displacement);
    let c = VectorOps::dot(displacement, displacement) - radius * radius;

    Quadratic {
        a,
        b,
        c,
        discriminant: b * b - four * a * c,
    }
}
