use crate::Vec3;

/// Color type alias (linear RGB, usually 0-1 per channel).
pub type Color = Vec3;

/// Channel accessors so colour code can read `r/g/b` instead of `x/y/z`.
pub trait ColorExt {
    fn r(&self) -> f32;
    fn g(&self) -> f32;
    fn b(&self) -> f32;
}

impl ColorExt for Color {
    #[inline]
    fn r(&self) -> f32 {
        self.x
    }

    #[inline]
    fn g(&self) -> f32 {
        self.y
    }

    #[inline]
    fn b(&self) -> f32 {
        self.z
    }
}
