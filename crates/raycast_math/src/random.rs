//! Deterministic random sampling.
//!
//! Every stochastic decision in the renderer draws from an explicit
//! generator passed in by `&mut`; there is no global or thread-local
//! source. That is what lets a pixel's output depend only on the render
//! seed and its position.

use rand::{RngCore, SeedableRng};

use crate::Vec3;

/// Replacement state for a zero seed. Zero is a fixed point of xorshift.
const ZERO_SEED_STATE: u32 = 0x9E37_79B9;

/// Scale from a 24-bit integer to `[0, 1)`.
const UNIT_SCALE: f32 = 1.0 / (1u32 << 24) as f32;

/// 32-bit xorshift generator (shift triple 13/17/5).
///
/// Small, fast and reproducible: the same seed always yields the same
/// sequence on every platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Create a generator. A zero seed is remapped to a fixed non-zero state.
    pub fn new(seed: u32) -> Self {
        let state = if seed == 0 { ZERO_SEED_STATE } else { seed };
        Self { state }
    }

    /// Current internal state.
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Advance the generator and return the new state.
    #[inline]
    pub fn step(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

impl RngCore for XorShift32 {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let lo = u64::from(self.step());
        let hi = u64::from(self.step());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for XorShift32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}

/// Derives independent generator seeds from a single render seed.
///
/// The seed for stream `index` is a pure function of the render seed and
/// the index, so callers can ask for any stream in any order from any
/// thread. Indices below 2^32 always map to distinct seeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSource {
    key: u32,
}

impl SeedSource {
    pub fn new(seed: u32) -> Self {
        Self { key: seed }
    }

    /// The render seed this source was built from.
    pub fn key(&self) -> u32 {
        self.key
    }

    /// Seed of stream `index`.
    pub fn seed_for(&self, index: u64) -> u32 {
        let lo = index as u32;
        let hi = (index >> 32) as u32;
        let mut h = self
            .key
            .wrapping_add(lo.wrapping_mul(0x9E37_79B9))
            ^ hi.rotate_left(16);

        // murmur3 finalizer; a bijection on u32
        h ^= h >> 16;
        h = h.wrapping_mul(0x85EB_CA6B);
        h ^= h >> 13;
        h = h.wrapping_mul(0xC2B2_AE35);
        h ^= h >> 16;
        h
    }

    /// A fresh generator for stream `index`.
    pub fn rng_for(&self, index: u64) -> XorShift32 {
        XorShift32::new(self.seed_for(index))
    }
}

/// Uniform float in `[0, 1)` from the top 24 bits of the next draw.
#[inline]
pub fn gen_f32<R: RngCore + ?Sized>(rng: &mut R) -> f32 {
    (rng.next_u32() >> 8) as f32 * UNIT_SCALE
}

/// Uniform float in `[-1, 1)`.
#[inline]
pub fn gen_f32_signed<R: RngCore + ?Sized>(rng: &mut R) -> f32 {
    2.0 * gen_f32(rng) - 1.0
}

/// Random point strictly inside the unit ball (rejection sampling).
pub fn random_in_unit_sphere<R: RngCore + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = Vec3::new(
            gen_f32_signed(rng),
            gen_f32_signed(rng),
            gen_f32_signed(rng),
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Random point strictly inside the unit disk in the XY plane.
pub fn random_in_unit_disk<R: RngCore + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = Vec3::new(gen_f32_signed(rng), gen_f32_signed(rng), 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}
