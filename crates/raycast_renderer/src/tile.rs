//! Tile partition and the shared work queue.
//!
//! The image is cut into a row-major grid of square tiles, clipped at the
//! right and top borders. Each tile is handed the render's seed source
//! while the list is built and derives one generator per pixel from it,
//! so a pixel's samples depend neither on which worker renders its tile
//! nor on how the image was cut up.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use raycast_math::{SeedSource, XorShift32};

use crate::renderer::{RenderError, RenderResult};

/// A rectangular region of the image rendered as one unit of work.
#[derive(Debug, Clone)]
pub struct Tile {
    /// X coordinate of the tile's lower-left pixel
    pub x: u32,
    /// Y coordinate of the tile's lower-left pixel (row 0 is the bottom)
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Position in the row-major tile order
    pub index: usize,
    /// Source of the per-pixel generators
    pub seeds: SeedSource,
    /// Width of the whole image, for global pixel indices
    stride: u32,
}

impl Tile {
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Generator for the pixel at image coordinates `(x, y)`.
    ///
    /// Keyed by the pixel's global row-major index, not by its place in
    /// the tile.
    pub fn pixel_rng(&self, x: u32, y: u32) -> XorShift32 {
        let index = u64::from(y) * u64::from(self.stride) + u64::from(x);
        self.seeds.rng_for(index)
    }
}

/// Tile edge length derived from the image width and worker count.
pub fn tile_edge(width: u32, cores: usize) -> u32 {
    let cores = u32::try_from(cores.max(1)).unwrap_or(u32::MAX);
    (width / cores).max(1)
}

/// Cut a `width` x `height` image into tiles of edge `edge`.
///
/// Tiles are produced in row-major order starting at the bottom-left;
/// each gets a copy of `seeds`.
pub fn partition(
    width: u32,
    height: u32,
    edge: u32,
    seeds: SeedSource,
) -> RenderResult<Vec<Tile>> {
    if edge == 0 {
        return Err(RenderError::InvalidConfig("tile size must be at least 1".into()));
    }

    let cols = width.div_ceil(edge) as usize;
    let rows = height.div_ceil(edge) as usize;
    let count = cols * rows;

    let mut tiles = Vec::new();
    tiles
        .try_reserve_exact(count)
        .map_err(|_| RenderError::Allocation {
            what: "tiles",
            len: count,
        })?;

    let step = edge as usize;
    let mut index = 0;
    for y in (0..height).step_by(step) {
        for x in (0..width).step_by(step) {
            tiles.push(Tile {
                x,
                y,
                width: edge.min(width - x),
                height: edge.min(height - y),
                index,
                seeds,
                stride: width,
            });
            index += 1;
        }
    }

    Ok(tiles)
}

/// An immutable tile list with an atomic cursor.
///
/// Workers call [`WorkQueue::claim`] until it returns `None`. The queue
/// lives for a single render call.
#[derive(Debug)]
pub struct WorkQueue {
    tiles: Vec<Tile>,
    next: AtomicUsize,
    finished: AtomicUsize,
    bounces: AtomicU64,
}

impl WorkQueue {
    pub fn new(tiles: Vec<Tile>) -> Self {
        Self {
            tiles,
            next: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
            bounces: AtomicU64::new(0),
        }
    }

    /// Claim the next unrendered tile. Each tile is handed out exactly once.
    pub fn claim(&self) -> Option<&Tile> {
        let i = self.next.fetch_add(1, Ordering::Relaxed);
        self.tiles.get(i)
    }

    /// Record a finished tile and the bounces its paths took.
    pub fn finish_tile(&self, bounces: u64) {
        self.bounces.fetch_add(bounces, Ordering::Relaxed);
        let done = self.finished.fetch_add(1, Ordering::Relaxed) + 1;

        log::debug!(
            "Tile {}/{} done ({:.0}%)",
            done,
            self.tiles.len(),
            done as f64 * 100.0 / self.tiles.len() as f64
        );
    }

    /// Bounces recorded so far by [`WorkQueue::finish_tile`].
    pub fn total_bounces(&self) -> u64 {
        self.bounces.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
