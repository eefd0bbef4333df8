//! Render configuration and the parallel tile renderer.
//!
//! A render call validates its inputs, partitions the image, then runs a
//! fixed pool of workers that claim tiles from a shared queue until it is
//! empty. Workers write packed pixels straight into a shared buffer of
//! atomics; tiles are disjoint, so every slot has exactly one writer.
//! The pool is scoped to the call and its threads are joined before
//! `render` returns.

use std::borrow::Cow;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use raycast_core::{Camera, Scene, SceneError};
use raycast_math::{Color, SeedSource};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encode::{pack_pixel, unpack_pixel, ToneMap};
use crate::integrator::render_pixel;
use crate::tile::{partition, tile_edge, WorkQueue};

/// Errors that can abort a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid render config: {0}")]
    InvalidConfig(String),

    #[error("Invalid scene: {0}")]
    Scene(#[from] SceneError),

    #[error("Could not allocate {len} {what}")]
    Allocation { what: &'static str, len: usize },

    #[error("Failed to start worker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Number of worker threads
    pub cores: usize,
    /// Camera paths averaged per pixel
    pub rays_per_pixel: u32,
    /// Maximum surface interactions per path
    pub max_bounces: u32,
    /// Radiance of every escaping path
    pub sky_color: Color,
    /// Render seed; per-pixel generators are derived from it
    pub seed: u32,
    /// Tile edge override. When unset the edge is derived from `width / cores`.
    /// Only affects scheduling, never the pixels.
    pub tile_size: Option<u32>,
    /// Transfer curve used when packing pixels
    pub tone_map: ToneMap,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            cores: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            rays_per_pixel: 128,
            max_bounces: 8,
            sky_color: Color::new(0.5, 0.7, 1.0),
            seed: 0x2545_F491,
            tile_size: None,
            tone_map: ToneMap::Gamma2,
        }
    }
}

impl RenderConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_cores(mut self, cores: usize) -> Self {
        self.cores = cores;
        self
    }

    pub fn with_rays_per_pixel(mut self, rays_per_pixel: u32) -> Self {
        self.rays_per_pixel = rays_per_pixel;
        self
    }

    pub fn with_max_bounces(mut self, max_bounces: u32) -> Self {
        self.max_bounces = max_bounces;
        self
    }

    pub fn with_sky_color(mut self, sky_color: Color) -> Self {
        self.sky_color = sky_color;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = Some(tile_size);
        self
    }

    pub fn with_tone_map(mut self, tone_map: ToneMap) -> Self {
        self.tone_map = tone_map;
        self
    }

    /// Reject settings that cannot produce an image.
    pub fn validate(&self) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "image size {}x{} has no pixels",
                self.width, self.height
            )));
        }
        if self.cores == 0 {
            return Err(RenderError::InvalidConfig(
                "at least one worker thread is required".into(),
            ));
        }
        if self.rays_per_pixel == 0 {
            return Err(RenderError::InvalidConfig(
                "rays per pixel must be at least 1".into(),
            ));
        }
        if self.tile_size == Some(0) {
            return Err(RenderError::InvalidConfig(
                "tile size must be at least 1".into(),
            ));
        }
        if !self.sky_color.is_finite() {
            return Err(RenderError::InvalidConfig(format!(
                "sky colour {:?} is not finite",
                self.sky_color
            )));
        }
        Ok(())
    }
}

/// Summary of a finished render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStats {
    pub tiles: usize,
    /// Surface interactions summed over every path
    pub total_bounces: u64,
    pub elapsed: Duration,
}

/// A finished render: packed `0xAABBGGRR` pixels, row 0 at the bottom.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u32>,
    pub stats: RenderStats,
}

impl RenderedImage {
    /// Packed pixel at `(x, y)`, with `y = 0` the bottom row.
    ///
    /// Returns `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = y as usize * self.width as usize + x as usize;
        self.pixels.get(i).copied()
    }

    /// Raw RGBA8 bytes in buffer order.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&p| unpack_pixel(p)).collect()
    }

    /// Write a PNG. Pass `flip_vertical` to put row 0 at the bottom of the file.
    pub fn save_png(&self, path: impl AsRef<Path>, flip_vertical: bool) -> RenderResult<()> {
        let path = path.as_ref();
        let mut image = image::RgbaImage::from_raw(self.width, self.height, self.to_rgba8())
            .ok_or_else(|| {
                image::ImageError::Parameter(image::error::ParameterError::from_kind(
                    image::error::ParameterErrorKind::DimensionMismatch,
                ))
            })?;

        if flip_vertical {
            image::imageops::flip_vertical_in_place(&mut image);
        }

        image.save_with_format(path, image::ImageFormat::Png)?;
        log::info!("Saved {}x{} image to {:?}", self.width, self.height, path);
        Ok(())
    }
}

/// Output buffer shared by all workers.
struct PixelSink {
    width: u32,
    pixels: Vec<AtomicU32>,
}

impl PixelSink {
    fn new(width: u32, height: u32) -> RenderResult<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(RenderError::Allocation {
                what: "pixels",
                len: usize::MAX,
            })?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| RenderError::Allocation { what: "pixels", len })?;
        pixels.resize_with(len, || AtomicU32::new(0));

        Ok(Self { width, pixels })
    }

    #[inline]
    fn store(&self, x: u32, y: u32, pixel: u32) {
        let i = y as usize * self.width as usize + x as usize;
        self.pixels[i].store(pixel, Ordering::Relaxed);
    }

    fn into_pixels(self) -> Vec<u32> {
        self.pixels.into_iter().map(AtomicU32::into_inner).collect()
    }
}

/// Render `scene` with a pool of `config.cores` worker threads.
///
/// The scene camera is rebuilt for `config.width` x `config.height` if its
/// own resolution differs. Every pixel draws from its own generator keyed
/// by the seed and its position, so the output is identical for any
/// number of workers and any tile size.
pub fn render(scene: &Scene, config: &RenderConfig) -> RenderResult<RenderedImage> {
    config.validate()?;
    scene.validate()?;

    let start = Instant::now();

    let camera: Cow<'_, Camera> =
        if scene.camera.width() == config.width && scene.camera.height() == config.height {
            Cow::Borrowed(&scene.camera)
        } else {
            Cow::Owned(scene.camera.with_resolution(config.width, config.height)?)
        };

    let edge = config
        .tile_size
        .unwrap_or_else(|| tile_edge(config.width, config.cores));
    let tiles = partition(
        config.width,
        config.height,
        edge,
        SeedSource::new(config.seed),
    )?;

    let workers = config.cores.min(tiles.len());
    if workers < config.cores {
        log::warn!(
            "Only {} tiles for {} cores; starting {} workers",
            tiles.len(),
            config.cores,
            workers
        );
    }

    let queue = WorkQueue::new(tiles);
    let sink = PixelSink::new(config.width, config.height)?;

    log::info!(
        "Rendering {}x{} @ {} rpp, {} bounces: {} primitives, {} tiles of {}px, {} workers",
        config.width,
        config.height,
        config.rays_per_pixel,
        config.max_bounces,
        scene.primitive_count(),
        queue.len(),
        edge,
        workers
    );

    let (camera, queue_ref, sink_ref) = (&*camera, &queue, &sink);
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("raycast-worker-{i}"))
        .build_scoped(
            |thread| thread.run(),
            |pool| {
                pool.scope(|s| {
                    for _ in 0..workers {
                        s.spawn(move |_| {
                            render_tiles(scene, camera, config, queue_ref, sink_ref)
                        });
                    }
                })
            },
        )?;

    let stats = RenderStats {
        tiles: queue.len(),
        total_bounces: queue.total_bounces(),
        elapsed: start.elapsed(),
    };

    log::info!(
        "Render complete in {:.2}s ({} bounces)",
        stats.elapsed.as_secs_f64(),
        stats.total_bounces
    );

    Ok(RenderedImage {
        width: config.width,
        height: config.height,
        pixels: sink.into_pixels(),
        stats,
    })
}

/// Render with default sampling settings, returning just the packed pixels.
pub fn render_buffer(
    scene: &Scene,
    width: u32,
    height: u32,
    cores: usize,
) -> RenderResult<Vec<u32>> {
    let config = RenderConfig::default()
        .with_size(width, height)
        .with_cores(cores);
    Ok(render(scene, &config)?.pixels)
}

/// Worker loop: claim a tile, render every pixel in it, repeat.
fn render_tiles(
    scene: &Scene,
    camera: &Camera,
    config: &RenderConfig,
    queue: &WorkQueue,
    sink: &PixelSink,
) {
    while let Some(tile) = queue.claim() {
        let mut bounces = 0;

        for y in tile.y..tile.y + tile.height {
            for x in tile.x..tile.x + tile.width {
                let mut rng = tile.pixel_rng(x, y);
                let sample = render_pixel(scene, camera, x, y, config, &mut rng);
                sink.store(x, y, pack_pixel(sample.color, config.tone_map));
                bounces += sample.bounces;
            }
        }

        queue.finish_tile(bounces);
    }
}
