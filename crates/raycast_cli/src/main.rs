//! `raycast`: render a scene to a PNG file.

mod scenes;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use raycast_core::Scene;
use raycast_renderer::{render, RenderConfig, ToneMap};

#[derive(Parser, Debug)]
#[command(version, about = "Tile-parallel CPU path tracer")]
struct Args {
    /// Image width in pixels
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 360)]
    height: u32,

    /// Worker threads (defaults to the number of available cores)
    #[arg(long)]
    cores: Option<usize>,

    /// Rays per pixel
    #[arg(long, default_value_t = 128)]
    rpp: u32,

    /// Maximum bounces per path
    #[arg(long, default_value_t = 8)]
    bounces: u32,

    /// Render seed (also seeds the random scene)
    #[arg(long, default_value_t = 0x2545_F491)]
    seed: u32,

    /// Tile edge in pixels; fixing it makes output independent of --cores
    #[arg(long)]
    tile_size: Option<u32>,

    /// Use the exact sRGB curve instead of gamma 2
    #[arg(long)]
    srgb: bool,

    /// `random`, `preview`, or the path of a JSON scene file
    #[arg(long, default_value = "random")]
    scene: String,

    /// Output PNG path
    #[arg(short, long, default_value = "out.png")]
    output: PathBuf,
}

impl Args {
    fn render_config(&self) -> RenderConfig {
        let mut config = RenderConfig::default()
            .with_size(self.width, self.height)
            .with_rays_per_pixel(self.rpp)
            .with_max_bounces(self.bounces)
            .with_seed(self.seed);

        if let Some(cores) = self.cores {
            config = config.with_cores(cores);
        }
        if let Some(tile_size) = self.tile_size {
            config = config.with_tile_size(tile_size);
        }
        if self.srgb {
            config = config.with_tone_map(ToneMap::Srgb);
        }
        config
    }

    fn load_scene(&self) -> Result<Scene> {
        let scene = match self.scene.as_str() {
            "random" => scenes::random_grid(self.seed as u64, self.width, self.height)?,
            "preview" => scenes::preview(self.width, self.height)?,
            path => Scene::load_json(path)
                .with_context(|| format!("Failed to load scene file {path}"))?,
        };
        Ok(scene)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    let config = args.render_config();
    let scene = args.load_scene()?;

    log::info!(
        "Scene '{}': {} spheres, {} planes, {} materials",
        args.scene,
        scene.spheres.len(),
        scene.planes.len(),
        scene.materials.len()
    );

    let image = render(&scene, &config).context("Render failed")?;
    image
        .save_png(&args.output, true)
        .with_context(|| format!("Failed to write {:?}", args.output))?;

    println!(
        "Wrote {} ({}x{}, {} tiles, {:.2}s)",
        args.output.display(),
        image.width,
        image.height,
        image.stats.tiles,
        image.stats.elapsed.as_secs_f64()
    );

    Ok(())
}
