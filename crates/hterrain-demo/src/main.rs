//! Terrain LOD driver: flies a viewer across procedural terrain, keeps a
//! quadtree of chunks up to date, and dumps the final layout as a PNG.

mod canvas;
mod chunk_pool;
mod driver;
mod error;
mod height_field;

use std::path::Path;

use clap::Parser;
use hterrain_config::{CliArgs, Config, default_config_dir};
use hterrain_lod::lod_factor;
use tracing::{error, info};

use crate::canvas::DebugCanvas;
use crate::driver::Driver;
use crate::error::DemoError;

fn run(config: &Config) -> Result<(), DemoError> {
    config.validate()?;

    let mut driver = Driver::new(config);
    driver.run();

    if let Some((lo, hi)) = driver.visible_height_range() {
        info!(
            "{} visible chunks, terrain heights {lo:.1} to {hi:.1}",
            driver.tree.chunk_count()
        );
    }
    let pool = driver.pool_stats();
    info!(
        "Chunk pool: {} live, {} allocated, {} reused",
        pool.live, pool.allocated, pool.reused
    );

    if !config.debug.debug_image.is_empty() {
        let units = lod_factor(driver.tree.max_depth());
        let mut canvas = DebugCanvas::new(units, config.debug.image_scale)?;
        driver.tree.debug_draw_tree(&mut canvas);
        let path = Path::new(&config.debug.debug_image);
        canvas.save_png(path)?;
        info!(
            "Wrote {}x{} tree layout to {}",
            canvas.width,
            canvas.height,
            path.display()
        );
    }

    driver.tree.clear();
    let pool = driver.pool_stats();
    if pool.live == 0 {
        info!("Tree cleared, all {} chunk allocations returned", pool.free);
    } else {
        error!("Tree cleared but {} chunks are still live", pool.live);
    }
    Ok(())
}

fn main() {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    hterrain_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = run(&config) {
        error!("{e}");
        std::process::exit(1);
    }
}
