//! Command-line argument parsing for the LOD driver.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Terrain LOD driver command-line arguments.
///
/// CLI values override settings loaded from `hterrain.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "hterrain", about = "Quadtree terrain LOD driver")]
pub struct CliArgs {
    /// World size of a LOD 0 chunk.
    #[arg(long)]
    pub base_size: Option<u32>,

    /// World size of the whole terrain.
    #[arg(long)]
    pub full_size: Option<u32>,

    /// Split distance multiplier (2.0 to 5.0).
    #[arg(long)]
    pub split_scale: Option<f32>,

    /// Number of viewer updates to run.
    #[arg(long)]
    pub ticks: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Output path for the tree layout PNG.
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(base) = args.base_size {
            self.lod.base_size = base;
        }
        if let Some(full) = args.full_size {
            self.lod.full_size = full;
        }
        if let Some(scale) = args.split_scale {
            self.lod.split_scale = scale;
        }
        if let Some(ticks) = args.ticks {
            self.viewer.ticks = ticks;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(ref image) = args.image {
            self.debug.debug_image = image.display().to_string();
        }
    }
}
