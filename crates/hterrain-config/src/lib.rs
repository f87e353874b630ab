//! Settings for the terrain LOD driver.
//!
//! Persisted as RON in `hterrain.ron`. Command-line flags parsed with clap
//! override whatever was loaded from disk.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE_NAME, Config, DebugConfig, LodSettings, MAX_DEBUG_IMAGE_SIDE, TerrainSettings,
    ViewerSettings, default_config_dir,
};
pub use error::ConfigError;
