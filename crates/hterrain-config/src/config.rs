//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use hterrain_lod::{MAX_LOD, compute_lod_count, lod_factor};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name used inside the config directory.
pub const CONFIG_FILE_NAME: &str = "hterrain.ron";

/// Largest debug image edge, in pixels.
pub const MAX_DEBUG_IMAGE_SIDE: u32 = 8192;

/// `<platform config dir>/hterrain`, or `./hterrain` when the platform has none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hterrain")
}

/// Top-level driver configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Quadtree sizing and split behaviour.
    pub lod: LodSettings,
    /// Scripted viewer path.
    pub viewer: ViewerSettings,
    /// Procedural height field used for vertical bounds.
    pub terrain: TerrainSettings,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Quadtree sizing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodSettings {
    /// World size of a LOD 0 chunk.
    pub base_size: u32,
    /// World size of the whole terrain.
    pub full_size: u32,
    /// Split distance multiplier, clamped by the tree to `[2.0, 5.0]`.
    pub split_scale: f32,
}

/// The viewer moves in a straight line from `start` to `end`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerSettings {
    /// World position at the first tick.
    pub start: [f32; 3],
    /// World position at the last tick.
    pub end: [f32; 3],
    /// Number of updates to run.
    pub ticks: u32,
    /// Height above the terrain surface, added on top of `start`/`end` Y.
    pub height: f32,
}

/// Noise parameters for the height field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainSettings {
    pub seed: u32,
    /// Peak height in world units.
    pub amplitude: f32,
    /// Frequency of the first octave, in cycles per world unit.
    pub base_frequency: f64,
    pub octaves: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Where to write the tree layout PNG. Empty disables it.
    pub debug_image: String,
    /// Pixels per LOD 0 chunk in the debug image.
    pub image_scale: u32,
}

// --- Default implementations ---

impl Default for LodSettings {
    fn default() -> Self {
        Self {
            base_size: 16,
            full_size: 1024,
            split_scale: 2.0,
        }
    }
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            start: [0.0, 0.0, 0.0],
            end: [1024.0, 0.0, 1024.0],
            ticks: 64,
            height: 2.0,
        }
    }
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            amplitude: 120.0,
            base_frequency: 1.0 / 512.0,
            octaves: 5,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_image: "lod_tree.png".to_string(),
            image_scale: 4,
        }
    }
}

// --- Load / Save / Validate ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `hterrain.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Reject settings the driver cannot run with.
    ///
    /// A split scale outside `[2.0, 5.0]` is accepted here; the tree clamps it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lod.base_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "lod.base_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.lod.full_size < self.lod.base_size {
            log::warn!(
                "lod.full_size {} is smaller than lod.base_size {}, tree will have a single level",
                self.lod.full_size,
                self.lod.base_size
            );
        }
        if !self.lod.split_scale.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "lod.split_scale",
                reason: format!("{} is not a finite number", self.lod.split_scale),
            });
        }
        if self.debug.image_scale == 0 {
            return Err(ConfigError::InvalidValue {
                field: "debug.image_scale",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.debug.debug_image.is_empty() {
            let side = self.debug_image_side();
            if side > u64::from(MAX_DEBUG_IMAGE_SIDE) {
                return Err(ConfigError::InvalidValue {
                    field: "debug.image_scale",
                    reason: format!(
                        "debug image would be {side} pixels wide, limit is {MAX_DEBUG_IMAGE_SIDE}"
                    ),
                });
            }
        }
        Ok(())
    }

    /// Edge length in pixels of the tree layout image for these sizes.
    pub fn debug_image_side(&self) -> u64 {
        let depth = compute_lod_count(self.lod.base_size, self.lod.full_size).min(MAX_LOD);
        u64::from(lod_factor(depth)) * u64::from(self.debug.image_scale)
    }
}
