//! Errors surfaced by the driver binary.

use hterrain_config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to write debug image: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode debug image: {0}")]
    Png(#[from] png::EncodingError),

    #[error("debug image of {units} chunks at {scale} px each is too large")]
    CanvasTooLarge { units: u32, scale: u32 },
}
