//! Structured logging for the terrain LOD driver.
//!
//! Console output with uptime timestamps and module paths, plus a JSON log
//! file in debug builds. The LOD library logs through the `log` facade; those
//! records reach the same subscriber through `tracing-log`.

use hterrain_config::Config;
use std::path::Path;
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        self,
        format::{Format, Json, JsonFields},
        time::Uptime,
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Filter used when neither `RUST_LOG` nor the config sets a level.
pub const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "hterrain.log";

/// Layer writing one JSON object per event to the log file.
pub type JsonFileLayer<S> = fmt::Layer<S, JsonFields, Format<Json, Uptime>, std::fs::File>;

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - Optional directory for the JSON log file (debug builds only)
/// * `debug_build` - Whether this is a debug build (enables file logging)
/// * `config` - Optional configuration supplying `debug.log_level`
///
/// `RUST_LOG` wins over the config level when set.
///
/// ```no_run
/// use hterrain_log::init_logging;
///
/// init_logging(Some(std::path::Path::new("./logs")), true, None);
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = filter_from_config(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build && let Some(file_layer) = log_dir.and_then(json_file_layer) {
        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// JSON lines layer writing to `<log_dir>/hterrain.log`.
///
/// Returns `None` when the directory or file cannot be created.
pub fn json_file_layer<S>(log_dir: &Path) -> Option<JsonFileLayer<S>>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    std::fs::create_dir_all(log_dir).ok()?;
    let log_file = std::fs::File::create(log_dir.join(LOG_FILE_NAME)).ok()?;
    Some(
        fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json(),
    )
}

/// The filter directive string `init_logging` falls back to.
pub fn filter_from_config(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.trim().to_string()
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}
