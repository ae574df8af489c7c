use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::Config;

/// Stdout logging filtered by `RUST_LOG` (or the configured level), plus an
/// append-only file receiving warnings and errors when `error_log` is set.
pub fn init(config: &Config) -> std::io::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let error_layer = match &config.error_log {
        Some(path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(open_error_log(path)?))
                .with_filter(LevelFilter::WARN),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(env_filter))
        .with(error_layer)
        .init();

    Ok(())
}

fn open_error_log(path: &Path) -> std::io::Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
