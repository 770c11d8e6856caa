//! File logging. The terminal belongs to the UI, so log lines only ever go to
//! the cache directory, and only when debugging is switched on.

use crate::cache::{CacheManager, LOG_FILE};
use crate::config::DebugConfig;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Default filter: our crate at `level`, dependencies at warn.
pub fn default_filter(level: &str) -> String {
    format!("{}={},warn", env!("CARGO_CRATE_NAME"), level)
}

/// Install the file subscriber when `--debug` or `[debug] enabled` asks for it.
/// Returns the log path, or `None` when logging stays off. `RUST_LOG` overrides the level.
pub fn init_file_logging(
    cache: &CacheManager,
    debug: &DebugConfig,
    cli_debug: bool,
) -> Result<Option<PathBuf>> {
    if !(cli_debug || debug.enabled) {
        return Ok(None);
    }

    let file = cache.open_log_file()?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&debug.log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| eyre!("Could not initialize logging: {}", e))?;

    let path = cache.cache_file(LOG_FILE);
    info!(version = env!("CARGO_PKG_VERSION"), "logging initialised");
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter("debug"), "carscope=debug,warn");
    }

    #[test]
    fn test_disabled_logging_writes_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let cache = CacheManager::with_dir(dir.path().join("carscope"));
        let debug = DebugConfig::default();
        assert!(init_file_logging(&cache, &debug, false).unwrap().is_none());
        assert!(!cache.cache_file(LOG_FILE).exists());
    }
}
