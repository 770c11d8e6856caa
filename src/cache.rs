use color_eyre::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const LOG_FILE: &str = "carscope.log";

/// Files owned by the cache directory; `clear_all` removes exactly these.
const CACHE_FILES: &[&str] = &[LOG_FILE];

/// Manages the cache directory (log file)
#[derive(Clone)]
pub struct CacheManager {
    pub(crate) cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(app_name: &str) -> Result<Self> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not determine cache directory"))?
            .join(app_name);

        Ok(Self { cache_dir })
    }

    /// Cache rooted at `cache_dir` (used by tests)
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn cache_file(&self, filename: &str) -> PathBuf {
        self.cache_dir.join(filename)
    }

    pub fn ensure_cache_dir(&self) -> Result<()> {
        if !self.cache_dir.exists() {
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }

    /// Open the log file for appending, creating the cache directory if needed.
    pub fn open_log_file(&self) -> Result<fs::File> {
        self.ensure_cache_dir()?;
        Ok(fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.cache_file(LOG_FILE))?)
    }

    pub fn clear_file(&self, filename: &str) -> Result<()> {
        let file_path = self.cache_file(filename);
        if file_path.exists() {
            fs::remove_file(&file_path)?;
        }
        Ok(())
    }

    /// Remove every registered cache file. Returns how many were removed.
    pub fn clear_all(&self) -> Result<usize> {
        let mut removed = 0;
        for filename in CACHE_FILES {
            let file_path = self.cache_file(filename);
            if !file_path.exists() {
                continue;
            }
            match fs::remove_file(&file_path) {
                Ok(()) => removed += 1,
                Err(e) => warn!(file = filename, error = %e, "could not remove cache file"),
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_clear_all_removes_log_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let cache = CacheManager::with_dir(dir.path().join("carscope"));
        let mut log = cache.open_log_file().unwrap();
        writeln!(log, "hello").unwrap();
        drop(log);
        assert!(cache.cache_file(LOG_FILE).exists());

        assert_eq!(cache.clear_all().unwrap(), 1);
        assert!(!cache.cache_file(LOG_FILE).exists());
        assert_eq!(cache.clear_all().unwrap(), 0);
    }

    #[test]
    fn test_clear_file_missing_is_ok() {
        let dir = tempfile::TempDir::new().unwrap();
        let cache = CacheManager::with_dir(dir.path().to_path_buf());
        assert!(cache.clear_file("nope.txt").is_ok());
    }
}
