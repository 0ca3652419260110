//! File-per-key TTL cache storage
//!
//! Each entry lives in `<dir>/<sanitized key>.json` as
//! `{"expires_at": <unix secs>, "value": <payload>}`. Writes go through a temp
//! file and rename; there is no locking, concurrent writers of one key resolve
//! as last writer wins.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::NamedTempFile;

use super::key::sanitize_key;
use crate::clock::SharedClock;

/// On-disk cache entry
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    expires_at: i64,
    value: T,
}

/// Directory-backed TTL cache
#[derive(Clone)]
pub struct CacheStorage {
    dir: PathBuf,
    clock: SharedClock,
}

impl CacheStorage {
    /// Cache rooted at `dir`; the directory is created on first write.
    pub fn open_at(dir: impl Into<PathBuf>, clock: SharedClock) -> Self {
        Self {
            dir: dir.into(),
            clock,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }

    /// Get a cached value.
    ///
    /// Absent when there is no entry, the entry is expired (the file is then
    /// removed) or the payload does not decode as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path_for(key);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    log::warn!("Cache entry {} unreadable: {}", path.display(), e);
                }
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Cache entry {} invalid: {}", path.display(), e);
                return None;
            }
        };

        if self.clock.now() >= entry.expires_at {
            log::debug!("Cache entry '{}' expired", key);
            if let Err(e) = std::fs::remove_file(&path) {
                log::debug!("Failed to remove expired entry {}: {}", path.display(), e);
            }
            return None;
        }

        Some(entry.value)
    }

    /// Store a value with TTL, overwriting any existing entry.
    pub fn put<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let entry = CacheEntry {
            expires_at: self.clock.now().saturating_add(ttl_secs),
            value,
        };

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer(&mut tmp, &entry)?;
        tmp.flush()?;
        tmp.persist(self.path_for(key)).map_err(|e| e.error)?;
        Ok(())
    }

    /// Remove every entry file
    pub fn clear_all(&self) -> io::Result<ClearStats> {
        let mut entries_removed = 0;
        for path in self.entry_files()? {
            match std::fs::remove_file(&path) {
                Ok(()) => entries_removed += 1,
                Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
        Ok(ClearStats { entries_removed })
    }

    /// Count entries and their on-disk size
    pub fn stats(&self) -> io::Result<CacheStats> {
        let mut stats = CacheStats::default();
        let now = self.clock.now();

        for path in self.entry_files()? {
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            stats.total_size_bytes += bytes.len();
            match serde_json::from_slice::<CacheEntry<serde::de::IgnoredAny>>(&bytes) {
                Ok(entry) if entry.expires_at > now => stats.valid_entries += 1,
                _ => stats.expired_entries += 1,
            }
        }
        Ok(stats)
    }

    fn entry_files(&self) -> io::Result<Vec<PathBuf>> {
        let read_dir = match std::fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut files = Vec::new();
        for entry in read_dir {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        Ok(files)
    }
}

/// Statistics from clearing the cache
#[derive(Debug)]
pub struct ClearStats {
    pub entries_removed: usize,
}

/// Cache statistics
#[derive(Debug, Default, Serialize)]
pub struct CacheStats {
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub total_size_bytes: usize,
}
