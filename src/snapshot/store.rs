//! Filesystem snapshot store
//!
//! One JSON document per collection. Saves go through a temp file in the
//! same directory followed by a rename, so readers never lock and only ever
//! see the previous or the new document.

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use super::Snapshot;
use crate::cache::key::sanitize_key;
use crate::error::Result;

/// Directory-backed snapshot store
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[cfg(test)]
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    /// Location of a collection's document
    pub fn path_for(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(collection)))
    }

    /// Atomically replace a collection's snapshot.
    pub fn save(&self, collection: &str, snapshot: &Snapshot) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(collection);

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut tmp, snapshot)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;

        log::debug!(
            "Saved snapshot '{}' ({} items) to {}",
            collection,
            snapshot.count,
            path.display()
        );
        Ok(())
    }

    /// Load a collection's snapshot.
    ///
    /// A missing, unreadable or malformed document yields an empty snapshot:
    /// that is the normal "never crawled" state, not an error.
    pub fn load(&self, collection: &str) -> Snapshot {
        let path = self.path_for(collection);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Snapshot {} unreadable: {}", path.display(), e);
                }
                return Snapshot::empty();
            }
        };

        match serde_json::from_slice::<Snapshot>(&bytes) {
            Ok(mut snapshot) => {
                snapshot.count = snapshot.items.len();
                snapshot
            }
            Err(e) => {
                log::warn!("Snapshot {} malformed, treating as empty: {}", path.display(), e);
                Snapshot::empty()
            }
        }
    }
}
