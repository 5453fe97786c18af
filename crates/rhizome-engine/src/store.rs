use std::path::{Path, PathBuf};

use log::warn;

use rhizome_core::cache::epoch_millis;
use rhizome_core::{CacheSnapshot, CorpusEntry, IndexError, SiteConfig};

/// On-disk home of the cache snapshot.
///
/// All operations are best-effort from the caller's point of view: a
/// corrupt snapshot reads as absent (after a warning) and a failed save
/// never fails a query.
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(config.cache.path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no snapshot exists; `Err(CacheCorrupt)` when one
    /// exists but cannot be used.
    pub fn load(&self) -> Result<Option<CacheSnapshot>, IndexError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(IndexError::CacheCorrupt {
                    path: self.path.clone(),
                    reason: err.to_string(),
                })
            }
        };

        match CacheSnapshot::from_json(&text) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(err) => Err(IndexError::CacheCorrupt {
                path: self.path.clone(),
                reason: err.to_string(),
            }),
        }
    }

    pub fn save(&self, snapshot: &CacheSnapshot) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = snapshot
            .to_json()
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        std::fs::write(&self.path, json)
    }

    /// A snapshot is stale as soon as any corpus file is newer than its
    /// build timestamp.
    pub fn is_stale(&self, snapshot: &CacheSnapshot, entries: &[CorpusEntry]) -> bool {
        entries
            .iter()
            .any(|entry| epoch_millis(entry.modified_at) > snapshot.built_at)
    }

    /// Remove the snapshot from disk, if present.
    pub fn clear(&self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to remove cache snapshot {:?}: {}", self.path, err);
            }
        }
    }
}
