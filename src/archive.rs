//! Archived video ids, hidden from the attribution report.
//!
//! The set is loaded from and persisted to an explicit [`ArchiveStore`] that
//! callers pass in.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// An ordered set of archived video ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchivedVideos(BTreeSet<String>);

impl ArchivedVideos {
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// A new set with `id` added if absent, or removed if present.
    #[must_use]
    pub fn toggle(&self, id: &str) -> Self {
        let mut next = self.0.clone();
        if !next.remove(id) {
            next.insert(id.to_string());
        }
        Self(next)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ArchivedVideos {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Persistence for the archived set.
pub trait ArchiveStore {
    fn load(&self) -> Result<ArchivedVideos>;
    fn persist(&self, archived: &ArchivedVideos) -> Result<()>;
}

/// Toggle `id` in `store`, returning the new set and whether `id` is now archived.
pub fn toggle_in(store: &dyn ArchiveStore, id: &str) -> Result<(ArchivedVideos, bool)> {
    let id = id.trim();
    if id.is_empty() {
        return Err(Error::other("video id must not be empty"));
    }
    let next = store.load()?.toggle(id);
    store.persist(&next)?;
    let archived = next.contains(id);
    debug!(id, archived, "toggled archived video");
    Ok((next, archived))
}

/// JSON array of ids in a file; a missing file is an empty set.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArchiveStore for JsonFileStore {
    fn load(&self) -> Result<ArchivedVideos> {
        if !self.path.exists() {
            return Ok(ArchivedVideos::default());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn persist(&self, archived: &ArchivedVideos) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(archived)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<ArchivedVideos>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(initial: ArchivedVideos) -> Self {
        Self {
            inner: Mutex::new(initial),
        }
    }
}

impl ArchiveStore for MemoryStore {
    fn load(&self) -> Result<ArchivedVideos> {
        self.inner
            .lock()
            .map(|set| set.clone())
            .map_err(|e| Error::other(e.to_string()))
    }

    fn persist(&self, archived: &ArchivedVideos) -> Result<()> {
        let mut set = self.inner.lock().map_err(|e| Error::other(e.to_string()))?;
        *set = archived.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_returns_new_set() {
        let empty = ArchivedVideos::default();
        let one = empty.toggle("abc");
        assert!(empty.is_empty());
        assert!(one.contains("abc"));
        assert!(one.toggle("abc").is_empty());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("archived_videos.json"));

        assert!(store.load().unwrap().is_empty());

        let set: ArchivedVideos = ["b", "a"].into_iter().collect();
        store.persist(&set).unwrap();
        assert_eq!(store.load().unwrap(), set);

        let json = std::fs::read_to_string(store.path()).unwrap();
        let ids: Vec<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archived_videos.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(JsonFileStore::new(path).load(), Err(Error::Json(_))));
    }

    #[test]
    fn test_toggle_in_persists() {
        let store = MemoryStore::default();
        let (set, archived) = toggle_in(&store, " vid ").unwrap();
        assert!(archived);
        assert!(set.contains("vid"));
        assert_eq!(store.load().unwrap(), set);

        let (set, archived) = toggle_in(&store, "vid").unwrap();
        assert!(!archived);
        assert!(set.is_empty());

        assert!(toggle_in(&store, "  ").is_err());
    }
}
