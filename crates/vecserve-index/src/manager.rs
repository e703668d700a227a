//! Current-snapshot ownership and atomic hot reload.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use tracing::{info, warn};

use vecserve_embeddings::Embedding;

use crate::error::IndexError;
use crate::snapshot::{IndexSnapshot, RankedRecord};

/// Owns the live [`IndexSnapshot`] and swaps in replacements loaded from
/// the configured paths.
///
/// The snapshot handle is the only mutable shared state in the service.
/// Readers take one atomic handle read per query and never lock; reloads
/// serialize against each other and replace the handle wholesale.
pub struct IndexManager {
    current: ArcSwap<IndexSnapshot>,
    index_path: PathBuf,
    metadata_path: PathBuf,
    dimension: usize,
    reload_lock: Mutex<()>,
}

impl IndexManager {
    /// Load the first snapshot. A failure here is fatal to startup: the
    /// service never reaches Ready without a complete snapshot.
    pub fn open(
        index_path: impl Into<PathBuf>,
        metadata_path: impl Into<PathBuf>,
        dimension: usize,
    ) -> Result<Self, IndexError> {
        let index_path = index_path.into();
        let metadata_path = metadata_path.into();

        let snapshot = IndexSnapshot::load(&index_path, &metadata_path, dimension)?;
        info!(
            index_path = ?index_path,
            metadata_count = snapshot.metadata_count(),
            "Index manager ready"
        );

        Ok(Self {
            current: ArcSwap::from_pointee(snapshot),
            index_path,
            metadata_path,
            dimension,
            reload_lock: Mutex::new(()),
        })
    }

    /// Search the current snapshot.
    ///
    /// The handle is read exactly once; the whole query runs against that
    /// snapshot even if a reload swaps in a new one mid-flight, so a
    /// result row can never mix one snapshot's index with another's
    /// metadata.
    pub fn search(&self, query: &Embedding, k: usize) -> Result<Vec<RankedRecord>, IndexError> {
        let snapshot = self.current.load_full();
        snapshot.search(query, k)
    }

    /// Load a fresh snapshot from the configured paths and swap it in.
    ///
    /// Returns the new metadata count. On any load failure the current
    /// snapshot keeps serving untouched; reload is never partially
    /// applied. Concurrent reload calls serialize on an internal lock.
    pub fn reload(&self) -> Result<usize, IndexError> {
        let _guard = self.reload_lock.lock().unwrap();

        let snapshot =
            match IndexSnapshot::load(&self.index_path, &self.metadata_path, self.dimension) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(error = %e, "Reload failed, keeping current snapshot");
                    return Err(e);
                }
            };

        let count = snapshot.metadata_count();
        self.current.store(Arc::new(snapshot));
        info!(metadata_count = count, "Swapped in reloaded snapshot");
        Ok(count)
    }

    /// Metadata record count of the current snapshot.
    pub fn metadata_count(&self) -> usize {
        self.current.load().metadata_count()
    }

    /// Configured index file path.
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Borrow the current snapshot (one atomic handle read).
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.current.load_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{build_index_file, write_metadata_file};
    use tempfile::TempDir;

    const DIM: usize = 8;

    fn origin() -> Embedding {
        Embedding::new(vec![0.0; DIM])
    }

    fn manager_with_fixture(count: usize) -> (TempDir, IndexManager) {
        let temp = TempDir::new().unwrap();
        let index_path = temp.path().join("index.usearch");
        let metadata_path = temp.path().join("metadata.json");
        build_index_file(&index_path, DIM, count);
        write_metadata_file(&metadata_path, count);
        let manager = IndexManager::open(&index_path, &metadata_path, DIM).unwrap();
        (temp, manager)
    }

    #[test]
    fn test_open_fails_on_missing_files() {
        let temp = TempDir::new().unwrap();
        let result = IndexManager::open(
            temp.path().join("index.usearch"),
            temp.path().join("metadata.json"),
            DIM,
        );
        assert!(matches!(result, Err(IndexError::NotFound(_))));
    }

    #[test]
    fn test_search_returns_k_slots() {
        let (_temp, manager) = manager_with_fixture(5);
        let results = manager.search(&origin(), 3).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|(record, _)| record.is_some()));
    }

    #[test]
    fn test_reload_picks_up_new_metadata() {
        let (temp, manager) = manager_with_fixture(5);
        assert_eq!(manager.metadata_count(), 5);

        // Rebuild both files with more entries, then reload.
        build_index_file(&temp.path().join("index.usearch"), DIM, 8);
        write_metadata_file(&temp.path().join("metadata.json"), 8);

        let count = manager.reload().unwrap();
        assert_eq!(count, 8);
        assert_eq!(manager.metadata_count(), 8);

        let results = manager.search(&origin(), 8).unwrap();
        assert_eq!(results.iter().filter(|(r, _)| r.is_some()).count(), 8);
    }

    #[test]
    fn test_failed_reload_keeps_current_snapshot() {
        let (temp, manager) = manager_with_fixture(5);

        std::fs::remove_file(temp.path().join("metadata.json")).unwrap();

        let result = manager.reload();
        assert!(matches!(result, Err(IndexError::NotFound(_))));

        // The pre-reload snapshot is fully intact.
        assert_eq!(manager.metadata_count(), 5);
        let results = manager.search(&origin(), 5).unwrap();
        assert_eq!(results.iter().filter(|(r, _)| r.is_some()).count(), 5);
    }

    #[test]
    fn test_corrupt_metadata_reload_keeps_current_snapshot() {
        let (temp, manager) = manager_with_fixture(3);

        std::fs::write(temp.path().join("metadata.json"), "{\"metadatos\": 7}").unwrap();

        assert!(matches!(manager.reload(), Err(IndexError::Schema(_))));
        assert_eq!(manager.metadata_count(), 3);
    }

    #[test]
    fn test_inflight_snapshot_survives_reload() {
        let (temp, manager) = manager_with_fixture(5);

        // A reader holding the old snapshot keeps a complete, consistent
        // view even after the manager swaps in a replacement.
        let held = manager.snapshot();

        build_index_file(&temp.path().join("index.usearch"), DIM, 2);
        write_metadata_file(&temp.path().join("metadata.json"), 2);
        manager.reload().unwrap();

        assert_eq!(held.metadata_count(), 5);
        let results = held.search(&origin(), 5).unwrap();
        assert_eq!(results.iter().filter(|(r, _)| r.is_some()).count(), 5);

        assert_eq!(manager.metadata_count(), 2);
    }
}
