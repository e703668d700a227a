//! Read-only usearch index wrapper.
//!
//! The index file is produced by an external build step; this wrapper
//! loads it wholesale and answers k-NN queries. There is no insert,
//! delete, or save surface here.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

use vecserve_embeddings::Embedding;

use crate::error::IndexError;

/// Sentinel position for a result slot with no real neighbor.
pub const NO_NEIGHBOR: i64 = -1;

/// Distance reported for sentinel slots. Keeps result rows non-decreasing
/// and JSON-serializable (infinity is not valid JSON).
pub const NO_NEIGHBOR_DISTANCE: f32 = f32::MAX;

/// One query's neighbors: exactly `k` slots, nearest first.
///
/// Slots past the last real neighbor hold [`NO_NEIGHBOR`] and
/// [`NO_NEIGHBOR_DISTANCE`].
#[derive(Debug, Clone)]
pub struct Neighbors {
    pub distances: Vec<f32>,
    pub positions: Vec<i64>,
}

/// Read-only ANN index over fixed-dimension f32 vectors.
///
/// The distance metric is whatever the index was built with; values are
/// reported exactly as usearch returns them, never recomputed or
/// re-ranked here.
pub struct AnnIndex {
    index: Index,
    dimension: usize,
    path: PathBuf,
}

impl AnnIndex {
    /// Load an index file built for `dimension`-wide vectors.
    ///
    /// Fails if the file is missing or corrupt, or if the file was built
    /// with a different dimension than configured.
    pub fn load(path: impl AsRef<Path>, dimension: usize) -> Result<Self, IndexError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(IndexError::NotFound(path.to_path_buf()));
        }

        // Zeroed tuning fields mean "library default"; load() restores the
        // build-time parameters from the file itself.
        let options = IndexOptions {
            dimensions: dimension,
            metric: MetricKind::L2sq,
            quantization: ScalarKind::F32,
            connectivity: 0,
            expansion_add: 0,
            expansion_search: 0,
            multi: false,
        };

        let index = Index::new(&options).map_err(|e| IndexError::Index(e.to_string()))?;
        index
            .load(
                path.to_str()
                    .ok_or_else(|| IndexError::Index("Invalid path encoding".to_string()))?,
            )
            .map_err(|e| IndexError::Index(format!("Failed to load: {}", e)))?;

        let loaded_dim = index.dimensions();
        if loaded_dim != dimension {
            return Err(IndexError::DimensionMismatch {
                expected: dimension,
                actual: loaded_dim,
            });
        }

        info!(path = ?path, vectors = index.size(), dim = dimension, "Loaded vector index");

        Ok(Self {
            index,
            dimension,
            path: path.to_path_buf(),
        })
    }

    /// Number of vectors in the index.
    pub fn len(&self) -> usize {
        self.index.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The dimension every query vector must have.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The file this index was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Find the `k` nearest neighbors of `query`.
    ///
    /// Always returns exactly `k` slots. When the index holds fewer than
    /// `k` vectors the tail is padded with the no-neighbor sentinel.
    pub fn search(&self, query: &Embedding, k: usize) -> Result<Neighbors, IndexError> {
        if query.dimension() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.dimension(),
            });
        }

        let matches = self
            .index
            .search(&query.values, k)
            .map_err(|e| IndexError::Index(e.to_string()))?;

        let found = matches.keys.len();
        let mut positions: Vec<i64> = matches.keys.iter().map(|&key| key as i64).collect();
        let mut distances = matches.distances;
        positions.resize(k, NO_NEIGHBOR);
        distances.resize(k, NO_NEIGHBOR_DISTANCE);

        debug!(k = k, found = found, "Search complete");

        Ok(Neighbors {
            distances,
            positions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::build_index_file;
    use tempfile::TempDir;

    fn origin(dim: usize) -> Embedding {
        Embedding::new(vec![0.0; dim])
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = AnnIndex::load(temp.path().join("missing.usearch"), 8);
        assert!(matches!(result, Err(IndexError::NotFound(_))));
    }

    #[test]
    fn test_load_and_len() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("index.usearch");
        build_index_file(&file, 8, 5);

        let index = AnnIndex::load(&file, 8).unwrap();
        assert_eq!(index.len(), 5);
        assert_eq!(index.dimension(), 8);
    }

    #[test]
    fn test_load_rejects_dimension_mismatch() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("index.usearch");
        build_index_file(&file, 8, 3);

        let result = AnnIndex::load(&file, 16);
        assert!(matches!(
            result,
            Err(IndexError::DimensionMismatch {
                expected: 16,
                actual: 8
            })
        ));
    }

    #[test]
    fn test_search_returns_exactly_k_slots() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("index.usearch");
        build_index_file(&file, 8, 5);
        let index = AnnIndex::load(&file, 8).unwrap();

        let neighbors = index.search(&origin(8), 3).unwrap();
        assert_eq!(neighbors.positions.len(), 3);
        assert_eq!(neighbors.distances.len(), 3);
        assert!(neighbors.positions.iter().all(|&p| p != NO_NEIGHBOR));
    }

    #[test]
    fn test_search_pads_with_sentinel() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("index.usearch");
        build_index_file(&file, 8, 2);
        let index = AnnIndex::load(&file, 8).unwrap();

        let neighbors = index.search(&origin(8), 5).unwrap();
        assert_eq!(neighbors.positions.len(), 5);
        assert_eq!(&neighbors.positions[2..], &[NO_NEIGHBOR; 3]);
        assert_eq!(&neighbors.distances[2..], &[NO_NEIGHBOR_DISTANCE; 3]);
    }

    #[test]
    fn test_search_distances_ascending() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("index.usearch");
        build_index_file(&file, 8, 10);
        let index = AnnIndex::load(&file, 8).unwrap();

        let neighbors = index.search(&origin(8), 10).unwrap();
        for pair in neighbors.distances.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        // Nearest to the origin is vector 0.
        assert_eq!(neighbors.positions[0], 0);
    }

    #[test]
    fn test_search_rejects_query_dimension_mismatch() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("index.usearch");
        build_index_file(&file, 8, 3);
        let index = AnnIndex::load(&file, 8).unwrap();

        let result = index.search(&origin(4), 3);
        assert!(matches!(
            result,
            Err(IndexError::DimensionMismatch {
                expected: 8,
                actual: 4
            })
        ));
    }
}
