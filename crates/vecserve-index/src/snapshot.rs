//! Immutable index + metadata snapshot.

use std::path::Path;

use serde_json::Value;
use tracing::warn;

use vecserve_embeddings::Embedding;

use crate::ann::AnnIndex;
use crate::error::IndexError;
use crate::store::MetadataStore;

/// One result slot: the record at the neighbor's position (`None` for
/// sentinel or out-of-range positions) and its distance.
pub type RankedRecord = (Option<Value>, f32);

/// Immutable pairing of one ANN index with one metadata store.
///
/// Index position `i` corresponds to metadata record `i`. Snapshots are
/// never mutated; a reload builds a whole new snapshot and swaps it in.
pub struct IndexSnapshot {
    index: AnnIndex,
    metadata: MetadataStore,
}

impl IndexSnapshot {
    /// Load both halves of a snapshot from disk.
    pub fn load(
        index_path: impl AsRef<Path>,
        metadata_path: impl AsRef<Path>,
        dimension: usize,
    ) -> Result<Self, IndexError> {
        let index = AnnIndex::load(index_path, dimension)?;
        let metadata = MetadataStore::load(metadata_path)?;

        if metadata.len() < index.len() {
            // Positions past the metadata end degrade to null slots.
            warn!(
                index_vectors = index.len(),
                metadata_records = metadata.len(),
                "Metadata is shorter than the index"
            );
        }

        Ok(Self { index, metadata })
    }

    /// Search this snapshot and map each neighbor position through its
    /// own metadata store.
    pub fn search(&self, query: &Embedding, k: usize) -> Result<Vec<RankedRecord>, IndexError> {
        let neighbors = self.index.search(query, k)?;

        Ok(neighbors
            .positions
            .iter()
            .zip(neighbors.distances)
            .map(|(&position, distance)| (self.metadata.get(position).cloned(), distance))
            .collect())
    }

    /// The ANN index half.
    pub fn index(&self) -> &AnnIndex {
        &self.index
    }

    /// Number of metadata records.
    pub fn metadata_count(&self) -> usize {
        self.metadata.len()
    }
}
