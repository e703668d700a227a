//! Shared fixtures for index tests.

use std::path::Path;

use serde_json::json;
use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

/// Build a small L2 index at `path`: vector `i` is `[i, 0, 0, ...]`, so a
/// query at the origin ranks positions 0, 1, 2, ... nearest-first.
pub(crate) fn build_index_file(path: &Path, dim: usize, count: usize) {
    let options = IndexOptions {
        dimensions: dim,
        metric: MetricKind::L2sq,
        quantization: ScalarKind::F32,
        connectivity: 0,
        expansion_add: 0,
        expansion_search: 0,
        multi: false,
    };
    let index = Index::new(&options).unwrap();
    index.reserve(count.max(1)).unwrap();
    for i in 0..count {
        let mut values = vec![0.0f32; dim];
        values[0] = i as f32;
        index.add(i as u64, &values).unwrap();
    }
    index.save(path.to_str().unwrap()).unwrap();
}

/// Write a bare-array metadata file with `count` records.
pub(crate) fn write_metadata_file(path: &Path, count: usize) {
    let records: Vec<_> = (0..count)
        .map(|i| json!({"chunk": format!("chunk-{}", i), "source": "test.md"}))
        .collect();
    std::fs::write(path, serde_json::to_string(&records).unwrap()).unwrap();
}
