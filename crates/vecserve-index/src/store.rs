//! Positionally indexed metadata store.
//!
//! Records are opaque JSON values loaded verbatim from a persisted
//! document. Two shapes are accepted: a bare array of records, or an
//! object wrapping the array under a `metadatos` key (the envelope some
//! index-build tools write). Any other shape is a schema error, never a
//! silent coercion.

use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::error::IndexError;

/// Envelope key some build tools wrap the record array in.
const ENVELOPE_KEY: &str = "metadatos";

/// Ordered sequence of metadata records, addressable by position.
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
    records: Vec<Value>,
}

impl MetadataStore {
    /// Load and normalize a metadata document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(IndexError::NotFound(path.to_path_buf()));
        }

        let raw = std::fs::read_to_string(path)?;
        let document: Value = serde_json::from_str(&raw)?;
        let store = Self::from_document(document)?;

        info!(path = ?path, records = store.len(), "Loaded metadata");
        Ok(store)
    }

    /// Normalize a parsed document into a flat record sequence.
    pub fn from_document(document: Value) -> Result<Self, IndexError> {
        let records = match document {
            Value::Array(records) => records,
            Value::Object(mut map) => match map.remove(ENVELOPE_KEY) {
                Some(Value::Array(records)) => records,
                Some(_) => {
                    return Err(IndexError::Schema(format!(
                        "`{}` field must be an array",
                        ENVELOPE_KEY
                    )))
                }
                None => {
                    return Err(IndexError::Schema(format!(
                        "object document has no `{}` array",
                        ENVELOPE_KEY
                    )))
                }
            },
            other => {
                return Err(IndexError::Schema(format!(
                    "expected an array or an enveloped object, got {}",
                    json_type_name(&other)
                )))
            }
        };

        Ok(Self { records })
    }

    /// Record at `position`, or `None` outside `[0, len)`.
    ///
    /// Out-of-range positions are an expected degenerate case: the ANN
    /// index pads short result rows with a negative sentinel.
    pub fn get(&self, position: i64) -> Option<&Value> {
        usize::try_from(position)
            .ok()
            .and_then(|i| self.records.get(i))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = MetadataStore::load(temp.path().join("missing.json"));
        assert!(matches!(result, Err(IndexError::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("metadata.json");
        std::fs::write(&path, "not json {").unwrap();
        let result = MetadataStore::load(&path);
        assert!(matches!(result, Err(IndexError::Parse(_))));
    }

    #[test]
    fn test_bare_array_shape() {
        let store =
            MetadataStore::from_document(json!([{"chunk": "a"}, {"chunk": "b"}])).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0).unwrap()["chunk"], "a");
    }

    #[test]
    fn test_envelope_shape() {
        let store = MetadataStore::from_document(
            json!({"metadatos": [{"chunk": "a"}], "hashes": ["x"]}),
        )
        .unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0).unwrap()["chunk"], "a");
    }

    #[test]
    fn test_both_shapes_load_identically() {
        let records = json!([{"chunk": "a", "idx": 0}, {"chunk": "b", "idx": 1}]);
        let bare = MetadataStore::from_document(records.clone()).unwrap();
        let enveloped =
            MetadataStore::from_document(json!({ "metadatos": records.clone() })).unwrap();

        assert_eq!(bare.len(), enveloped.len());
        for i in 0..bare.len() as i64 {
            assert_eq!(bare.get(i), enveloped.get(i));
        }
    }

    #[test]
    fn test_object_without_envelope_is_schema_error() {
        let result = MetadataStore::from_document(json!({"records": []}));
        assert!(matches!(result, Err(IndexError::Schema(_))));
    }

    #[test]
    fn test_non_array_envelope_is_schema_error() {
        let result = MetadataStore::from_document(json!({"metadatos": "nope"}));
        assert!(matches!(result, Err(IndexError::Schema(_))));
    }

    #[test]
    fn test_scalar_document_is_schema_error() {
        let result = MetadataStore::from_document(json!(42));
        assert!(matches!(result, Err(IndexError::Schema(_))));
    }

    #[test]
    fn test_get_out_of_range() {
        let store = MetadataStore::from_document(json!([{"chunk": "a"}])).unwrap();
        assert!(store.get(-1).is_none());
        assert!(store.get(1).is_none());
        assert!(store.get(i64::MAX).is_none());
        assert!(store.get(0).is_some());
    }

    #[test]
    fn test_load_from_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("metadata.json");
        std::fs::write(&path, r#"{"metadatos": [{"chunk": "hello"}]}"#).unwrap();

        let store = MetadataStore::load(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0).unwrap()["chunk"], "hello");
    }
}
