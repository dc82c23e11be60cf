//! In-process document and blob stores.
//!
//! Used as reference collaborators by tests and the CLI. Both can be switched
//! offline to exercise failure paths.

use crate::model::time::now_iso;
use crate::sync::remote::{
    BlobStore, Document, DocumentStore, QueryOp, RemoteCollection, RemoteError, RemoteResult,
};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Mutex, MutexGuard};

const BLOB_URL_PREFIX: &str = "memory://";

type Documents = BTreeMap<RemoteCollection, BTreeMap<String, Document>>;

#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<Documents>,
    offline: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with `RemoteError::Backend`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    pub fn count(&self, collection: RemoteCollection) -> usize {
        self.documents
            .lock()
            .map(|docs| docs.get(&collection).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    fn lock(&self, operation: &'static str) -> RemoteResult<MutexGuard<'_, Documents>> {
        if self.offline.load(AtomicOrdering::SeqCst) {
            return Err(RemoteError::Backend {
                operation,
                message: "document store is offline".to_string(),
            });
        }
        self.documents.lock().map_err(|_| RemoteError::Backend {
            operation,
            message: "document store lock poisoned".to_string(),
        })
    }
}

fn with_id(id: &str, fields: &Document) -> Document {
    let mut document = fields.clone();
    document.insert("id".to_string(), Value::String(id.to_string()));
    document
}

impl DocumentStore for MemoryDocumentStore {
    fn get_document(
        &self,
        collection: RemoteCollection,
        id: &str,
    ) -> RemoteResult<Option<Document>> {
        let docs = self.lock("get_document")?;
        Ok(docs
            .get(&collection)
            .and_then(|items| items.get(id))
            .map(|fields| with_id(id, fields)))
    }

    fn set_document(
        &self,
        collection: RemoteCollection,
        id: &str,
        fields: Document,
    ) -> RemoteResult<()> {
        let mut docs = self.lock("set_document")?;
        let now = Value::String(now_iso());
        let stored = docs
            .entry(collection)
            .or_default()
            .entry(id.to_string())
            .or_default();
        for (field, value) in fields {
            stored.insert(field, value);
        }
        stored
            .entry("createdAt".to_string())
            .or_insert_with(|| now.clone());
        stored.insert("updatedAt".to_string(), now);
        Ok(())
    }

    fn delete_document(&self, collection: RemoteCollection, id: &str) -> RemoteResult<()> {
        let mut docs = self.lock("delete_document")?;
        if let Some(items) = docs.get_mut(&collection) {
            items.remove(id);
        }
        Ok(())
    }

    fn query_documents(
        &self,
        collection: RemoteCollection,
        field: &str,
        op: QueryOp,
        value: &Value,
    ) -> RemoteResult<Vec<Document>> {
        let docs = self.lock("query_documents")?;
        Ok(docs
            .get(&collection)
            .into_iter()
            .flatten()
            .map(|(id, fields)| with_id(id, fields))
            .filter(|document| matches(document.get(field), op, value))
            .collect())
    }

    fn list_documents(&self, collection: RemoteCollection) -> RemoteResult<Vec<Document>> {
        let docs = self.lock("list_documents")?;
        Ok(docs
            .get(&collection)
            .into_iter()
            .flatten()
            .map(|(id, fields)| with_id(id, fields))
            .collect())
    }
}

/// Evaluates one query clause. Missing fields never match.
fn matches(field: Option<&Value>, op: QueryOp, expected: &Value) -> bool {
    let Some(actual) = field else {
        return false;
    };
    match op {
        QueryOp::Eq => actual == expected,
        QueryOp::Ne => actual != expected,
        QueryOp::Lt => compare(actual, expected) == Some(Ordering::Less),
        QueryOp::Le => matches!(
            compare(actual, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        QueryOp::Gt => compare(actual, expected) == Some(Ordering::Greater),
        QueryOp::Ge => matches!(
            compare(actual, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        QueryOp::ArrayContains => actual
            .as_array()
            .is_some_and(|items| items.contains(expected)),
        QueryOp::In => expected
            .as_array()
            .is_some_and(|candidates| candidates.contains(actual)),
    }
}

/// Orders numbers with numbers and strings with strings; other pairs are
/// incomparable.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l.as_f64()?.partial_cmp(&r.as_f64()?),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
    offline: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    /// Stored bytes at `path`.
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs.lock().ok()?.get(path).cloned()
    }

    fn lock(&self, operation: &'static str) -> RemoteResult<MutexGuard<'_, BTreeMap<String, Vec<u8>>>> {
        if self.offline.load(AtomicOrdering::SeqCst) {
            return Err(RemoteError::Backend {
                operation,
                message: "blob store is offline".to_string(),
            });
        }
        self.blobs.lock().map_err(|_| RemoteError::Backend {
            operation,
            message: "blob store lock poisoned".to_string(),
        })
    }
}

impl BlobStore for MemoryBlobStore {
    fn upload_blob(&self, path: &str, bytes: &[u8]) -> RemoteResult<String> {
        self.lock("upload_blob")?
            .insert(path.to_string(), bytes.to_vec());
        Ok(format!("{BLOB_URL_PREFIX}{path}"))
    }

    fn delete_blob(&self, path: &str) -> RemoteResult<()> {
        match self.lock("delete_blob")?.remove(path) {
            Some(_) => Ok(()),
            None => Err(RemoteError::BlobNotFound(path.to_string())),
        }
    }

    fn download_url(&self, path: &str) -> RemoteResult<String> {
        if self.lock("download_url")?.contains_key(path) {
            Ok(format!("{BLOB_URL_PREFIX}{path}"))
        } else {
            Err(RemoteError::BlobNotFound(path.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryBlobStore, MemoryDocumentStore};
    use crate::sync::remote::{BlobStore, DocumentStore, QueryOp, RemoteCollection, RemoteError};
    use serde_json::{json, Value};

    fn doc(value: Value) -> serde_json::Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn set_document_merges_and_stamps_times() {
        let store = MemoryDocumentStore::new();
        store
            .set_document(
                RemoteCollection::Clients,
                "c1",
                doc(json!({"name": "Jane", "email": "jane@example.com"})),
            )
            .unwrap();
        let first = store
            .get_document(RemoteCollection::Clients, "c1")
            .unwrap()
            .unwrap();
        store
            .set_document(RemoteCollection::Clients, "c1", doc(json!({"name": "Janet"})))
            .unwrap();

        let merged = store
            .get_document(RemoteCollection::Clients, "c1")
            .unwrap()
            .unwrap();
        assert_eq!(merged["id"], "c1");
        assert_eq!(merged["name"], "Janet");
        assert_eq!(merged["email"], "jane@example.com");
        assert_eq!(merged["createdAt"], first["createdAt"]);
        assert!(merged.contains_key("updatedAt"));
    }

    #[test]
    fn query_operators_compare_like_types() {
        let store = MemoryDocumentStore::new();
        for (id, reps, tags) in [("a", 5, json!(["legs"])), ("b", 10, json!(["arms"]))] {
            store
                .set_document(
                    RemoteCollection::Sessions,
                    id,
                    doc(json!({"reps": reps, "tags": tags})),
                )
                .unwrap();
        }

        let query = |field: &str, op: QueryOp, value: Value| -> Vec<String> {
            store
                .query_documents(RemoteCollection::Sessions, field, op, &value)
                .unwrap()
                .into_iter()
                .map(|d| d["id"].as_str().unwrap().to_string())
                .collect()
        };

        assert_eq!(query("reps", QueryOp::Ge, json!(10)), vec!["b"]);
        assert_eq!(query("reps", QueryOp::Lt, json!(10)), vec!["a"]);
        assert_eq!(query("reps", QueryOp::Ne, json!(5)), vec!["b"]);
        assert_eq!(query("tags", QueryOp::ArrayContains, json!("legs")), vec!["a"]);
        assert_eq!(query("reps", QueryOp::In, json!([5, 10])), vec!["a", "b"]);
        assert!(query("reps", QueryOp::Gt, json!("10")).is_empty());
        assert!(query("missing", QueryOp::Eq, Value::Null).is_empty());
    }

    #[test]
    fn offline_store_fails_without_touching_data() {
        let store = MemoryDocumentStore::new();
        store.set_offline(true);
        let err = store
            .list_documents(RemoteCollection::Workouts)
            .unwrap_err();
        assert!(matches!(err, RemoteError::Backend { operation: "list_documents", .. }));
    }

    #[test]
    fn blob_urls_resolve_only_for_stored_paths() {
        let blobs = MemoryBlobStore::new();
        let url = blobs.upload_blob("athletes/c1/photo.jpg", b"jpeg").unwrap();
        assert_eq!(url, "memory://athletes/c1/photo.jpg");
        assert_eq!(blobs.download_url("athletes/c1/photo.jpg").unwrap(), url);

        blobs.delete_blob("athletes/c1/photo.jpg").unwrap();
        assert!(matches!(
            blobs.download_url("athletes/c1/photo.jpg"),
            Err(RemoteError::BlobNotFound(_))
        ));
    }
}
