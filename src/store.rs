//! Document store: named collections of documents over a flat key-value
//! backing.
//!
//! Collections are created implicitly on first write and persist one key
//! each (`collection_<name>`) holding the JSON array of their documents.
//! Every mutating operation writes through to the backing before it
//! returns; the store never buffers writes across operations. Collections
//! are independent keys — there is no cross-collection atomicity.

use crate::error::{Error, Result};
use crate::query::{self, Constraint};
use crate::storage::StorageBackend;
use crate::value::{value_at_path, Fields, Value};
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// A single identified record with typed fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Identifier, unique within the document's collection.
    pub id: String,
    /// Field name to value mapping.
    pub fields: Fields,
}

impl Document {
    /// Resolve a dot-separated field path. Missing paths are undefined,
    /// never an error.
    pub fn field(&self, path: &str) -> Option<&Value> {
        value_at_path(&self.fields, path)
    }
}

/// Named collections of documents with write-through persistence.
///
/// Collections are cached in memory after first touch; every mutation
/// re-serializes the collection and hands it to the backing before
/// returning, so reads within the process always observe completed writes.
pub struct DocumentStore {
    backend: Arc<dyn StorageBackend>,
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

fn collection_key(collection: &str) -> String {
    format!("collection_{collection}")
}

impl DocumentStore {
    /// Create a store over the given backing.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Get a document by id. `Error::NotFound` if absent.
    pub fn get(&self, collection: &str, id: &str) -> Result<Document> {
        self.with_collection(collection, |docs| {
            docs.iter()
                .find(|d| d.id == id)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("{collection}/{id}")))
        })?
    }

    /// Replace-or-insert a document. No error on overwrite.
    ///
    /// `createdAt` is carried over from the existing document (or set to
    /// now on first insert) unless the caller supplied one; `updatedAt` is
    /// always set to now.
    pub fn put(&self, collection: &str, id: &str, mut fields: Fields) -> Result<Document> {
        self.mutate_collection(collection, |docs| {
            let now = Value::Timestamp(Utc::now());
            let existing = docs.iter().position(|d| d.id == id);

            if !fields.contains_key("createdAt") {
                let carried = existing
                    .and_then(|i| docs[i].fields.get("createdAt").cloned())
                    .unwrap_or_else(|| now.clone());
                fields.insert("createdAt".to_string(), carried);
            }
            fields.insert("updatedAt".to_string(), now);

            let doc = Document {
                id: id.to_string(),
                fields,
            };
            match existing {
                Some(i) => docs[i] = doc.clone(),
                None => docs.push(doc.clone()),
            }
            debug!(collection, id, "put document");
            doc
        })
    }

    /// Shallow-merge partial fields into an existing document's top level.
    ///
    /// Silent no-op if the document does not exist — update does nothing on
    /// a missing id, it does not create. Sets `updatedAt` when it applies.
    pub fn patch(&self, collection: &str, id: &str, partial: Fields) -> Result<()> {
        self.mutate_collection(collection, |docs| {
            let Some(doc) = docs.iter_mut().find(|d| d.id == id) else {
                return false;
            };
            for (k, v) in partial {
                doc.fields.insert(k, v);
            }
            doc.fields
                .insert("updatedAt".to_string(), Value::Timestamp(Utc::now()));
            debug!(collection, id, "patched document");
            true
        })
        .map(|_| ())
    }

    /// Insert a new document under a fresh id and return the id.
    pub fn add(&self, collection: &str, fields: Fields) -> Result<String> {
        let id = fresh_id();
        {
            // An id collision means the generator broke, not a condition
            // callers can recover from.
            let collections = self.collections.read();
            if let Some(docs) = collections.get(collection) {
                assert!(
                    docs.iter().all(|d| d.id != id),
                    "generated document id collided: {id}"
                );
            }
        }
        self.put(collection, &id, fields)?;
        Ok(id)
    }

    /// Delete a document. No-op if absent.
    pub fn remove(&self, collection: &str, id: &str) -> Result<()> {
        self.mutate_collection(collection, |docs| {
            let before = docs.len();
            docs.retain(|d| d.id != id);
            if docs.len() < before {
                debug!(collection, id, "removed document");
            }
        })
    }

    /// All documents in a collection, in enumeration order. Callers needing
    /// a specific order use [`DocumentStore::query`].
    pub fn list(&self, collection: &str) -> Result<Vec<Document>> {
        self.with_collection(collection, |docs| docs.to_vec())
    }

    /// Evaluate filter/order/limit constraints over a collection.
    ///
    /// See [`crate::query`] for the evaluation semantics.
    pub fn query(&self, collection: &str, constraints: &[Constraint]) -> Result<Vec<Document>> {
        let docs = self.list(collection)?;
        Ok(query::evaluate(docs, constraints))
    }

    /// Drop an entire collection, including its backing key.
    pub fn clear(&self, collection: &str) -> Result<()> {
        self.collections.write().remove(collection);
        self.backend.delete(&collection_key(collection))?;
        debug!(collection, "cleared collection");
        Ok(())
    }

    /// Run a closure against a collection's documents, loading from the
    /// backing on first touch.
    fn with_collection<T>(&self, collection: &str, f: impl FnOnce(&[Document]) -> T) -> Result<T> {
        {
            let collections = self.collections.read();
            if let Some(docs) = collections.get(collection) {
                return Ok(f(docs));
            }
        }
        let docs = self.load(collection)?;
        let mut collections = self.collections.write();
        let docs = collections.entry(collection.to_string()).or_insert(docs);
        Ok(f(docs))
    }

    /// Run a mutation against a collection and write the result through to
    /// the backing before returning.
    fn mutate_collection<T>(
        &self,
        collection: &str,
        f: impl FnOnce(&mut Vec<Document>) -> T,
    ) -> Result<T> {
        let mut collections = self.collections.write();
        let docs = match collections.entry(collection.to_string()) {
            std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
            std::collections::hash_map::Entry::Vacant(e) => {
                let loaded = load_from(&*self.backend, collection)?;
                e.insert(loaded)
            }
        };
        let out = f(docs);
        let bytes = serde_json::to_vec(&docs)?;
        self.backend.store(&collection_key(collection), &bytes)?;
        Ok(out)
    }

    fn load(&self, collection: &str) -> Result<Vec<Document>> {
        load_from(&*self.backend, collection)
    }
}

fn load_from(backend: &dyn StorageBackend, collection: &str) -> Result<Vec<Document>> {
    match backend.load(&collection_key(collection))? {
        Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
            warn!(collection, error = %e, "collection file is unreadable");
            Error::Storage(format!("corrupt collection {collection}: {e}"))
        }),
        None => Ok(Vec::new()),
    }
}

/// Fresh document id: generation time plus a random component. Collisions
/// would require a duplicated uuid fragment within one millisecond.
fn fresh_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let uuid = Uuid::new_v4().simple().to_string();
    format!("doc_{millis}_{}", &uuid[..8])
}
