//! Persistence adapters implementing the `DocumentStore` port.

pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;

use crate::domain::ports::{Document, DocumentStoreRef};
use crate::error::{CabError, Result};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Opens the RocksDB store at `db_path`, or an in-memory store when no path
/// is given or the `storage-rocksdb` feature is disabled.
pub fn open_store(db_path: Option<&Path>) -> Result<DocumentStoreRef> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => Ok(Arc::new(self::rocksdb::RocksDBStore::open(path)?)),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(path) => {
            tracing::warn!(
                path = %path.display(),
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Arc::new(in_memory::InMemoryDocumentStore::new()))
        }
        None => Ok(Arc::new(in_memory::InMemoryDocumentStore::new())),
    }
}

/// Rejects `doc` when it repeats a value of a unique field held by any of
/// `existing`. Documents lacking the field are not indexed.
pub(crate) fn check_unique<'a>(
    unique_fields: Option<&HashSet<String>>,
    existing: impl IntoIterator<Item = &'a Document>,
    doc: &Document,
) -> Result<()> {
    let Some(fields) = unique_fields else {
        return Ok(());
    };
    let keyed: Vec<_> = fields
        .iter()
        .filter_map(|field| doc.get(field).map(|value| (field, value)))
        .collect();
    if keyed.is_empty() {
        return Ok(());
    }
    for other in existing {
        for (field, value) in &keyed {
            if other.get(field.as_str()) == Some(*value) {
                return Err(CabError::AlreadyExists(format!(
                    "duplicate key {} = {}",
                    field, value
                )));
            }
        }
    }
    Ok(())
}

/// Copies every field of `patch` onto `doc`.
pub(crate) fn apply_patch(doc: &mut Document, patch: &Document) {
    for (field, value) in patch {
        doc.insert(field.clone(), value.clone());
    }
}
