//! Domain types and the persistence port.
//!
//! Everything here is storage-agnostic: entities serialize to the documents
//! the `DocumentStore` port persists, and nothing performs I/O.

pub mod account;
pub mod cab_request;
pub mod id;
pub mod ports;
pub mod verification;

use crate::error::{CabError, Result};
use ports::Document;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Converts an entity into a stored document.
pub fn to_document<T: Serialize>(entity: &T) -> Result<Document> {
    match serde_json::to_value(entity)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(CabError::Storage(format!(
            "entity did not serialize to an object: {}",
            other
        ))),
    }
}

/// Converts a stored document back into an entity.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T> {
    Ok(serde_json::from_value(serde_json::Value::Object(doc))?)
}
