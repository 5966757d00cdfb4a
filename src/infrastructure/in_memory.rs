use super::{apply_patch, check_unique};
use crate::domain::ports::{Collection, Document, DocumentStore, Filter};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    documents: HashMap<Collection, Vec<Document>>,
    unique: HashMap<Collection, HashSet<String>>,
}

/// A thread-safe in-memory document store.
///
/// Uses a single `Arc<RwLock<..>>` over every collection, so each port call
/// runs against a consistent snapshot and writes are atomic.
/// Ideal for testing or single-process deployments where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryDocumentStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryDocumentStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`.
    pub async fn count(&self, collection: Collection) -> usize {
        let state = self.state.read().await;
        state.documents.get(&collection).map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, collection: Collection, doc: Document) -> Result<()> {
        let mut state = self.state.write().await;
        let State { documents, unique } = &mut *state;
        let docs = documents.entry(collection).or_default();
        check_unique(unique.get(&collection), docs.iter(), &doc)?;
        docs.push(doc);
        Ok(())
    }

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>> {
        let state = self.state.read().await;
        Ok(state
            .documents
            .get(&collection)
            .and_then(|docs| docs.iter().find(|doc| filter.matches(doc)))
            .cloned())
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: Document,
    ) -> Result<u64> {
        let mut state = self.state.write().await;
        let matched = state
            .documents
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|doc| filter.matches(doc)));
        match matched {
            Some(doc) => {
                apply_patch(doc, &patch);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_many(&self, collection: Collection, filter: &Filter) -> Result<u64> {
        let mut state = self.state.write().await;
        let Some(docs) = state.documents.get_mut(&collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|doc| !filter.matches(doc));
        Ok((before - docs.len()) as u64)
    }

    async fn ensure_unique_index(&self, collection: Collection, field: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .unique
            .entry(collection)
            .or_default()
            .insert(field.to_string());
        Ok(())
    }

    async fn insert_unless(
        &self,
        collection: Collection,
        guard: &Filter,
        doc: Document,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        let State { documents, unique } = &mut *state;
        let docs = documents.entry(collection).or_default();
        if docs.iter().any(|existing| guard.matches(existing)) {
            return Ok(false);
        }
        check_unique(unique.get(&collection), docs.iter(), &doc)?;
        docs.push(doc);
        Ok(true)
    }
}
