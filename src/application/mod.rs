//! Application layer containing the verification and cab request workflows.
//!
//! Each component is stateless between calls: it holds an injected
//! `DocumentStore` and performs every port call under a fixed deadline, so a
//! stalled backend surfaces as a storage error instead of a hung request.

pub mod accounts;
pub mod requests;
pub mod service;
pub mod verification;

use crate::domain::ports::{Collection, Document, DocumentStoreRef, Filter};
use crate::error::{CabError, Result};
use std::future::Future;
use std::time::Duration;

/// Default per-call deadline applied to persistence operations.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// How `RequestLifecycle::create` treats a requester that already has an
/// active request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreatePolicy {
    /// Always insert. The one-active-request invariant is advisory.
    #[default]
    Legacy,
    /// Insert only if the requester has no active request.
    Exclusive,
}

/// Tunables shared by the engine components.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub store_timeout: Duration,
    /// Codes older than this no longer confirm. `None` keeps codes valid
    /// until superseded or consumed.
    pub code_ttl: Option<Duration>,
    pub create_policy: CreatePolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            store_timeout: DEFAULT_STORE_TIMEOUT,
            code_ttl: None,
            create_policy: CreatePolicy::Legacy,
        }
    }
}

/// A `DocumentStore` handle whose every call is bounded by a deadline.
///
/// Each call runs on its own task, so the deadline holds even when a backend
/// does blocking work without yielding. A call that overruns is aborted at its
/// next await point.
#[derive(Clone)]
pub(crate) struct BoundedStore {
    store: DocumentStoreRef,
    timeout: Duration,
}

impl BoundedStore {
    pub(crate) fn new(store: DocumentStoreRef, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    async fn bounded<T, F, Fut>(&self, op: &'static str, call: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(DocumentStoreRef) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let mut task = tokio::spawn(call(self.store.clone()));
        match tokio::time::timeout(self.timeout, &mut task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => {
                tracing::error!(op, error = %join, "store call aborted");
                Err(CabError::Storage(format!("{} failed: {}", op, join)))
            }
            Err(elapsed) => {
                task.abort();
                tracing::error!(op, timeout_ms = self.timeout.as_millis() as u64, "store call timed out");
                Err(CabError::from(elapsed))
            }
        }
    }

    pub(crate) async fn insert(&self, collection: Collection, doc: Document) -> Result<()> {
        self.bounded("insert", move |store| async move {
            store.insert(collection, doc).await
        })
        .await
    }

    pub(crate) async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>> {
        let filter = filter.clone();
        self.bounded("find_one", move |store| async move {
            store.find_one(collection, &filter).await
        })
        .await
    }

    pub(crate) async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: Document,
    ) -> Result<u64> {
        let filter = filter.clone();
        self.bounded("update_one", move |store| async move {
            store.update_one(collection, &filter, patch).await
        })
        .await
    }

    pub(crate) async fn delete_many(&self, collection: Collection, filter: &Filter) -> Result<u64> {
        let filter = filter.clone();
        self.bounded("delete_many", move |store| async move {
            store.delete_many(collection, &filter).await
        })
        .await
    }

    pub(crate) async fn ensure_unique_index(&self, collection: Collection, field: &str) -> Result<()> {
        let field = field.to_string();
        self.bounded("ensure_unique_index", move |store| async move {
            store.ensure_unique_index(collection, &field).await
        })
        .await
    }

    pub(crate) async fn insert_unless(
        &self,
        collection: Collection,
        guard: &Filter,
        doc: Document,
    ) -> Result<bool> {
        let guard = guard.clone();
        self.bounded("insert_unless", move |store| async move {
            store.insert_unless(collection, &guard, doc).await
        })
        .await
    }
}

/// Rejects empty (or whitespace-only) caller input.
pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(CabError::Validation(format!("{} is required", field)))
    } else {
        Ok(())
    }
}
