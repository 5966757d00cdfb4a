use crate::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A stored document: a flat JSON object keyed by field name.
pub type Document = Map<String, Value>;

/// Field holding a document's primary identifier.
pub const ID_FIELD: &str = "_id";

/// The collections the engine persists into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    VerificationCodes,
    Accounts,
    CabRequests,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::VerificationCodes,
        Collection::Accounts,
        Collection::CabRequests,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::VerificationCodes => "phone_code_verify",
            Collection::Accounts => "user_account",
            Collection::CabRequests => "cab_request",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A conjunction of field-equality predicates.
///
/// An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    terms: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.terms.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.terms
            .iter()
            .all(|(field, value)| doc.get(field) == Some(value))
    }

    pub fn terms(&self) -> &[(String, Value)] {
        &self.terms
    }
}

/// Persistence port consumed by every engine component.
///
/// Implementations must make each call atomic with respect to the others:
/// a unique-index check and its insert, a filtered update, and the guard and
/// insert of `insert_unless` each observe a consistent view.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts `doc`. Fails with `AlreadyExists` when a unique index on the
    /// collection already holds the document's value for that field.
    async fn insert(&self, collection: Collection, doc: Document) -> Result<()>;

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>>;

    /// Merges `patch` into the first document matching `filter` and returns
    /// how many documents matched (0 or 1).
    async fn update_one(&self, collection: Collection, filter: &Filter, patch: Document)
    -> Result<u64>;

    async fn delete_many(&self, collection: Collection, filter: &Filter) -> Result<u64>;

    /// Registers `field` as unique for the collection. Idempotent.
    async fn ensure_unique_index(&self, collection: Collection, field: &str) -> Result<()>;

    /// Inserts `doc` only if no document matches `guard`. Returns whether the
    /// insert happened.
    async fn insert_unless(&self, collection: Collection, guard: &Filter, doc: Document)
    -> Result<bool>;
}

pub type DocumentStoreRef = Arc<dyn DocumentStore>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_matches_all_terms() {
        let doc = json!({"phonenumber": "+1555", "status": 1})
            .as_object()
            .cloned()
            .unwrap();

        assert!(Filter::new().matches(&doc));
        assert!(Filter::new().field_eq("phonenumber", "+1555").matches(&doc));
        assert!(
            Filter::new()
                .field_eq("phonenumber", "+1555")
                .field_eq("status", 1)
                .matches(&doc)
        );
        assert!(!Filter::new().field_eq("status", 0).matches(&doc));
        assert!(!Filter::new().field_eq("missing", 1).matches(&doc));
    }
}
