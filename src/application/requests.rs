use super::{BoundedStore, CreatePolicy, require};
use crate::domain::cab_request::{CabRequest, RequestStatus};
use crate::domain::id::ObjectId;
use crate::domain::ports::{Collection, Document, DocumentStoreRef, Filter, ID_FIELD};
use crate::domain::{from_document, to_document};
use crate::error::{CabError, Result};
use std::time::Duration;

const REQUESTED_BY_FIELD: &str = "requestedby";
const STATUS_FIELD: &str = "status";

/// Creates, looks up and cancels cab requests.
///
/// Requests start `Active` and may only move to `Cancelled`. Under
/// `CreatePolicy::Legacy` nothing stops a rider from holding several active
/// requests at once; `get_active_by_phone` then returns whichever the store
/// finds first.
pub struct RequestLifecycle {
    store: BoundedStore,
    policy: CreatePolicy,
}

impl RequestLifecycle {
    pub fn new(store: DocumentStoreRef, timeout: Duration, policy: CreatePolicy) -> Self {
        Self {
            store: BoundedStore::new(store, timeout),
            policy,
        }
    }

    fn active_for(phone: &str) -> Filter {
        Filter::new()
            .field_eq(REQUESTED_BY_FIELD, phone)
            .field_eq(STATUS_FIELD, RequestStatus::Active.code())
    }

    pub async fn create(&self, from: &str, to: &str, requested_by: &str) -> Result<CabRequest> {
        require("from", from)?;
        require("to", to)?;
        require("phone number", requested_by)?;

        let request = CabRequest::new(from, to, requested_by);
        let doc = to_document(&request)?;
        match self.policy {
            CreatePolicy::Legacy => {
                self.store.insert(Collection::CabRequests, doc).await?;
            }
            CreatePolicy::Exclusive => {
                let inserted = self
                    .store
                    .insert_unless(Collection::CabRequests, &Self::active_for(requested_by), doc)
                    .await?;
                if !inserted {
                    tracing::warn!("rejected cab request: requester already has an active one");
                    return Err(CabError::AlreadyExists(format!(
                        "active request for phone {} already exists",
                        requested_by
                    )));
                }
            }
        }
        tracing::info!(request_id = %request.id, "created cab request");
        Ok(request)
    }

    pub async fn get_active_by_phone(&self, phone: &str) -> Result<CabRequest> {
        require("phone number", phone)?;
        let doc = self
            .store
            .find_one(Collection::CabRequests, &Self::active_for(phone))
            .await?
            .ok_or_else(|| CabError::NotFound(format!("request not found for phone {}", phone)))?;
        from_document(doc)
    }

    pub async fn get_by_id(&self, request_id: &str) -> Result<CabRequest> {
        let id: ObjectId = request_id.parse()?;
        let doc = self
            .store
            .find_one(Collection::CabRequests, &Filter::new().field_eq(ID_FIELD, id.to_hex()))
            .await?
            .ok_or_else(|| CabError::NotFound(format!("request with id {} not found", id)))?;
        from_document(doc)
    }

    /// Cancels the active request with id `request_id`.
    ///
    /// The update only applies while the request is active, so cancelling an
    /// already-cancelled request reports `NotFound` and changes nothing.
    pub async fn cancel(&self, request_id: &str) -> Result<()> {
        let id: ObjectId = request_id.parse()?;
        let filter = Filter::new()
            .field_eq(ID_FIELD, id.to_hex())
            .field_eq(STATUS_FIELD, RequestStatus::Active.code());
        let mut patch = Document::new();
        patch.insert(
            STATUS_FIELD.to_string(),
            RequestStatus::Cancelled.code().into(),
        );

        let matched = self
            .store
            .update_one(Collection::CabRequests, &filter, patch)
            .await?;
        if matched == 0 {
            return Err(CabError::NotFound(format!(
                "active request with id {} not found",
                id
            )));
        }
        tracing::info!(request_id = %id, "cancelled cab request");
        Ok(())
    }
}
