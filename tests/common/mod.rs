#![allow(dead_code)]

use cabhail::application::EngineSettings;
use cabhail::application::service::CabService;
use cabhail::infrastructure::in_memory::InMemoryDocumentStore;
use std::sync::Arc;

pub const PHONE: &str = "+15551234";

pub fn service_with(store: &InMemoryDocumentStore, settings: EngineSettings) -> CabService {
    CabService::new(Arc::new(store.clone()), settings)
}

pub fn service(store: &InMemoryDocumentStore) -> CabService {
    service_with(store, EngineSettings::default())
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
