mod common;

use cabhail::application::service::CabService;
use cabhail::application::{CreatePolicy, EngineSettings};
use cabhail::domain::ports::Collection;
use cabhail::error::CabError;
use cabhail::infrastructure::in_memory::InMemoryDocumentStore;
use common::PHONE;
use std::sync::Arc;

const RIDERS: usize = 32;

fn exclusive() -> EngineSettings {
    EngineSettings {
        create_policy: CreatePolicy::Exclusive,
        ..EngineSettings::default()
    }
}

/// Fires `RIDERS` simultaneous requests for one phone and returns how many
/// were accepted.
async fn race_requests(service: Arc<CabService>) -> usize {
    let mut handles = Vec::new();
    for i in 0..RIDERS {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .request_cab(PHONE, &format!("pickup {i}"), "Airport")
                .await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(CabError::AlreadyExists(_)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    accepted
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_exclusive_requests_admit_one() {
    let store = InMemoryDocumentStore::new();
    let service = Arc::new(common::service_with(&store, exclusive()));

    assert_eq!(race_requests(service.clone()).await, 1);
    assert_eq!(store.count(Collection::CabRequests).await, 1);

    let active = service.request_info(PHONE).await.unwrap();
    assert_eq!(active.requested_by, PHONE);
}

#[cfg(feature = "storage-rocksdb")]
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_exclusive_requests_admit_one_rocksdb() {
    use cabhail::domain::ports::{DocumentStoreRef, Filter};
    use cabhail::infrastructure::rocksdb::RocksDBStore;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let store: DocumentStoreRef = Arc::new(RocksDBStore::open(dir.path()).unwrap());
    let service = Arc::new(CabService::new(store.clone(), exclusive()));

    assert_eq!(race_requests(service).await, 1);

    let stored = store
        .delete_many(
            Collection::CabRequests,
            &Filter::new().field_eq("requestedby", PHONE),
        )
        .await
        .unwrap();
    assert_eq!(stored, 1);
}
