#![cfg(feature = "storage-rocksdb")]

use cabhail::application::EngineSettings;
use cabhail::application::service::CabService;
use cabhail::domain::cab_request::RequestStatus;
use cabhail::infrastructure::rocksdb::RocksDBStore;
use std::sync::Arc;
use tempfile::tempdir;

#[tokio::test]
async fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: register an account and request a cab
    let request_id = {
        let store = RocksDBStore::open(&db_path).unwrap();
        let service = CabService::new(Arc::new(store), EngineSettings::default());
        let code = service.verify("+15551234").await.unwrap();
        service
            .validate("+15551234", &code.to_string())
            .await
            .unwrap();
        service
            .request_cab("+15551234", "A", "B")
            .await
            .unwrap()
            .id
            .to_hex()
    };

    // 2. Second run: reopen the same path and continue the lifecycle
    let store = RocksDBStore::open(&db_path).unwrap();
    let service = CabService::new(Arc::new(store), EngineSettings::default());

    assert!(service.login("+15551234").await.unwrap());
    let active = service.request_info("+15551234").await.unwrap();
    assert_eq!(active.id.to_hex(), request_id);
    assert_eq!(active.status, RequestStatus::Active);

    service.cancel_request(&request_id).await.unwrap();
    let cancelled = service.requests().get_by_id(&request_id).await.unwrap();
    assert_eq!(cancelled.status, RequestStatus::Cancelled);
}

#[tokio::test]
async fn test_rocksdb_duplicate_account_after_reopen() {
    let dir = tempdir().unwrap();

    {
        let store = RocksDBStore::open(dir.path()).unwrap();
        let service = CabService::new(Arc::new(store), EngineSettings::default());
        service.accounts().create("+15551234", "", "").await.unwrap();
    }

    let store = RocksDBStore::open(dir.path()).unwrap();
    let service = CabService::new(Arc::new(store), EngineSettings::default());
    let second = service.accounts().create("+15551234", "", "").await;
    assert!(matches!(
        second,
        Err(cabhail::error::CabError::AlreadyExists(_))
    ));
}
