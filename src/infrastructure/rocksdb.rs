use super::{apply_patch, check_unique};
use crate::domain::id::ObjectId;
use crate::domain::ports::{Collection, Document, DocumentStore, Filter, ID_FIELD};
use crate::error::{CabError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

type UniqueIndexes = HashMap<Collection, HashSet<String>>;

impl From<rocksdb::Error> for CabError {
    fn from(err: rocksdb::Error) -> Self {
        CabError::Storage(format!("rocksdb: {}", err))
    }
}

/// A persistent document store backed by RocksDB.
///
/// Each `Collection` lives in its own column family, keyed by the document's
/// `_id` (or a generated id for documents without one) and holding the
/// document as JSON.
///
/// Every call runs on tokio's blocking pool. Writes take one mutex, which
/// also guards the unique-index registry, so unique checks and conditional
/// writes are atomic.
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    writes: Arc<Mutex<UniqueIndexes>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that one column family exists per collection.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = Collection::ALL
            .iter()
            .map(|c| ColumnFamilyDescriptor::new(c.name(), Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;
        tracing::info!("opened rocksdb document store");

        Ok(Self {
            db: Arc::new(db),
            writes: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Runs `work` on the blocking pool against a clone of this handle.
    async fn blocking<T, F>(&self, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&RocksDBStore) -> Result<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || work(&store))
            .await
            .map_err(|e| CabError::Storage(format!("rocksdb task failed: {}", e)))?
    }

    fn lock_writes(&self) -> MutexGuard<'_, UniqueIndexes> {
        self.writes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn cf(&self, collection: Collection) -> Result<&ColumnFamily> {
        self.db.cf_handle(collection.name()).ok_or_else(|| {
            CabError::Storage(format!("column family {} not found", collection))
        })
    }

    fn scan(&self, collection: Collection) -> Result<Vec<(Box<[u8]>, Document)>> {
        let cf = self.cf(collection)?;
        let mut docs = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item?;
            let doc: Document = serde_json::from_slice(&value)?;
            docs.push((key, doc));
        }
        Ok(docs)
    }

    /// First document matching `filter`, with its key. A filter pinning a
    /// string `_id` reads that one key instead of scanning.
    fn first_match(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<(Box<[u8]>, Document)>> {
        let cf = self.cf(collection)?;
        if let Some(id) = id_term(filter) {
            let Some(value) = self.db.get_cf(cf, id.as_bytes())? else {
                return Ok(None);
            };
            let doc: Document = serde_json::from_slice(&value)?;
            let key: Box<[u8]> = id.as_bytes().into();
            return Ok(filter.matches(&doc).then_some((key, doc)));
        }

        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item?;
            let doc: Document = serde_json::from_slice(&value)?;
            if filter.matches(&doc) {
                return Ok(Some((key, doc)));
            }
        }
        Ok(None)
    }

    fn put(&self, collection: Collection, doc: &Document) -> Result<()> {
        let key = match doc.get(ID_FIELD).and_then(|v| v.as_str()) {
            Some(id) => id.to_string(),
            None => ObjectId::new().to_hex(),
        };
        let value = serde_json::to_vec(doc)?;
        self.db.put_cf(self.cf(collection)?, key.as_bytes(), value)?;
        Ok(())
    }
}

fn id_term(filter: &Filter) -> Option<&str> {
    filter
        .terms()
        .iter()
        .find(|(field, _)| field == ID_FIELD)
        .and_then(|(_, value)| value.as_str())
}

#[async_trait]
impl DocumentStore for RocksDBStore {
    async fn insert(&self, collection: Collection, doc: Document) -> Result<()> {
        self.blocking(move |store| {
            let unique = store.lock_writes();
            if let Some(fields) = unique.get(&collection) {
                let existing = store.scan(collection)?;
                check_unique(Some(fields), existing.iter().map(|(_, d)| d), &doc)?;
            }
            store.put(collection, &doc)
        })
        .await
    }

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>> {
        let filter = filter.clone();
        self.blocking(move |store| {
            Ok(store
                .first_match(collection, &filter)?
                .map(|(_, doc)| doc))
        })
        .await
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: Document,
    ) -> Result<u64> {
        let filter = filter.clone();
        self.blocking(move |store| {
            let _guard = store.lock_writes();
            let Some((key, mut doc)) = store.first_match(collection, &filter)? else {
                return Ok(0);
            };
            apply_patch(&mut doc, &patch);
            store
                .db
                .put_cf(store.cf(collection)?, key, serde_json::to_vec(&doc)?)?;
            Ok(1)
        })
        .await
    }

    async fn delete_many(&self, collection: Collection, filter: &Filter) -> Result<u64> {
        let filter = filter.clone();
        self.blocking(move |store| {
            let _guard = store.lock_writes();
            let cf = store.cf(collection)?;
            let mut batch = WriteBatch::default();
            let mut removed = 0;
            for (key, doc) in store.scan(collection)? {
                if filter.matches(&doc) {
                    batch.delete_cf(cf, key);
                    removed += 1;
                }
            }
            store.db.write(batch)?;
            Ok(removed)
        })
        .await
    }

    async fn ensure_unique_index(&self, collection: Collection, field: &str) -> Result<()> {
        let field = field.to_string();
        self.blocking(move |store| {
            store
                .lock_writes()
                .entry(collection)
                .or_default()
                .insert(field);
            Ok(())
        })
        .await
    }

    async fn insert_unless(
        &self,
        collection: Collection,
        guard: &Filter,
        doc: Document,
    ) -> Result<bool> {
        let guard = guard.clone();
        self.blocking(move |store| {
            let unique = store.lock_writes();
            let existing = store.scan(collection)?;
            if existing.iter().any(|(_, d)| guard.matches(d)) {
                return Ok(false);
            }
            check_unique(unique.get(&collection), existing.iter().map(|(_, d)| d), &doc)?;
            store.put(collection, &doc)?;
            Ok(true)
        })
        .await
    }
}
