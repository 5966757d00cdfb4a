use super::{BoundedStore, require};
use crate::domain::account::Account;
use crate::domain::id::ObjectId;
use crate::domain::ports::{Collection, DocumentStoreRef, Filter, ID_FIELD};
use crate::domain::{from_document, to_document};
use crate::error::{CabError, Result};
use std::time::Duration;

const PHONE_FIELD: &str = "phonenumber";

/// Registry of rider accounts, one per phone number.
///
/// Uniqueness is delegated to the store's unique index on `phonenumber`; a
/// rejected insert surfaces as `AlreadyExists`, distinct from storage faults.
pub struct AccountRegistry {
    store: BoundedStore,
}

impl AccountRegistry {
    pub fn new(store: DocumentStoreRef, timeout: Duration) -> Self {
        Self {
            store: BoundedStore::new(store, timeout),
        }
    }

    pub async fn exists(&self, phone: &str) -> Result<bool> {
        Ok(self.find_by_phone(phone).await?.is_some())
    }

    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<Account>> {
        require("phone number", phone)?;
        self.store
            .find_one(Collection::Accounts, &Filter::new().field_eq(PHONE_FIELD, phone))
            .await?
            .map(from_document)
            .transpose()
    }

    /// Creates an active account for `phone`.
    pub async fn create(&self, phone: &str, name: &str, address: &str) -> Result<Account> {
        require("phone number", phone)?;
        self.store
            .ensure_unique_index(Collection::Accounts, PHONE_FIELD)
            .await?;

        let account = Account::new(phone, name, address);
        match self
            .store
            .insert(Collection::Accounts, to_document(&account)?)
            .await
        {
            Ok(()) => {
                tracing::info!(account_id = %account.id, "created account");
                Ok(account)
            }
            Err(CabError::AlreadyExists(_)) => Err(CabError::AlreadyExists(format!(
                "account for phone {} already exists",
                phone
            ))),
            Err(e) => {
                tracing::error!(error = %e, "failed to insert account");
                Err(e)
            }
        }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Account> {
        let id: ObjectId = id.parse()?;
        let doc = self
            .store
            .find_one(Collection::Accounts, &Filter::new().field_eq(ID_FIELD, id.to_hex()))
            .await?
            .ok_or_else(|| CabError::NotFound(format!("account with id {} not found", id)))?;
        from_document(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::AccountStatus;
    use crate::infrastructure::in_memory::InMemoryDocumentStore;
    use std::sync::Arc;

    fn registry(store: &InMemoryDocumentStore) -> AccountRegistry {
        AccountRegistry::new(Arc::new(store.clone()), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_create_then_exists() {
        let store = InMemoryDocumentStore::new();
        let registry = registry(&store);

        assert!(!registry.exists("+15551234").await.unwrap());
        let account = registry.create("+15551234", "", "").await.unwrap();
        assert_eq!(account.status, AccountStatus::Active);
        assert!(registry.exists("+15551234").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_phone_rejected() {
        let store = InMemoryDocumentStore::new();
        let registry = registry(&store);

        registry.create("+15551234", "Ada", "").await.unwrap();
        let second = registry.create("+15551234", "Bob", "").await;
        assert!(matches!(second, Err(CabError::AlreadyExists(_))));
        assert_eq!(store.count(Collection::Accounts).await, 1);

        let kept = registry.find_by_phone("+15551234").await.unwrap().unwrap();
        assert_eq!(kept.name, "Ada");
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let store = InMemoryDocumentStore::new();
        let registry = registry(&store);

        let account = registry.create("+15551234", "", "").await.unwrap();
        let fetched = registry.get_by_id(&account.id.to_hex()).await.unwrap();
        assert_eq!(fetched, account);

        let missing = registry.get_by_id(&ObjectId::new().to_hex()).await;
        assert!(matches!(missing, Err(CabError::NotFound(_))));

        let malformed = registry.get_by_id("not-an-id").await;
        assert!(matches!(malformed, Err(CabError::Validation(_))));
    }

    #[tokio::test]
    async fn test_empty_phone_rejected() {
        let store = InMemoryDocumentStore::new();
        let registry = registry(&store);
        assert!(matches!(
            registry.exists("").await,
            Err(CabError::Validation(_))
        ));
        assert!(matches!(
            registry.create("", "", "").await,
            Err(CabError::Validation(_))
        ));
    }
}
