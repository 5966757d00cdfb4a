use super::{BoundedStore, require};
use crate::domain::ports::{Collection, DocumentStoreRef, Filter};
use crate::domain::verification::{VerificationCode, VerificationEntry};
use crate::domain::{from_document, to_document};
use crate::error::Result;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Mutex;
use std::time::Duration;

const PHONE_FIELD: &str = "phonenumber";
const CODE_FIELD: &str = "verificationcode";

/// Issues and checks phone verification codes.
///
/// Codes are drawn from one generator seeded once per engine, so rapid calls
/// do not cluster. At most one live code exists per phone number: issuing a
/// new one removes the previous entry first. Concurrent issues for the same
/// number race and the last insert wins.
pub struct VerificationEngine {
    store: BoundedStore,
    rng: Mutex<StdRng>,
    code_ttl: Option<Duration>,
}

impl VerificationEngine {
    pub fn new(store: DocumentStoreRef, timeout: Duration, code_ttl: Option<Duration>) -> Self {
        Self {
            store: BoundedStore::new(store, timeout),
            rng: Mutex::new(StdRng::from_entropy()),
            code_ttl,
        }
    }

    fn next_code(&self) -> VerificationCode {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        VerificationCode::generate(&mut *rng)
    }

    /// Issues a fresh code for `phone`, replacing any unconsumed one.
    pub async fn request_code(&self, phone: &str) -> Result<VerificationCode> {
        require("phone number", phone)?;
        let code = self.next_code();

        let removed = self
            .store
            .delete_many(
                Collection::VerificationCodes,
                &Filter::new().field_eq(PHONE_FIELD, phone),
            )
            .await?;
        if removed > 0 {
            tracing::debug!(removed, "superseded previous verification code");
        }

        let entry = VerificationEntry::new(phone, code);
        self.store
            .insert(Collection::VerificationCodes, to_document(&entry)?)
            .await?;
        tracing::info!("issued verification code");
        Ok(code)
    }

    /// Returns whether `code` is the live code for `phone`.
    ///
    /// A missing or (when a TTL is configured) expired entry is a `false`
    /// outcome, not an error. The entry is left in place.
    pub async fn confirm_code(&self, phone: &str, code: VerificationCode) -> Result<bool> {
        require("phone number", phone)?;

        let filter = Filter::new()
            .field_eq(PHONE_FIELD, phone)
            .field_eq(CODE_FIELD, code.value());
        let Some(doc) = self
            .store
            .find_one(Collection::VerificationCodes, &filter)
            .await?
        else {
            return Ok(false);
        };

        let Some(ttl) = self.code_ttl else {
            return Ok(true);
        };
        let entry: VerificationEntry = from_document(doc)?;
        let fresh = match Utc::now().signed_duration_since(entry.created_at).to_std() {
            Ok(age) => age <= ttl,
            Err(_) => true,
        };
        if !fresh {
            tracing::warn!("verification code expired");
        }
        Ok(fresh)
    }

    /// Removes the entry holding `code` for `phone`, returning how many were
    /// removed. A code issued after `code` is left in place.
    pub async fn consume_code(&self, phone: &str, code: VerificationCode) -> Result<u64> {
        require("phone number", phone)?;
        let filter = Filter::new()
            .field_eq(PHONE_FIELD, phone)
            .field_eq(CODE_FIELD, code.value());
        self.store
            .delete_many(Collection::VerificationCodes, &filter)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CabError;
    use crate::infrastructure::in_memory::InMemoryDocumentStore;
    use std::sync::Arc;

    fn engine(store: &InMemoryDocumentStore, ttl: Option<Duration>) -> VerificationEngine {
        VerificationEngine::new(Arc::new(store.clone()), Duration::from_secs(1), ttl)
    }

    fn other_code(code: VerificationCode) -> VerificationCode {
        VerificationCode::new((code.value() + 1) % (VerificationCode::MAX + 1)).unwrap()
    }

    #[tokio::test]
    async fn test_issued_code_confirms() {
        let store = InMemoryDocumentStore::new();
        let engine = engine(&store, None);

        let code = engine.request_code("+15551234").await.unwrap();
        assert!(engine.confirm_code("+15551234", code).await.unwrap());
        assert!(!engine.confirm_code("+15551234", other_code(code)).await.unwrap());
        assert!(!engine.confirm_code("+15550000", code).await.unwrap());
    }

    #[tokio::test]
    async fn test_reissue_supersedes_previous_code() {
        let store = InMemoryDocumentStore::new();
        let engine = engine(&store, None);

        let first = engine.request_code("+15551234").await.unwrap();
        let mut second = engine.request_code("+15551234").await.unwrap();
        while second == first {
            second = engine.request_code("+15551234").await.unwrap();
        }

        assert!(!engine.confirm_code("+15551234", first).await.unwrap());
        assert!(engine.confirm_code("+15551234", second).await.unwrap());
        assert_eq!(store.count(Collection::VerificationCodes).await, 1);
    }

    #[tokio::test]
    async fn test_empty_phone_rejected() {
        let store = InMemoryDocumentStore::new();
        let engine = engine(&store, None);

        assert!(matches!(
            engine.request_code("").await,
            Err(CabError::Validation(_))
        ));
        let code = VerificationCode::new(1).unwrap();
        assert!(matches!(
            engine.confirm_code("  ", code).await,
            Err(CabError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_consume_invalidates_code() {
        let store = InMemoryDocumentStore::new();
        let engine = engine(&store, None);

        let code = engine.request_code("+15551234").await.unwrap();
        assert_eq!(engine.consume_code("+15551234", code).await.unwrap(), 1);
        assert!(!engine.confirm_code("+15551234", code).await.unwrap());
        assert_eq!(engine.consume_code("+15551234", code).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_consume_spares_newer_code() {
        let store = InMemoryDocumentStore::new();
        let engine = engine(&store, None);

        let stale = engine.request_code("+15551234").await.unwrap();
        let mut fresh = engine.request_code("+15551234").await.unwrap();
        while fresh == stale {
            fresh = engine.request_code("+15551234").await.unwrap();
        }

        assert_eq!(engine.consume_code("+15551234", stale).await.unwrap(), 0);
        assert!(engine.confirm_code("+15551234", fresh).await.unwrap());
        assert_eq!(store.count(Collection::VerificationCodes).await, 1);
    }

    #[tokio::test]
    async fn test_expired_code_does_not_confirm() {
        let store = InMemoryDocumentStore::new();
        let engine = engine(&store, Some(Duration::ZERO));

        let code = engine.request_code("+15551234").await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(!engine.confirm_code("+15551234", code).await.unwrap());
    }

    #[tokio::test]
    async fn test_codes_stay_in_range() {
        let store = InMemoryDocumentStore::new();
        let engine = engine(&store, None);
        for _ in 0..200 {
            assert!(engine.next_code().value() <= VerificationCode::MAX);
        }
    }
}
