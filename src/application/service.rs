use super::EngineSettings;
use super::accounts::AccountRegistry;
use super::requests::RequestLifecycle;
use super::verification::VerificationEngine;
use crate::domain::cab_request::CabRequest;
use crate::domain::ports::DocumentStoreRef;
use crate::domain::verification::VerificationCode;
use crate::error::{CabError, Result};

/// Result of submitting a phone number and code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The code matched. `created` is false when the account already existed.
    Verified { created: bool },
    Rejected,
}

/// The rider-facing workflows, wired over one injected store.
pub struct CabService {
    verification: VerificationEngine,
    accounts: AccountRegistry,
    requests: RequestLifecycle,
}

impl CabService {
    pub fn new(store: DocumentStoreRef, settings: EngineSettings) -> Self {
        Self {
            verification: VerificationEngine::new(
                store.clone(),
                settings.store_timeout,
                settings.code_ttl,
            ),
            accounts: AccountRegistry::new(store.clone(), settings.store_timeout),
            requests: RequestLifecycle::new(store, settings.store_timeout, settings.create_policy),
        }
    }

    pub fn verification(&self) -> &VerificationEngine {
        &self.verification
    }

    pub fn accounts(&self) -> &AccountRegistry {
        &self.accounts
    }

    pub fn requests(&self) -> &RequestLifecycle {
        &self.requests
    }

    pub async fn login(&self, phone: &str) -> Result<bool> {
        self.accounts.exists(phone).await
    }

    pub async fn verify(&self, phone: &str) -> Result<VerificationCode> {
        self.verification.request_code(phone).await
    }

    /// Confirms `raw_code` for `phone` and makes sure an account exists.
    ///
    /// Resubmitting a code for a phone that already has an account is not an
    /// error. The code is consumed once the account is in place.
    pub async fn validate(&self, phone: &str, raw_code: &str) -> Result<ValidationOutcome> {
        let code: VerificationCode = raw_code.parse()?;
        if !self.verification.confirm_code(phone, code).await? {
            tracing::warn!("verification code mismatch");
            return Ok(ValidationOutcome::Rejected);
        }

        let created = match self.accounts.create(phone, "", "").await {
            Ok(_) => true,
            Err(CabError::AlreadyExists(_)) => {
                tracing::debug!("account already registered");
                false
            }
            Err(e) => return Err(e),
        };
        self.verification.consume_code(phone, code).await?;
        Ok(ValidationOutcome::Verified { created })
    }

    pub async fn request_cab(&self, phone: &str, from: &str, to: &str) -> Result<CabRequest> {
        self.requests.create(from, to, phone).await
    }

    pub async fn request_info(&self, phone: &str) -> Result<CabRequest> {
        self.requests.get_active_by_phone(phone).await
    }

    pub async fn cancel_request(&self, request_id: &str) -> Result<()> {
        self.requests.cancel(request_id).await
    }
}
