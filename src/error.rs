use thiserror::Error;

/// Errors produced by the verification, account and cab request workflows.
///
/// `Validation`, `NotFound` and `AlreadyExists` are expected outcomes reported
/// back to the caller. `Storage` covers every infrastructural failure of the
/// persistence layer, including deadline expiry.
#[derive(Error, Debug)]
pub enum CabError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("storage deadline elapsed")]
    Timeout(#[from] tokio::time::error::Elapsed),
}

impl CabError {
    /// True for failures the caller should treat as a server-side fault.
    pub fn is_storage(&self) -> bool {
        match self {
            Self::Validation(_) | Self::NotFound(_) | Self::AlreadyExists(_) => false,
            Self::Storage(_) | Self::Serialization(_) | Self::Timeout(_) => true,
        }
    }
}

pub type Result<T> = std::result::Result<T, CabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_classification() {
        assert!(!CabError::Validation("x".into()).is_storage());
        assert!(!CabError::NotFound("x".into()).is_storage());
        assert!(!CabError::AlreadyExists("x".into()).is_storage());
        assert!(CabError::Storage("x".into()).is_storage());

        let json_err = serde_json::from_str::<u8>("nope").unwrap_err();
        assert!(CabError::from(json_err).is_storage());
    }
}
