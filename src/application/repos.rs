//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::wallet::WalletRecord;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("identifier does not parse as a did: {message}")]
    DidParse { message: String },
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn did_parse(message: impl Into<String>) -> Self {
        Self::DidParse {
            message: message.into(),
        }
    }
}

/// Wallet lookup surface of the persistence layer.
#[async_trait]
pub trait WalletRepo: Send + Sync {
    async fn find_by_bpn(&self, bpn: &str) -> Result<Option<WalletRecord>, RepoError>;

    /// Fails with [`RepoError::DidParse`] when the input is not a
    /// well-formed did.
    async fn find_by_did(&self, did: &str) -> Result<Option<WalletRecord>, RepoError>;
}
