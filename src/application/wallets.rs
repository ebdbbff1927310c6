//! Wallet resolution by BPN or DID identifier.

use std::sync::Arc;

use thiserror::Error;
use tracing::error;

use crate::application::repos::{RepoError, WalletRepo};
use crate::domain::wallet::{IdentifierKind, WalletRecord, classify_identifier};
use crate::util::sanitize::sanitize_for_log;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("wallet not found for identifier `{identifier}`")]
    NotFound { identifier: String },
    #[error(transparent)]
    Repo(RepoError),
}

impl WalletError {
    fn not_found(identifier: &str) -> Self {
        Self::NotFound {
            identifier: identifier.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct WalletService {
    repo: Arc<dyn WalletRepo>,
}

impl WalletService {
    pub fn new(repo: Arc<dyn WalletRepo>) -> Self {
        Self { repo }
    }

    /// Resolve a wallet by either identifier scheme. A malformed did and an
    /// absent wallet collapse into the same [`WalletError::NotFound`] so
    /// callers handle one error kind.
    pub async fn resolve(&self, identifier: &str) -> Result<WalletRecord, WalletError> {
        let looked_up = match classify_identifier(identifier) {
            IdentifierKind::Bpn => self.repo.find_by_bpn(identifier).await,
            IdentifierKind::Did => self.repo.find_by_did(identifier).await,
        };

        let wallet = match looked_up {
            Ok(wallet) => wallet,
            Err(RepoError::DidParse { message }) => {
                error!(
                    target = "custode::wallets",
                    identifier = %sanitize_for_log(identifier),
                    detail = %message,
                    "failed to parse did identifier"
                );
                return Err(WalletError::not_found(identifier));
            }
            Err(err) => return Err(WalletError::Repo(err)),
        };

        wallet.ok_or_else(|| WalletError::not_found(identifier))
    }
}
