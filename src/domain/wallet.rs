//! Wallet entities and identifier classification.

use serde::Serialize;
use time::OffsetDateTime;

/// A managed wallet as surfaced by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletRecord {
    pub bpn: String,
    pub did: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The two mutually exclusive identifier schemes a wallet can be looked up
/// by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Bpn,
    Did,
}

/// Classify an opaque identifier. Total: anything that does not carry the
/// `did:` scheme prefix is treated as a business partner number.
pub fn classify_identifier(identifier: &str) -> IdentifierKind {
    if identifier.starts_with("did:") {
        IdentifierKind::Did
    } else {
        IdentifierKind::Bpn
    }
}
