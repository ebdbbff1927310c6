//! Custode: identity-wallet custodian core.
//!
//! Owns the bootstrap-time JSON-LD context cache warm-up plus the
//! per-request wallet-resolution and credential-expiry services. The
//! persistence layer and the outer HTTP surface stay behind trait seams.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod util;
