//! Shared remote-document loader: protocol gate plus namespace-keyed
//! document cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use metrics::counter;
use thiserror::Error;
use url::Url;

use super::documents::{DocumentFetcher, FetchError, JsonDocument, LoadOptions};

/// Snapshot of the three transport permission flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolPermissions {
    pub https: bool,
    pub http: bool,
    pub file: bool,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("scheme `{scheme}` is not currently permitted")]
    SchemeDisabled { scheme: String },
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Process-wide document loader. Constructed once at startup, populated by
/// the context warmer, read by request-serving code thereafter. The cache
/// only grows; nothing is ever evicted or overwritten.
pub struct RemoteDocumentLoader {
    allow_https: AtomicBool,
    allow_http: AtomicBool,
    allow_file: AtomicBool,
    cache: DashMap<String, JsonDocument>,
    fetcher: Arc<dyn DocumentFetcher>,
}

impl RemoteDocumentLoader {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self {
            allow_https: AtomicBool::new(false),
            allow_http: AtomicBool::new(false),
            allow_file: AtomicBool::new(false),
            cache: DashMap::new(),
            fetcher,
        }
    }

    pub fn snapshot(&self) -> ProtocolPermissions {
        ProtocolPermissions {
            https: self.allow_https.load(Ordering::Relaxed),
            http: self.allow_http.load(Ordering::Relaxed),
            file: self.allow_file.load(Ordering::Relaxed),
        }
    }

    /// Write all three flags back, regardless of intermediate toggles.
    pub fn restore(&self, permissions: ProtocolPermissions) {
        self.allow_https.store(permissions.https, Ordering::Relaxed);
        self.allow_http.store(permissions.http, Ordering::Relaxed);
        self.allow_file.store(permissions.file, Ordering::Relaxed);
    }

    /// Enable the single flag matching `scheme`. An unrecognized scheme
    /// enables nothing; rejection happens later, at fetch time.
    pub fn enable_for(&self, scheme: &str) {
        if scheme.starts_with("https") {
            self.allow_https.store(true, Ordering::Relaxed);
        } else if scheme.starts_with("http") {
            self.allow_http.store(true, Ordering::Relaxed);
        } else if scheme.starts_with("file") {
            self.allow_file.store(true, Ordering::Relaxed);
        }
    }

    fn allows(&self, scheme: &str) -> bool {
        if scheme.starts_with("https") {
            self.allow_https.load(Ordering::Relaxed)
        } else if scheme.starts_with("http") {
            self.allow_http.load(Ordering::Relaxed)
        } else if scheme.starts_with("file") {
            self.allow_file.load(Ordering::Relaxed)
        } else {
            false
        }
    }

    pub fn document(&self, namespace: &str) -> Option<JsonDocument> {
        let hit = self.cache.get(namespace).map(|entry| entry.value().clone());
        if hit.is_some() {
            counter!("custode_document_cache_hit_total").increment(1);
        } else {
            counter!("custode_document_cache_miss_total").increment(1);
        }
        hit
    }

    /// Store `document` under `namespace` unless an earlier pass already
    /// populated it.
    pub fn store_if_absent(&self, namespace: &str, document: JsonDocument) {
        self.cache.entry(namespace.to_string()).or_insert(document);
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Fetch `target`, preferring a cached copy keyed by the target itself.
    /// The cache is never written here; population is the warmer's (or the
    /// caller's) decision.
    pub async fn load(
        &self,
        target: &Url,
        options: &LoadOptions,
    ) -> Result<JsonDocument, LoadError> {
        if let Some(document) = self.document(target.as_str()) {
            return Ok(document);
        }

        let scheme = target.scheme();
        if !self.allows(scheme) {
            return Err(LoadError::SchemeDisabled {
                scheme: scheme.to_string(),
            });
        }

        Ok(self.fetcher.fetch(target, options).await?)
    }
}
