//! Bootstrap-time population of the JSON-LD context cache.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ContextMapping;

use super::documents::LoadOptions;
use super::loader::{ProtocolPermissions, RemoteDocumentLoader};

/// Placeholder operators may embed in a mapping target to refer to the
/// process working directory.
pub const PWD_PLACEHOLDER: &str = "%PWD%";

#[derive(Debug, Error)]
pub enum WarmupError {
    #[error("failed to resolve the process working directory: {0}")]
    WorkingDir(#[source] std::io::Error),
    #[error("malformed context mapping target `{target}`: {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: url::ParseError,
    },
}

/// Outcome counts for one warm-up pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmupReport {
    pub warmed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Restores the saved permission flags when dropped, so every exit path out
/// of a warm-up pass leaves the loader exactly as it found it.
struct PermissionsGuard<'a> {
    loader: &'a RemoteDocumentLoader,
    saved: ProtocolPermissions,
}

impl Drop for PermissionsGuard<'_> {
    fn drop(&mut self) {
        self.loader.restore(self.saved);
    }
}

pub struct ContextWarmer {
    loader: Arc<RemoteDocumentLoader>,
}

impl ContextWarmer {
    pub fn new(loader: Arc<RemoteDocumentLoader>) -> Self {
        Self { loader }
    }

    /// Populate the document cache from `mappings`, in order. Namespaces
    /// already cached are left untouched. Individual fetch failures are
    /// logged and skipped; a target that does not parse as a URL aborts the
    /// pass. Callers run this to completion before serving traffic.
    pub async fn warm_up(
        &self,
        mappings: &[ContextMapping],
    ) -> Result<WarmupReport, WarmupError> {
        info!(
            target = "custode::cache_warmer",
            entries = mappings.len(),
            "warming json-ld context cache"
        );
        let started = Instant::now();
        let _guard = PermissionsGuard {
            loader: self.loader.as_ref(),
            saved: self.loader.snapshot(),
        };

        let pwd = working_dir()?;
        let options = LoadOptions::json_ld_context();
        let mut report = WarmupReport::default();

        for mapping in mappings {
            let namespace = mapping.namespace.as_str();
            if self.loader.document(namespace).is_some() {
                debug!(
                    target = "custode::cache_warmer",
                    namespace, "context cache already contains an entry"
                );
                report.skipped += 1;
                continue;
            }

            let target = mapping.target.replace(PWD_PLACEHOLDER, &pwd);
            let url = Url::parse(&target).map_err(|source| WarmupError::InvalidTarget {
                target: target.clone(),
                source,
            })?;

            let scheme = url.scheme();
            if !scheme.starts_with("https")
                && !scheme.starts_with("http")
                && !scheme.starts_with("file")
            {
                debug!(
                    target = "custode::cache_warmer",
                    namespace, scheme, "mapping target uses an unrecognized scheme"
                );
            }
            self.loader.enable_for(scheme);

            match self.loader.load(&url, &options).await {
                Ok(document) => {
                    info!(
                        target = "custode::cache_warmer",
                        namespace,
                        url = %url,
                        "storing preloaded json-ld context"
                    );
                    self.loader.store_if_absent(namespace, document);
                    counter!("custode_context_warm_total").increment(1);
                    report.warmed += 1;
                }
                Err(error) => {
                    warn!(
                        target = "custode::cache_warmer",
                        namespace,
                        url = %url,
                        error = %error,
                        "skipping context that could not be preloaded"
                    );
                    counter!("custode_context_warm_failed_total").increment(1);
                    report.failed += 1;
                }
            }
        }

        counter!("custode_context_warm_skipped_total").increment(report.skipped as u64);
        histogram!("custode_context_warm_ms").record(started.elapsed().as_secs_f64() * 1000.0);
        info!(
            target = "custode::cache_warmer",
            warmed = report.warmed,
            skipped = report.skipped,
            failed = report.failed,
            "context cache warm-up finished"
        );

        Ok(report)
    }
}

fn working_dir() -> Result<String, WarmupError> {
    let pwd = std::env::current_dir().map_err(WarmupError::WorkingDir)?;
    Ok(pwd.display().to_string().replace(' ', "%20"))
}
