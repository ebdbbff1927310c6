//! Warm-up behavior of the JSON-LD context cache.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use url::Url;

use custode::config::ContextMapping;
use custode::infra::cache_warmer::{ContextWarmer, WarmupError};
use custode::infra::documents::{
    DocumentFetcher, FetchError, JSON_LD_CONTEXT_PROFILE, JsonDocument, LoadOptions,
};
use custode::infra::loader::{ProtocolPermissions, RemoteDocumentLoader};

const PERMISSIONS_OFF: ProtocolPermissions = ProtocolPermissions {
    https: false,
    http: false,
    file: false,
};

#[derive(Debug, Clone)]
struct Observation {
    url: String,
    profile: Option<String>,
    permissions: Option<ProtocolPermissions>,
}

/// Fetch collaborator scripted per target URL. Once attached to a loader it
/// records the permission flags visible at the moment of each fetch.
#[derive(Default)]
struct ScriptedFetcher {
    documents: HashMap<String, Value>,
    failing: HashSet<String>,
    observed: Mutex<Vec<Observation>>,
    loader: Mutex<Option<Arc<RemoteDocumentLoader>>>,
}

impl ScriptedFetcher {
    fn attach(&self, loader: Arc<RemoteDocumentLoader>) {
        *self.loader.lock().unwrap() = Some(loader);
    }

    fn observed_urls(&self) -> Vec<String> {
        self.observed
            .lock()
            .unwrap()
            .iter()
            .map(|observation| observation.url.clone())
            .collect()
    }
}

#[async_trait]
impl DocumentFetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        target: &Url,
        options: &LoadOptions,
    ) -> Result<JsonDocument, FetchError> {
        let permissions = self
            .loader
            .lock()
            .unwrap()
            .as_ref()
            .map(|loader| loader.snapshot());
        self.observed.lock().unwrap().push(Observation {
            url: target.to_string(),
            profile: options.profile.clone(),
            permissions,
        });

        if self.failing.contains(target.as_str()) {
            return Err(FetchError::Transport("connection refused".to_string()));
        }
        match self.documents.get(target.as_str()) {
            Some(content) => JsonDocument::from_value(content.clone()),
            None => Err(FetchError::Status { status: 404 }),
        }
    }
}

fn scripted(documents: &[(&str, Value)], failing: &[&str]) -> Arc<ScriptedFetcher> {
    Arc::new(ScriptedFetcher {
        documents: documents
            .iter()
            .map(|(url, content)| (url.to_string(), content.clone()))
            .collect(),
        failing: failing.iter().map(|url| url.to_string()).collect(),
        ..Default::default()
    })
}

fn loader_with(fetcher: &Arc<ScriptedFetcher>) -> Arc<RemoteDocumentLoader> {
    let loader = Arc::new(RemoteDocumentLoader::new(fetcher.clone()));
    fetcher.attach(loader.clone());
    loader
}

fn mapping(namespace: &str, target: &str) -> ContextMapping {
    ContextMapping::new(namespace, target)
}

#[tokio::test]
async fn warms_every_mapping_and_restores_permissions() {
    let fetcher = scripted(
        &[
            (
                "https://example.com/credentials.jsonld",
                json!({"@context": {"cred": "https://example.com/cred#"}}),
            ),
            (
                "https://example.com/security.jsonld",
                json!({"@context": {"sec": "https://example.com/sec#"}}),
            ),
        ],
        &[],
    );
    let loader = loader_with(&fetcher);
    let warmer = ContextWarmer::new(loader.clone());

    let report = warmer
        .warm_up(&[
            mapping(
                "https://example.com/ns/credentials",
                "https://example.com/credentials.jsonld",
            ),
            mapping(
                "https://example.com/ns/security",
                "https://example.com/security.jsonld",
            ),
        ])
        .await
        .expect("warm-up succeeds");

    assert_eq!(report.warmed, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.failed, 0);
    assert!(loader.document("https://example.com/ns/credentials").is_some());
    assert!(loader.document("https://example.com/ns/security").is_some());
    assert_eq!(loader.snapshot(), PERMISSIONS_OFF);
}

#[tokio::test]
async fn rerun_leaves_previously_warmed_documents_unchanged() {
    let fetcher = scripted(
        &[(
            "https://example.com/credentials.jsonld",
            json!({"@context": {"fresh": true}}),
        )],
        &[],
    );
    let loader = loader_with(&fetcher);
    let warmer = ContextWarmer::new(loader.clone());

    let original =
        JsonDocument::from_value(json!({"@context": {"original": true}})).unwrap();
    loader.store_if_absent("https://example.com/ns/credentials", original.clone());

    for _ in 0..2 {
        let report = warmer
            .warm_up(&[mapping(
                "https://example.com/ns/credentials",
                "https://example.com/credentials.jsonld",
            )])
            .await
            .expect("warm-up succeeds");

        assert_eq!(report.skipped, 1);
        assert_eq!(report.warmed, 0);
    }

    assert_eq!(
        loader.document("https://example.com/ns/credentials"),
        Some(original)
    );
    assert!(fetcher.observed_urls().is_empty());
}

#[tokio::test]
async fn https_permission_is_enabled_at_the_moment_of_fetch() {
    let fetcher = scripted(
        &[(
            "https://example.com/credentials.jsonld",
            json!({"@context": {}}),
        )],
        &[],
    );
    let loader = loader_with(&fetcher);
    assert_eq!(loader.snapshot(), PERMISSIONS_OFF);

    ContextWarmer::new(loader.clone())
        .warm_up(&[mapping(
            "https://example.com/ns/credentials",
            "https://example.com/credentials.jsonld",
        )])
        .await
        .expect("warm-up succeeds");

    let observed = fetcher.observed.lock().unwrap();
    assert_eq!(observed.len(), 1);
    let at_fetch = observed[0].permissions.expect("loader attached");
    assert!(at_fetch.https);
    assert!(!at_fetch.http);
    assert!(!at_fetch.file);
    drop(observed);

    assert_eq!(loader.snapshot(), PERMISSIONS_OFF);
}

#[tokio::test]
async fn fetches_request_the_json_ld_context_profile() {
    let fetcher = scripted(
        &[(
            "https://example.com/credentials.jsonld",
            json!({"@context": {}}),
        )],
        &[],
    );
    let loader = loader_with(&fetcher);

    ContextWarmer::new(loader)
        .warm_up(&[mapping(
            "https://example.com/ns/credentials",
            "https://example.com/credentials.jsonld",
        )])
        .await
        .expect("warm-up succeeds");

    let observed = fetcher.observed.lock().unwrap();
    assert_eq!(
        observed[0].profile.as_deref(),
        Some(JSON_LD_CONTEXT_PROFILE)
    );
}

#[tokio::test]
async fn malformed_target_aborts_the_pass_and_still_restores() {
    let fetcher = scripted(
        &[
            ("https://example.com/first.jsonld", json!({"@context": {}})),
            ("https://example.com/last.jsonld", json!({"@context": {}})),
        ],
        &[],
    );
    let loader = loader_with(&fetcher);
    let warmer = ContextWarmer::new(loader.clone());

    let result = warmer
        .warm_up(&[
            mapping("https://example.com/ns/first", "https://example.com/first.jsonld"),
            mapping("https://example.com/ns/broken", "not a url"),
            mapping("https://example.com/ns/last", "https://example.com/last.jsonld"),
        ])
        .await;

    match result {
        Err(WarmupError::InvalidTarget { target, .. }) => assert_eq!(target, "not a url"),
        other => panic!("unexpected result: {other:?}"),
    }

    assert!(loader.document("https://example.com/ns/first").is_some());
    assert!(loader.document("https://example.com/ns/last").is_none());
    assert_eq!(
        fetcher.observed_urls(),
        vec!["https://example.com/first.jsonld"]
    );
    assert_eq!(loader.snapshot(), PERMISSIONS_OFF);
}

#[tokio::test]
async fn one_failing_fetch_does_not_stop_the_rest() {
    let fetcher = scripted(
        &[(
            "https://example.com/reachable.jsonld",
            json!({"@context": {}}),
        )],
        &["https://example.com/unreachable.jsonld"],
    );
    let loader = loader_with(&fetcher);

    let report = ContextWarmer::new(loader.clone())
        .warm_up(&[
            mapping(
                "https://example.com/ns/unreachable",
                "https://example.com/unreachable.jsonld",
            ),
            mapping(
                "https://example.com/ns/reachable",
                "https://example.com/reachable.jsonld",
            ),
        ])
        .await
        .expect("warm-up tolerates the failure");

    assert_eq!(report.failed, 1);
    assert_eq!(report.warmed, 1);
    assert!(loader.document("https://example.com/ns/unreachable").is_none());
    assert!(loader.document("https://example.com/ns/reachable").is_some());
}

#[tokio::test]
async fn non_context_documents_are_skipped_recoverably() {
    let fetcher = scripted(
        &[("https://example.com/scalar.jsonld", json!("not a context"))],
        &[],
    );
    let loader = loader_with(&fetcher);

    let report = ContextWarmer::new(loader.clone())
        .warm_up(&[mapping(
            "https://example.com/ns/scalar",
            "https://example.com/scalar.jsonld",
        )])
        .await
        .expect("warm-up tolerates the shape mismatch");

    assert_eq!(report.failed, 1);
    assert!(loader.document("https://example.com/ns/scalar").is_none());
}

#[tokio::test]
async fn unrecognized_scheme_entries_fail_recoverably() {
    let fetcher = scripted(
        &[(
            "https://example.com/reachable.jsonld",
            json!({"@context": {}}),
        )],
        &[],
    );
    let loader = loader_with(&fetcher);

    let report = ContextWarmer::new(loader.clone())
        .warm_up(&[
            mapping("https://example.com/ns/ftp", "ftp://example.com/context.jsonld"),
            mapping(
                "https://example.com/ns/reachable",
                "https://example.com/reachable.jsonld",
            ),
        ])
        .await
        .expect("warm-up tolerates the unrecognized scheme");

    assert_eq!(report.failed, 1);
    assert_eq!(report.warmed, 1);
    assert_eq!(loader.snapshot(), PERMISSIONS_OFF);
}

#[tokio::test]
async fn pwd_placeholder_is_substituted_before_parsing() {
    let pwd = std::env::current_dir()
        .expect("working directory resolves")
        .display()
        .to_string()
        .replace(' ', "%20");
    let expected = Url::parse(&format!("file:{pwd}/contexts/example.jsonld"))
        .expect("substituted target parses");

    let fetcher = scripted(&[(expected.as_str(), json!({"@context": {}}))], &[]);
    let loader = loader_with(&fetcher);

    let report = ContextWarmer::new(loader.clone())
        .warm_up(&[mapping(
            "https://example.com/ns/local",
            "file:%PWD%/contexts/example.jsonld",
        )])
        .await
        .expect("warm-up succeeds");

    assert_eq!(report.warmed, 1);
    assert_eq!(fetcher.observed_urls(), vec![expected.to_string()]);
    assert_eq!(loader.snapshot(), PERMISSIONS_OFF);
}
