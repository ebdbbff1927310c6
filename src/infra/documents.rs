//! JSON-LD document values and the fetch collaborator seam.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Media profile identifying JSON-LD context documents.
pub const JSON_LD_CONTEXT_PROFILE: &str = "http://www.w3.org/ns/json-ld#context";

/// A parsed context document. The root must be a JSON object or array;
/// scalar documents are not usable as JSON-LD contexts.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonDocument {
    content: Value,
}

impl JsonDocument {
    pub fn parse(bytes: &[u8]) -> Result<Self, FetchError> {
        let content: Value = serde_json::from_slice(bytes).map_err(|err| {
            FetchError::UnexpectedFormat {
                detail: err.to_string(),
            }
        })?;
        Self::from_value(content)
    }

    pub fn from_value(content: Value) -> Result<Self, FetchError> {
        if !(content.is_object() || content.is_array()) {
            return Err(FetchError::UnexpectedFormat {
                detail: "document root is not an object or array".to_string(),
            });
        }
        Ok(Self { content })
    }

    pub fn content(&self) -> &Value {
        &self.content
    }
}

/// Fetch options carried to the document-loading collaborator.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub profile: Option<String>,
    pub request_profile: Vec<String>,
}

impl LoadOptions {
    /// Options requesting the JSON-LD context profile specifically.
    pub fn json_ld_context() -> Self {
        Self {
            profile: Some(JSON_LD_CONTEXT_PROFILE.to_string()),
            request_profile: vec![JSON_LD_CONTEXT_PROFILE.to_string()],
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected status {status} from remote host")]
    Status { status: u16 },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("document is not a json-ld context: {detail}")]
    UnexpectedFormat { detail: String },
    #[error("no fetch backend for scheme `{scheme}`")]
    UnsupportedScheme { scheme: String },
}

/// Retrieval backend for context documents.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, target: &Url, options: &LoadOptions)
    -> Result<JsonDocument, FetchError>;
}
