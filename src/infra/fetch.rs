//! Concrete document fetching over http(s) and local files.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tokio::fs;
use url::Url;

use super::documents::{DocumentFetcher, FetchError, JsonDocument, LoadOptions};

/// Default fetch backend: reqwest for network targets, the filesystem for
/// `file://` targets.
#[derive(Default)]
pub struct HttpDocumentFetcher {
    client: reqwest::Client,
}

impl HttpDocumentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn accept_header(options: &LoadOptions) -> String {
        match options.profile.as_deref() {
            Some(profile) => format!(
                "application/ld+json;profile=\"{profile}\", application/ld+json, application/json"
            ),
            None => "application/ld+json, application/json".to_string(),
        }
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch(
        &self,
        target: &Url,
        options: &LoadOptions,
    ) -> Result<JsonDocument, FetchError> {
        match target.scheme() {
            "http" | "https" => {
                let response = self
                    .client
                    .get(target.clone())
                    .header(ACCEPT, Self::accept_header(options))
                    .send()
                    .await
                    .map_err(|err| FetchError::Transport(err.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status {
                        status: status.as_u16(),
                    });
                }

                let body = response
                    .bytes()
                    .await
                    .map_err(|err| FetchError::Transport(err.to_string()))?;
                JsonDocument::parse(&body)
            }
            "file" => {
                let path = target.to_file_path().map_err(|()| {
                    FetchError::UnexpectedFormat {
                        detail: format!("`{target}` does not name a local file"),
                    }
                })?;
                let bytes = fs::read(&path).await?;
                JsonDocument::parse(&bytes)
            }
            other => Err(FetchError::UnsupportedScheme {
                scheme: other.to_string(),
            }),
        }
    }
}
