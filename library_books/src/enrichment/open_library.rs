use anyhow::Context;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use crate::enrichment::{http_client, LanguageSource};

pub const OPEN_LIBRARY_URL: &str = "https://openlibrary.org";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    language: Option<Vec<String>>,
}

impl SearchResponse {
    fn into_languages(self) -> Option<Vec<String>> {
        self.docs.into_iter().next().and_then(|doc| doc.language)
    }
}

/// Looks up the languages of an edition in the OpenLibrary search API
pub struct OpenLibrarySource {
    url: String,
    client: ClientWithMiddleware,
}

impl OpenLibrarySource {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            client: http_client(true)?,
        })
    }
}

#[async_trait::async_trait]
impl LanguageSource for OpenLibrarySource {
    async fn lookup_languages(&self, isbn: &str) -> anyhow::Result<Option<Vec<String>>> {
        let response: SearchResponse = self
            .client
            .get(format!("{}/search.json", self.url))
            .query(&[("q", isbn), ("fields", "language")])
            .send()
            .await
            .context("Failed to call OpenLibrary")?
            .error_for_status()
            .context("OpenLibrary returned an error")?
            .json()
            .await
            .context("Failed to decode OpenLibrary response")?;

        Ok(response.into_languages())
    }
}
