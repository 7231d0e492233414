use std::sync::Arc;

use anyhow::Context;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use reqwest_tracing::TracingMiddleware;

pub use gemini::{GeminiSummarySource, GEMINI_URL};
pub use google_books::{GoogleBooksSource, GOOGLE_BOOKS_URL};
pub use open_library::{OpenLibrarySource, OPEN_LIBRARY_URL};

use crate::api::{BookDetails, NewBookRequest, MISSING};

mod gemini;
mod google_books;
mod open_library;

const MAX_RETRIES: u32 = 2;

/// Publication metadata of a volume, absent fields were not known upstream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeInfo {
    pub authors: Option<Vec<String>>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
}

#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync {
    /// Returns None when the source knows no volume with the ISBN
    async fn lookup_volume(&self, isbn: &str) -> anyhow::Result<Option<VolumeInfo>>;
}

#[async_trait::async_trait]
pub trait LanguageSource: Send + Sync {
    async fn lookup_languages(&self, isbn: &str) -> anyhow::Result<Option<Vec<String>>>;
}

#[async_trait::async_trait]
pub trait SummarySource: Send + Sync {
    async fn summarize(&self, title: &str, authors: &str) -> anyhow::Result<Option<String>>;
}

#[derive(thiserror::Error, Debug)]
pub enum EnrichmentError {
    #[error("No data returned from Google Books API for ISBN {0}")]
    NoMetadata(String),

    #[error("Book metadata lookup for ISBN {isbn} failed: {reason}")]
    MetadataUnavailable { isbn: String, reason: String },
}

/// Builds a full book record out of the request and the external sources.
/// Only the metadata source is required, the other lookups degrade to [`MISSING`].
pub struct BookEnricher {
    metadata: Arc<dyn MetadataSource>,
    languages: Arc<dyn LanguageSource>,
    summaries: Arc<dyn SummarySource>,
}

impl BookEnricher {
    pub fn new(
        metadata: Arc<dyn MetadataSource>,
        languages: Arc<dyn LanguageSource>,
        summaries: Arc<dyn SummarySource>,
    ) -> Self {
        Self {
            metadata,
            languages,
            summaries,
        }
    }

    pub async fn enrich(&self, request: NewBookRequest) -> Result<BookDetails, EnrichmentError> {
        let volume = self
            .metadata
            .lookup_volume(&request.isbn)
            .await
            .map_err(|err| EnrichmentError::MetadataUnavailable {
                isbn: request.isbn.clone(),
                reason: format!("{err:#}"),
            })?
            .ok_or_else(|| EnrichmentError::NoMetadata(request.isbn.clone()))?;

        let authors = volume
            .authors
            .filter(|authors| !authors.is_empty())
            .map(|authors| authors.join(" and "))
            .unwrap_or_else(|| MISSING.to_string());

        let language = match self.languages.lookup_languages(&request.isbn).await {
            Ok(Some(languages)) if !languages.is_empty() => languages,
            Ok(_) => vec![MISSING.to_string()],
            Err(err) => {
                tracing::warn!("Language lookup for {} failed {:#}", request.isbn, err);
                vec![MISSING.to_string()]
            }
        };

        let summary = match self.summaries.summarize(&request.title, &authors).await {
            Ok(Some(summary)) if !summary.trim().is_empty() => summary,
            Ok(_) => MISSING.to_string(),
            Err(err) => {
                tracing::warn!("Summary for {} failed {:#}", request.isbn, err);
                MISSING.to_string()
            }
        };

        Ok(BookDetails {
            id: request.isbn.clone(),
            title: request.title,
            authors,
            isbn: request.isbn,
            publisher: volume.publisher.unwrap_or_else(|| MISSING.to_string()),
            published_date: volume.published_date.unwrap_or_else(|| MISSING.to_string()),
            genre: request.genre,
            language,
            summary,
        })
    }
}

/// Http client with tracing, idempotent lookups also retry transient failures
pub(crate) fn http_client(retry_transient: bool) -> anyhow::Result<ClientWithMiddleware> {
    let reqwest_client = reqwest::Client::builder()
        .build()
        .context("Failed to build reqwest client")?;
    let mut builder = ClientBuilder::new(reqwest_client).with(TracingMiddleware::default());
    if retry_transient {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(MAX_RETRIES);
        builder = builder.with(RetryTransientMiddleware::new_with_policy(retry_policy));
    }
    Ok(builder.build())
}
