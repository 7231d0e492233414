use anyhow::Context;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};

use crate::enrichment::{http_client, SummarySource};

pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateContentRequest {
    fn summary_prompt(title: &str, authors: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: format!(
                        "Summarize the book \"{title}\" by {authors} in 5 sentences or less."
                    ),
                }],
            }],
        }
    }
}

impl GenerateContentResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Asks the Gemini generateContent API for a short summary of the book.
/// Without an api key no request is made and no summary is returned.
pub struct GeminiSummarySource {
    url: String,
    api_key: Option<String>,
    client: ClientWithMiddleware,
}

impl GeminiSummarySource {
    pub fn new(url: &str, api_key: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            api_key,
            client: http_client(false)?,
        })
    }
}

#[async_trait::async_trait]
impl SummarySource for GeminiSummarySource {
    async fn summarize(&self, title: &str, authors: &str) -> anyhow::Result<Option<String>> {
        let Some(api_key) = &self.api_key else {
            tracing::debug!("No summary api key configured, skipping summary of {}", title);
            return Ok(None);
        };

        let response: GenerateContentResponse = self
            .client
            .post(format!("{}/models/{}:generateContent", self.url, MODEL))
            .header("x-goog-api-key", api_key)
            .json(&GenerateContentRequest::summary_prompt(title, authors))
            .send()
            .await
            .context("Failed to call summary api")?
            .error_for_status()
            .context("Summary api returned an error")?
            .json()
            .await
            .context("Failed to decode summary api response")?;

        Ok(response.into_text())
    }
}
