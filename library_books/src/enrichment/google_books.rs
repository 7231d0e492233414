use anyhow::Context;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use crate::enrichment::{http_client, MetadataSource, VolumeInfo};

pub const GOOGLE_BOOKS_URL: &str = "https://www.googleapis.com/books/v1";

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    #[serde(default)]
    volume_info: VolumeInfoResponse,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfoResponse {
    authors: Option<Vec<String>>,
    publisher: Option<String>,
    published_date: Option<String>,
}

impl VolumesResponse {
    fn into_first_volume(self) -> Option<VolumeInfo> {
        self.items.into_iter().next().map(|volume| VolumeInfo {
            authors: volume.volume_info.authors,
            publisher: volume.volume_info.publisher,
            published_date: volume.volume_info.published_date,
        })
    }
}

/// Looks up authors, publisher and publication date in the Google Books volumes API
pub struct GoogleBooksSource {
    url: String,
    client: ClientWithMiddleware,
}

impl GoogleBooksSource {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            client: http_client(true)?,
        })
    }
}

#[async_trait::async_trait]
impl MetadataSource for GoogleBooksSource {
    async fn lookup_volume(&self, isbn: &str) -> anyhow::Result<Option<VolumeInfo>> {
        let response: VolumesResponse = self
            .client
            .get(format!("{}/volumes", self.url))
            .query(&[("q", format!("isbn:{isbn}"))])
            .send()
            .await
            .context("Failed to call Google Books")?
            .error_for_status()
            .context("Google Books returned an error")?
            .json()
            .await
            .context("Failed to decode Google Books response")?;

        Ok(response.into_first_volume())
    }
}

#[cfg(test)]
mod google_books_tests {
    use super::*;

    #[test]
    fn test_first_volume_is_used() {
        let response: VolumesResponse = serde_json::from_str(
            r#"{
                "kind": "books#volumes",
                "totalItems": 2,
                "items": [
                    {"volumeInfo": {"title": "I, Robot", "authors": ["Isaac Asimov"], "publisher": "Spectra", "publishedDate": "1991"}},
                    {"volumeInfo": {"title": "Other", "authors": ["Someone"]}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(
            response.into_first_volume(),
            Some(VolumeInfo {
                authors: Some(vec!["Isaac Asimov".to_string()]),
                publisher: Some("Spectra".to_string()),
                published_date: Some("1991".to_string()),
            })
        );
    }

    #[test]
    fn test_no_items_means_no_volume() {
        let response: VolumesResponse =
            serde_json::from_str(r#"{"kind": "books#volumes", "totalItems": 0}"#).unwrap();
        assert_eq!(response.into_first_volume(), None);

        let partial: VolumesResponse =
            serde_json::from_str(r#"{"totalItems": 1, "items": [{"volumeInfo": {}}]}"#).unwrap();
        assert_eq!(partial.into_first_volume(), Some(VolumeInfo::default()));
    }
}
