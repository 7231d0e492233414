use anyhow::{bail, Context};
use library_common::http_errors::ErrorResponse;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::api::{
    NewRatingRequest, RatingAverage, RatingPatch, RatingRecord, RatingSubmission,
    RatingValue, TopRatedBook,
};

async fn error_message(response: reqwest::Response) -> String {
    response
        .json::<ErrorResponse>()
        .await
        .map(|body| body.error)
        .unwrap_or_default()
}

pub struct LibraryRatingsClient {
    url: String,
    client: ClientWithMiddleware,
}

impl LibraryRatingsClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Calls POST /ratings endpoint
    /// Returns false if the rating already existed
    pub async fn create_rating(&self, id: &str, title: &str) -> anyhow::Result<bool> {
        let response = self
            .client
            .post(format!("{}/ratings", self.url))
            .json(&NewRatingRequest {
                id: id.to_string(),
                title: title.to_string(),
            })
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            Ok(false)
        } else if response.status().is_success() {
            Ok(true)
        } else {
            bail!("Failed to create rating {}", error_message(response).await)
        }
    }

    /// Calls GET /ratings/{id} endpoint
    /// Returns None if there is no rating for the book
    pub async fn get_rating(&self, id: &str) -> anyhow::Result<Option<RatingRecord>> {
        let response = self
            .client
            .get(format!("{}/ratings/{}", self.url, id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else if response.status().is_success() {
            Ok(Some(response.json().await?))
        } else {
            bail!("Failed to get rating {}", error_message(response).await)
        }
    }

    /// Calls GET /ratings endpoint
    pub async fn list_ratings(&self) -> anyhow::Result<Vec<RatingRecord>> {
        let response = self
            .client
            .get(format!("{}/ratings", self.url))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            bail!("Failed to list ratings {}", error_message(response).await)
        }
    }

    /// Calls POST /ratings/{id} endpoint
    /// Returns the new average of the book
    pub async fn submit_value(&self, id: &str, value: RatingValue) -> anyhow::Result<f64> {
        let response = self
            .client
            .post(format!("{}/ratings/{}", self.url, id))
            .json(&RatingSubmission { value })
            .send()
            .await?;
        if response.status().is_success() {
            let average: RatingAverage = response.json().await?;
            Ok(average.average)
        } else {
            bail!("Failed to submit rating {}", error_message(response).await)
        }
    }

    /// Calls PUT /ratings/{id} endpoint
    /// Returns false if there is no rating for the book
    pub async fn update_rating(&self, id: &str, patch: RatingPatch) -> anyhow::Result<bool> {
        let response = self
            .client
            .put(format!("{}/ratings/{}", self.url, id))
            .json(&patch)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(false)
        } else if response.status().is_success() {
            Ok(true)
        } else {
            bail!("Failed to update rating {}", error_message(response).await)
        }
    }

    /// Calls DELETE /ratings/{id} endpoint
    /// Returns false if there was no rating for the book
    pub async fn delete_rating(&self, id: &str) -> anyhow::Result<bool> {
        let response = self
            .client
            .delete(format!("{}/ratings/{}", self.url, id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(false)
        } else if response.status().is_success() {
            Ok(true)
        } else {
            bail!("Failed to delete rating {}", error_message(response).await)
        }
    }

    /// Calls GET /top endpoint
    pub async fn top_rated(&self) -> anyhow::Result<Vec<TopRatedBook>> {
        let response = self
            .client
            .get(format!("{}/top", self.url))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            bail!("Failed to get top rated {}", error_message(response).await)
        }
    }
}
