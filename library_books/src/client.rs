use anyhow::{bail, Context};
use library_common::http_errors::ErrorResponse;
use reqwest::header::LOCATION;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::api::{BookDetails, BookDetailsPatch, BookFilter, BookId, NewBookRequest};

async fn error_message(response: reqwest::Response) -> String {
    response
        .json::<ErrorResponse>()
        .await
        .map(|body| body.error)
        .unwrap_or_default()
}

pub struct LibraryBooksClient {
    url: String,
    client: ClientWithMiddleware,
}

impl LibraryBooksClient {
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

    /// Calls POST /books endpoint
    /// Returns the id of the new book taken from the Location header
    pub async fn add_book(&self, request: &NewBookRequest) -> anyhow::Result<BookId> {
        let response = self
            .client
            .post(format!("{}/books", self.url))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!(
                "Failed to add book ({}) {}",
                response.status(),
                error_message(response).await
            )
        }
        let location = response
            .headers()
            .get(LOCATION)
            .context("Missing Location header")?
            .to_str()
            .context("Invalid Location header")?;
        location
            .strip_prefix("/books/")
            .map(str::to_string)
            .with_context(|| format!("Unexpected Location {location}"))
    }

    /// Calls GET /books/{id} endpoint
    /// Returns None if there is no such book
    pub async fn get_book(&self, book_id: &str) -> anyhow::Result<Option<BookDetails>> {
        let response = self
            .client
            .get(format!("{}/books/{}", self.url, book_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else if response.status().is_success() {
            Ok(Some(response.json().await?))
        } else {
            bail!("Failed to get book {}", error_message(response).await)
        }
    }

    /// Calls GET /books endpoint with the filter as query
    pub async fn list_books(&self, filter: &BookFilter) -> anyhow::Result<Vec<BookDetails>> {
        let response = self
            .client
            .get(format!("{}/books", self.url))
            .query(filter)
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            bail!("Failed to list books {}", error_message(response).await)
        }
    }

    /// Calls PUT /books/{id} endpoint
    /// Returns false if there is no such book
    pub async fn update_book(
        &self,
        book_id: &str,
        patch: &BookDetailsPatch,
    ) -> anyhow::Result<bool> {
        let response = self
            .client
            .put(format!("{}/books/{}", self.url, book_id))
            .json(patch)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(false)
        } else if response.status().is_success() {
            Ok(true)
        } else {
            bail!("Failed to update book {}", error_message(response).await)
        }
    }

    /// Calls DELETE /books/{id} endpoint
    /// Returns false if there was no such book
    pub async fn delete_book(&self, book_id: &str) -> anyhow::Result<bool> {
        let response = self
            .client
            .delete(format!("{}/books/{}", self.url, book_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(false)
        } else if response.status().is_success() {
            Ok(true)
        } else {
            bail!("Failed to delete book {}", error_message(response).await)
        }
    }
}
