use anyhow::{bail, Context};
use library_common::http_errors::ErrorResponse;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::api::{LoanFilter, LoanRecord, NewLoanRequest};

/// Outcome of a loan request the service answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanOutcome {
    Created(LoanRecord),
    /// Book not in the catalogue
    BookNotFound,
    /// ISBN on loan or member at the limit, with the reason given by the service
    Rejected(String),
}

pub struct LibraryLoansClient {
    url: String,
    client: ClientWithMiddleware,
}

async fn error_message(response: reqwest::Response) -> String {
    response
        .json::<ErrorResponse>()
        .await
        .map(|body| body.error)
        .unwrap_or_default()
}

impl LibraryLoansClient {
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

    /// Calls POST /loans endpoint
    pub async fn create_loan(&self, request: &NewLoanRequest) -> anyhow::Result<LoanOutcome> {
        let response = self
            .client
            .post(format!("{}/loans", self.url))
            .json(request)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(LoanOutcome::BookNotFound),
            StatusCode::CONFLICT => Ok(LoanOutcome::Rejected(error_message(response).await)),
            status if status.is_success() => Ok(LoanOutcome::Created(response.json().await?)),
            status => bail!(
                "Failed to create loan ({}) {}",
                status,
                error_message(response).await
            ),
        }
    }

    /// Calls GET /loans endpoint with the filter as query
    pub async fn list_loans(&self, filter: &LoanFilter) -> anyhow::Result<Vec<LoanRecord>> {
        let response = self
            .client
            .get(format!("{}/loans", self.url))
            .query(filter)
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            bail!("Failed to list loans {}", error_message(response).await)
        }
    }

    /// Calls DELETE /loans/{id} endpoint
    /// Returns false if there was no such loan
    pub async fn return_loan(&self, loan_id: &str) -> anyhow::Result<bool> {
        let response = self
            .client
            .delete(format!("{}/loans/{}", self.url, loan_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(false)
        } else if response.status().is_success() {
            Ok(true)
        } else {
            bail!("Failed to return loan {}", error_message(response).await)
        }
    }
}
