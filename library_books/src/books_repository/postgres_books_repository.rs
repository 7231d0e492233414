use library_common::postgres::{connect, PostgresConfig};
use serde_json::json;
use tokio_postgres::{Client, Statement};

use crate::api::{BookDetails, BookDetailsPatch, BookFilter, BookId};
use crate::books_repository::{BookRepository, BookRepositoryError};

const SCHEMA: &str = "
        CREATE TABLE IF NOT EXISTS books (
            id              TEXT PRIMARY KEY,
            params          JSONB NOT NULL
            )
        ";

pub struct PostgresBooksRepository {
    client: Client,
}

impl PostgresBooksRepository {
    pub async fn init(config: PostgresConfig) -> anyhow::Result<Self> {
        let client = connect(&config, &[SCHEMA]).await?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl BookRepository for PostgresBooksRepository {
    async fn add_book(&self, details: BookDetails) -> Result<BookId, BookRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "INSERT INTO books (id, params) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING RETURNING id",
            )
            .await?;

        let rows = self
            .client
            .query(&stmt, &[&details.id, &json!(details)])
            .await?;

        match rows.first() {
            Some(row) => Ok(row.try_get(0)?),
            None => Err(BookRepositoryError::AlreadyExists(details.id)),
        }
    }

    async fn contains_book(&self, book_id: &str) -> Result<bool, BookRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .await?;

        let rows = self.client.query(&stmt, &[&book_id]).await?;
        Ok(rows
            .first()
            .ok_or_else(|| BookRepositoryError::Other("Exists not returned".to_string()))?
            .try_get(0)?)
    }

    async fn update_book(
        &self,
        book_id: BookId,
        patch: BookDetailsPatch,
    ) -> Result<bool, BookRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("UPDATE books SET params = params || ($1)::JSONB WHERE id = ($2) RETURNING id")
            .await?;

        let rows = self.client.query(&stmt, &[&json!(patch), &book_id]).await?;
        Ok(!rows.is_empty())
    }

    async fn get_book(&self, book_id: BookId) -> Result<BookDetails, BookRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT params FROM books WHERE id = ($1)")
            .await?;

        let rows = self.client.query(&stmt, &[&book_id]).await?;

        let details: serde_json::Value = rows
            .first()
            .ok_or_else(|| BookRepositoryError::NotFound(book_id))?
            .try_get(0)?;

        Ok(serde_json::from_value(details)?)
    }

    async fn delete_book(&self, book_id: BookId) -> Result<bool, BookRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("DELETE FROM books WHERE id = ($1) RETURNING id")
            .await?;

        let rows = self.client.query(&stmt, &[&book_id]).await?;
        Ok(!rows.is_empty())
    }

    async fn list_books(&self, filter: &BookFilter) -> Result<Vec<BookDetails>, BookRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT params FROM books WHERE params @> ($1)::JSONB ORDER BY id")
            .await?;

        let rows = self
            .client
            .query(&stmt, &[&filter.containment_document()])
            .await?;

        rows.iter()
            .map(|row| {
                let details: serde_json::Value = row.try_get(0)?;
                Ok(serde_json::from_value(details)?)
            })
            .collect()
    }
}
