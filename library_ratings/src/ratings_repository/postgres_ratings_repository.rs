use library_common::postgres::{connect, is_unique_violation, PostgresConfig};
use tokio_postgres::{Client, Row, Statement};

use crate::api::{BookId, NewRatingRequest, RatingPatch, RatingRecord, RatingValue};
use crate::ratings_repository::{RatingsRepository, RatingsRepositoryError};

const SCHEMA: &str = "
        CREATE TABLE IF NOT EXISTS ratings (
            id              TEXT PRIMARY KEY,
            title           TEXT NOT NULL,
            rating_values   INTEGER[] NOT NULL DEFAULT '{}'
            )
        ";

pub struct PostgresRatingsRepository {
    client: Client,
}

impl PostgresRatingsRepository {
    pub async fn init(config: PostgresConfig) -> anyhow::Result<Self> {
        let client = connect(&config, &[SCHEMA]).await?;
        Ok(Self { client })
    }
}

fn record_from_row(row: &Row) -> Result<RatingRecord, RatingsRepositoryError> {
    Ok(RatingRecord::from_values(
        row.try_get(0)?,
        row.try_get(1)?,
        row.try_get(2)?,
    ))
}

#[async_trait::async_trait]
impl RatingsRepository for PostgresRatingsRepository {
    async fn create_rating(&self, request: NewRatingRequest) -> Result<(), RatingsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("INSERT INTO ratings (id, title) VALUES ($1, $2)")
            .await?;

        match self
            .client
            .execute(&stmt, &[&request.id, &request.title])
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(RatingsRepositoryError::AlreadyExists(request.id))
            }
            Err(other_err) => Err(other_err.into()),
        }
    }

    async fn add_value(
        &self,
        book_id: BookId,
        value: RatingValue,
    ) -> Result<RatingRecord, RatingsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "UPDATE ratings SET rating_values = array_append(rating_values, $2) \
                 WHERE id = $1 RETURNING id, title, rating_values",
            )
            .await?;

        let rows = self.client.query(&stmt, &[&book_id, &value]).await?;
        record_from_row(
            rows.first()
                .ok_or_else(|| RatingsRepositoryError::NotFound(book_id))?,
        )
    }

    async fn update_rating(
        &self,
        book_id: BookId,
        patch: RatingPatch,
    ) -> Result<bool, RatingsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("UPDATE ratings SET title = COALESCE($2, title) WHERE id = $1 RETURNING id")
            .await?;

        let rows = self
            .client
            .query(&stmt, &[&book_id, &patch.title])
            .await?;
        Ok(!rows.is_empty())
    }

    async fn get_rating(&self, book_id: BookId) -> Result<RatingRecord, RatingsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT id, title, rating_values FROM ratings WHERE id = $1")
            .await?;

        let rows = self.client.query(&stmt, &[&book_id]).await?;
        record_from_row(
            rows.first()
                .ok_or_else(|| RatingsRepositoryError::NotFound(book_id))?,
        )
    }

    async fn list_ratings(&self) -> Result<Vec<RatingRecord>, RatingsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT id, title, rating_values FROM ratings")
            .await?;

        let rows = self.client.query(&stmt, &[]).await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn delete_rating(&self, book_id: BookId) -> Result<bool, RatingsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("DELETE FROM ratings WHERE id = $1 RETURNING id")
            .await?;

        let rows = self.client.query(&stmt, &[&book_id]).await?;
        Ok(!rows.is_empty())
    }
}

#[cfg(all(test, feature = "postgres_tests"))]
mod postgres_ratings_repository_tests {
    use serial_test::file_serial;
    use testcontainers::core::IntoContainerPort;
    use testcontainers::runners::AsyncRunner;
    use testcontainers::{ContainerAsync, GenericImage, ImageExt};

    use super::*;

    async fn start_postgres_container_and_init_repo(
    ) -> (ContainerAsync<GenericImage>, PostgresRatingsRepository) {
        let pg_container = GenericImage::new("postgres", "latest")
            .with_mapped_port(5432, 5432.tcp())
            .with_env_var("POSTGRES_USER", "postgres")
            .with_env_var("POSTGRES_PASSWORD", "postgres")
            .start()
            .await
            .expect("Failed to start postgres");

        for _ in 0..10 {
            if let Ok(repo) = PostgresRatingsRepository::init(PostgresConfig {
                hostname: "127.0.0.1".to_string(),
                username: "postgres".to_string(),
                password: "postgres".to_string(),
            })
            .await
            {
                return (pg_container, repo);
            }
            tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        }
        panic!("Failed to setup postgres container")
    }

    #[tokio::test]
    #[file_serial(key, path => "../.pgtestslock")]
    /// Covers the whole rating lifecycle in one testcase to start the container once
    async fn test_rating_lifecycle() {
        let (_container, repo) = start_postgres_container_and_init_repo().await;

        assert!(matches!(
            repo.get_rating("isbn1".to_string()).await,
            Err(RatingsRepositoryError::NotFound(..))
        ));

        repo.create_rating(NewRatingRequest {
            id: "isbn1".to_string(),
            title: "Title".to_string(),
        })
        .await
        .expect("Failed to create rating");

        let duplicate = repo
            .create_rating(NewRatingRequest {
                id: "isbn1".to_string(),
                title: "Title".to_string(),
            })
            .await;
        assert!(matches!(
            duplicate,
            Err(RatingsRepositoryError::AlreadyExists(..))
        ));

        for value in [5, 5, 5, 5] {
            repo.add_value("isbn1".to_string(), value).await.unwrap();
        }
        let record = repo.add_value("isbn1".to_string(), 1).await.unwrap();
        assert_eq!(record.average, 4.2);
        assert_eq!(record.values, vec![5, 5, 5, 5, 1]);

        assert!(repo
            .update_rating(
                "isbn1".to_string(),
                RatingPatch {
                    title: Some("Renamed".to_string())
                }
            )
            .await
            .unwrap());
        let record = repo.get_rating("isbn1".to_string()).await.unwrap();
        assert_eq!(record.title, "Renamed");
        assert_eq!(repo.list_ratings().await.unwrap(), vec![record]);

        assert!(repo.delete_rating("isbn1".to_string()).await.unwrap());
        assert!(!repo.delete_rating("isbn1".to_string()).await.unwrap());
    }
}
