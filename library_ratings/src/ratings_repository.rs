pub use in_memory_ratings_repository::InMemoryRatingsRepository;
pub use postgres_ratings_repository::PostgresRatingsRepository;

use crate::api::{BookId, NewRatingRequest, RatingPatch, RatingRecord, RatingValue};

mod in_memory_ratings_repository;
mod postgres_ratings_repository;

#[derive(thiserror::Error, Debug)]
pub enum RatingsRepositoryError {
    #[error("No rating exists for book {0}")]
    NotFound(BookId),

    #[error("Rating for book {0} already exists")]
    AlreadyExists(BookId),

    #[error("DatabaseFailure failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),
}

#[async_trait::async_trait]
pub trait RatingsRepository: Send + Sync {
    /// Registers an empty rating record for the book
    async fn create_rating(&self, request: NewRatingRequest) -> Result<(), RatingsRepositoryError>;
    /// Appends a value and returns the record with its recomputed average,
    /// the append and the new average are stored as one write
    async fn add_value(
        &self,
        book_id: BookId,
        value: RatingValue,
    ) -> Result<RatingRecord, RatingsRepositoryError>;
    /// Applies the patch, returns false if the rating was not found
    async fn update_rating(
        &self,
        book_id: BookId,
        patch: RatingPatch,
    ) -> Result<bool, RatingsRepositoryError>;
    async fn get_rating(&self, book_id: BookId) -> Result<RatingRecord, RatingsRepositoryError>;
    async fn list_ratings(&self) -> Result<Vec<RatingRecord>, RatingsRepositoryError>;
    /// Removes the rating record, returns false if it was not found
    async fn delete_rating(&self, book_id: BookId) -> Result<bool, RatingsRepositoryError>;
}
