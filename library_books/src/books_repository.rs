pub use in_memory_books_repository::InMemoryBookRepository;
pub use postgres_books_repository::PostgresBooksRepository;

use crate::api::{BookDetails, BookDetailsPatch, BookFilter, BookId};

mod in_memory_books_repository;
mod postgres_books_repository;

#[derive(thiserror::Error, Debug)]
pub enum BookRepositoryError {
    #[error("No Book Exists with id: {0}")]
    NotFound(BookId),

    #[error("Book already exists with ISBN: {0}")]
    AlreadyExists(BookId),

    #[error("Failed to deserialize book: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("DatabaseFailure failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),

    #[error("Other error {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait BookRepository: Send + Sync {
    /// Adds book to repository under its id, fails if the id is taken
    async fn add_book(&self, details: BookDetails) -> Result<BookId, BookRepositoryError>;
    async fn contains_book(&self, book_id: &str) -> Result<bool, BookRepositoryError>;
    /// Updates book in the repository, returns true if book was updated and false if it was not found
    async fn update_book(
        &self,
        book_id: BookId,
        patch: BookDetailsPatch,
    ) -> Result<bool, BookRepositoryError>;
    /// Retrieves details of the book from repository
    async fn get_book(&self, book_id: BookId) -> Result<BookDetails, BookRepositoryError>;
    /// Removes the book, returns false if it was not found
    async fn delete_book(&self, book_id: BookId) -> Result<bool, BookRepositoryError>;
    /// Lists books matching the filter
    async fn list_books(&self, filter: &BookFilter) -> Result<Vec<BookDetails>, BookRepositoryError>;
}
