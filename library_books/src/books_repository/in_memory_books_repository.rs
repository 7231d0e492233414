use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde_json::json;

use crate::api::{BookDetails, BookDetailsPatch, BookFilter, BookId};
use crate::books_repository::{BookRepository, BookRepositoryError};

#[derive(Default)]
pub struct InMemoryBookRepository {
    books: parking_lot::RwLock<HashMap<BookId, BookDetails>>,
}

#[async_trait::async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn add_book(&self, details: BookDetails) -> Result<BookId, BookRepositoryError> {
        match self.books.write().entry(details.id.clone()) {
            Entry::Occupied(occupied) => {
                Err(BookRepositoryError::AlreadyExists(occupied.key().clone()))
            }
            Entry::Vacant(entry) => {
                let id = entry.key().clone();
                entry.insert(details);
                Ok(id)
            }
        }
    }

    async fn contains_book(&self, book_id: &str) -> Result<bool, BookRepositoryError> {
        Ok(self.books.read().contains_key(book_id))
    }

    async fn update_book(
        &self,
        book_id: BookId,
        patch: BookDetailsPatch,
    ) -> Result<bool, BookRepositoryError> {
        let mut locked_books = self.books.write();
        if let Some(book) = locked_books.get_mut(&book_id) {
            let mut result_book = json!(book);
            json_patch::merge(&mut result_book, &json!(patch));
            let result_book: BookDetails = serde_json::from_value(result_book)?;
            *book = result_book;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn get_book(&self, book_id: BookId) -> Result<BookDetails, BookRepositoryError> {
        self.books
            .read()
            .get(&book_id)
            .cloned()
            .ok_or(BookRepositoryError::NotFound(book_id))
    }

    async fn delete_book(&self, book_id: BookId) -> Result<bool, BookRepositoryError> {
        Ok(self.books.write().remove(&book_id).is_some())
    }

    async fn list_books(&self, filter: &BookFilter) -> Result<Vec<BookDetails>, BookRepositoryError> {
        Ok(self
            .books
            .read()
            .values()
            .filter(|book| filter.matches(book))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod in_memory_book_repository_tests {
    use crate::api::{BookDetails, BookDetailsPatch, BookFilter, MISSING};
    use crate::books_repository::{BookRepository, BookRepositoryError, InMemoryBookRepository};

    fn book(isbn: &str, title: &str) -> BookDetails {
        BookDetails {
            id: isbn.to_string(),
            title: title.to_string(),
            authors: "Isaac Asimov".to_string(),
            isbn: isbn.to_string(),
            publisher: "Spectra".to_string(),
            published_date: "1991".to_string(),
            genre: "Science Fiction".to_string(),
            language: vec!["eng".to_string()],
            summary: MISSING.to_string(),
        }
    }

    #[tokio::test]
    /// Tests if add_book and get_book work correctly, ISBN is the key so adding twice fails
    async fn test_add_book_and_get_it() {
        let repo = InMemoryBookRepository::default();

        let book_not_found = repo.get_book("9780553294385".to_string()).await;
        assert!(matches!(
            book_not_found,
            Err(BookRepositoryError::NotFound(..))
        ));
        assert!(!repo.contains_book("9780553294385").await.unwrap());

        let book_details = book("9780553294385", "I, Robot");
        let id = repo
            .add_book(book_details.clone())
            .await
            .expect("Failed to add book");
        assert_eq!(id, "9780553294385");
        assert!(repo.contains_book("9780553294385").await.unwrap());

        let details = repo.get_book(id).await.expect("Failed to get book");
        assert_eq!(details, book_details);

        let duplicate = repo.add_book(book("9780553294385", "Other")).await;
        assert!(matches!(
            duplicate,
            Err(BookRepositoryError::AlreadyExists(..))
        ));
        assert_eq!(
            repo.get_book("9780553294385".to_string()).await.unwrap(),
            book_details
        );
    }

    #[tokio::test]
    /// Tests if list_books works correctly with and without filters
    async fn test_add_books_and_list_them() {
        let repo = InMemoryBookRepository::default();

        let list = repo
            .list_books(&BookFilter::default())
            .await
            .expect("Failed to list books");
        assert_eq!(list, vec![]);

        let robot = book("9780553294385", "I, Robot");
        let foundation = BookDetails {
            genre: "Fiction".to_string(),
            ..book("9780553293364", "Second Foundation")
        };
        repo.add_book(robot.clone()).await.unwrap();
        repo.add_book(foundation.clone()).await.unwrap();

        let mut list = repo.list_books(&BookFilter::default()).await.unwrap();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(list, vec![foundation.clone(), robot.clone()]);

        let by_isbn = repo
            .list_books(&BookFilter::by_isbn("9780553294385"))
            .await
            .unwrap();
        assert_eq!(by_isbn, vec![robot]);

        let by_genre = repo
            .list_books(&BookFilter {
                genre: Some("Fiction".to_string()),
                ..BookFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(by_genre, vec![foundation]);
    }

    #[tokio::test]
    /// Tests that patches change only the given fields and delete removes the book
    async fn test_add_book_patch_and_delete_it() {
        let repo = InMemoryBookRepository::default();
        let result = repo
            .update_book("unknown".to_string(), BookDetailsPatch::default())
            .await
            .expect("Failed to update");
        // false means nothing to update
        assert!(!result);

        let book_details = book("9780553294385", "I, Robot");
        let id = repo.add_book(book_details.clone()).await.unwrap();

        let patch_title_and_language = BookDetailsPatch {
            title: Some("patchedTitle".to_string()),
            language: Some(vec!["eng".to_string(), "ger".to_string()]),
            ..BookDetailsPatch::default()
        };
        let patch_result = repo
            .update_book(id.clone(), patch_title_and_language)
            .await
            .expect("Failed to patch");
        assert!(patch_result);

        let expected_after_patch = BookDetails {
            title: "patchedTitle".to_string(),
            language: vec!["eng".to_string(), "ger".to_string()],
            ..book_details
        };
        assert_eq!(repo.get_book(id.clone()).await.unwrap(), expected_after_patch);

        assert!(repo.delete_book(id.clone()).await.unwrap());
        assert!(!repo.delete_book(id.clone()).await.unwrap());
        assert!(matches!(
            repo.get_book(id).await,
            Err(BookRepositoryError::NotFound(..))
        ));
    }
}
