use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::api::{BookId, NewRatingRequest, RatingPatch, RatingRecord, RatingValue};
use crate::ratings_repository::{RatingsRepository, RatingsRepositoryError};

#[derive(Default)]
pub struct InMemoryRatingsRepository {
    ratings: parking_lot::RwLock<HashMap<BookId, RatingRecord>>,
}

#[async_trait::async_trait]
impl RatingsRepository for InMemoryRatingsRepository {
    async fn create_rating(&self, request: NewRatingRequest) -> Result<(), RatingsRepositoryError> {
        match self.ratings.write().entry(request.id) {
            Entry::Occupied(occupied) => Err(RatingsRepositoryError::AlreadyExists(
                occupied.key().clone(),
            )),
            Entry::Vacant(entry) => {
                let id = entry.key().clone();
                entry.insert(RatingRecord::new(id, request.title));
                Ok(())
            }
        }
    }

    async fn add_value(
        &self,
        book_id: BookId,
        value: RatingValue,
    ) -> Result<RatingRecord, RatingsRepositoryError> {
        let mut locked_ratings = self.ratings.write();
        let record = locked_ratings
            .get_mut(&book_id)
            .ok_or(RatingsRepositoryError::NotFound(book_id))?;
        record.push_value(value);
        Ok(record.clone())
    }

    async fn update_rating(
        &self,
        book_id: BookId,
        patch: RatingPatch,
    ) -> Result<bool, RatingsRepositoryError> {
        if let Some(record) = self.ratings.write().get_mut(&book_id) {
            if let Some(title) = patch.title {
                record.title = title;
            }
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn get_rating(&self, book_id: BookId) -> Result<RatingRecord, RatingsRepositoryError> {
        self.ratings
            .read()
            .get(&book_id)
            .cloned()
            .ok_or(RatingsRepositoryError::NotFound(book_id))
    }

    async fn list_ratings(&self) -> Result<Vec<RatingRecord>, RatingsRepositoryError> {
        Ok(self.ratings.read().values().cloned().collect())
    }

    async fn delete_rating(&self, book_id: BookId) -> Result<bool, RatingsRepositoryError> {
        Ok(self.ratings.write().remove(&book_id).is_some())
    }
}
