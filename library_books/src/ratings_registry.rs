use library_ratings::client::LibraryRatingsClient;

/// Keeps the ratings service in step with the book catalogue
#[async_trait::async_trait]
pub trait RatingsRegistry: Send + Sync {
    /// Creates an empty rating record for a newly stored book
    async fn register(&self, book_id: &str, title: &str) -> anyhow::Result<()>;
    /// Drops the rating record of a removed book
    async fn unregister(&self, book_id: &str) -> anyhow::Result<()>;
}

pub struct RatingsServiceRegistry {
    client: LibraryRatingsClient,
}

impl RatingsServiceRegistry {
    pub fn new(ratings_service_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            client: LibraryRatingsClient::new(ratings_service_url)?,
        })
    }
}

#[async_trait::async_trait]
impl RatingsRegistry for RatingsServiceRegistry {
    async fn register(&self, book_id: &str, title: &str) -> anyhow::Result<()> {
        if !self.client.create_rating(book_id, title).await? {
            tracing::info!("Rating for {} was already registered", book_id);
        }
        Ok(())
    }

    async fn unregister(&self, book_id: &str) -> anyhow::Result<()> {
        if !self.client.delete_rating(book_id).await? {
            tracing::info!("No rating registered for {}", book_id);
        }
        Ok(())
    }
}

/// Used when no ratings service is configured
pub struct DisabledRatingsRegistry;

#[async_trait::async_trait]
impl RatingsRegistry for DisabledRatingsRegistry {
    async fn register(&self, book_id: &str, _title: &str) -> anyhow::Result<()> {
        tracing::debug!("Ratings registration disabled, skipping {}", book_id);
        Ok(())
    }

    async fn unregister(&self, _book_id: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_registries {
    use anyhow::bail;
    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct RecordingRegistry {
        pub registered: Mutex<Vec<(String, String)>>,
        pub unregistered: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl RatingsRegistry for RecordingRegistry {
        async fn register(&self, book_id: &str, title: &str) -> anyhow::Result<()> {
            self.registered
                .lock()
                .push((book_id.to_string(), title.to_string()));
            Ok(())
        }

        async fn unregister(&self, book_id: &str) -> anyhow::Result<()> {
            self.unregistered.lock().push(book_id.to_string());
            Ok(())
        }
    }

    pub struct UnreachableRegistry;

    #[async_trait::async_trait]
    impl RatingsRegistry for UnreachableRegistry {
        async fn register(&self, _book_id: &str, _title: &str) -> anyhow::Result<()> {
            bail!("ratings service unreachable")
        }

        async fn unregister(&self, _book_id: &str) -> anyhow::Result<()> {
            bail!("ratings service unreachable")
        }
    }
}
