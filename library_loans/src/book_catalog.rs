use anyhow::Context;
use library_books::api::{BookDetails, BookFilter};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use reqwest_tracing::TracingMiddleware;

const MAX_RETRIES: u32 = 2;

/// Book a loan is made for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogBook {
    pub id: String,
    pub title: String,
}

#[async_trait::async_trait]
pub trait BookCatalog: Send + Sync {
    /// Returns None when no book has the ISBN
    async fn find_by_isbn(&self, isbn: &str) -> anyhow::Result<Option<CatalogBook>>;
}

/// Looks books up in the books service
pub struct BooksServiceCatalog {
    books_service_url: String,
    client: ClientWithMiddleware,
}

impl BooksServiceCatalog {
    pub fn new(books_service_url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(MAX_RETRIES);
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            books_service_url: books_service_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl BookCatalog for BooksServiceCatalog {
    async fn find_by_isbn(&self, isbn: &str) -> anyhow::Result<Option<CatalogBook>> {
        let books: Vec<BookDetails> = self
            .client
            .get(format!("{}/books", self.books_service_url))
            .query(&BookFilter::by_isbn(isbn))
            .send()
            .await
            .context("Failed to get book by ISBN")?
            .error_for_status()
            .context("Books service returned an error")?
            .json()
            .await
            .context("Failed to decode books")?;

        Ok(books.into_iter().next().map(|book| CatalogBook {
            id: book.id,
            title: book.title,
        }))
    }
}

#[cfg(test)]
pub(crate) mod test_catalogs {
    use std::collections::HashMap;

    use anyhow::bail;

    use super::*;

    /// Catalog of ISBN to title
    pub struct FixedCatalog(pub HashMap<String, String>);

    impl FixedCatalog {
        pub fn with_books(books: &[(&str, &str)]) -> Self {
            Self(
                books
                    .iter()
                    .map(|(isbn, title)| (isbn.to_string(), title.to_string()))
                    .collect(),
            )
        }
    }

    #[async_trait::async_trait]
    impl BookCatalog for FixedCatalog {
        async fn find_by_isbn(&self, isbn: &str) -> anyhow::Result<Option<CatalogBook>> {
            Ok(self.0.get(isbn).map(|title| CatalogBook {
                id: isbn.to_string(),
                title: title.clone(),
            }))
        }
    }

    pub struct UnreachableCatalog;

    #[async_trait::async_trait]
    impl BookCatalog for UnreachableCatalog {
        async fn find_by_isbn(&self, _isbn: &str) -> anyhow::Result<Option<CatalogBook>> {
            bail!("books service unreachable")
        }
    }
}
