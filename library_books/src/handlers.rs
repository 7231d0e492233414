use std::sync::Arc;

use actix_web::http::header::LOCATION;
use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::Error;
use actix_web::HttpResponse;
use library_common::http_errors::error_response;
use paperclip::actix::{
    api_v2_operation,
    web::{self},
};

use crate::api::{BookDetailsPatch, BookFilter, BookId, NewBookRequest};
use crate::books_repository::{BookRepository, BookRepositoryError};
use crate::enrichment::{BookEnricher, EnrichmentError};
use crate::ratings_registry::RatingsRegistry;

fn internal_error(operation: &str, err: BookRepositoryError) -> HttpResponse {
    tracing::error!("{} failed {}", operation, err);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, err)
}

fn missing_field(request: &NewBookRequest) -> Option<&'static str> {
    [
        ("title", &request.title),
        ("ISBN", &request.isbn),
        ("genre", &request.genre),
    ]
    .into_iter()
    .find(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
}

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn list_books(
    books_repository: Data<Arc<dyn BookRepository>>,
    filter: web::Query<BookFilter>,
) -> Result<HttpResponse, Error> {
    Ok(match books_repository.list_books(&filter).await {
        Ok(books) => HttpResponse::Ok().json(books),
        Err(err) => internal_error("List books", err),
    })
}

#[api_v2_operation]
pub async fn add_book(
    books_repository: Data<Arc<dyn BookRepository>>,
    enricher: Data<Arc<BookEnricher>>,
    ratings_registry: Data<Arc<dyn RatingsRegistry>>,
    request: web::Json<NewBookRequest>,
) -> Result<HttpResponse, Error> {
    let request = request.into_inner();
    if let Some(field) = missing_field(&request) {
        return Ok(error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Field {field} must not be empty"),
        ));
    }

    match books_repository.contains_book(&request.isbn).await {
        Ok(true) => {
            return Ok(error_response(
                StatusCode::CONFLICT,
                BookRepositoryError::AlreadyExists(request.isbn),
            ))
        }
        Ok(false) => {}
        Err(err) => return Ok(internal_error("Add book", err)),
    }

    let details = match enricher.enrich(request).await {
        Ok(details) => details,
        Err(err @ EnrichmentError::NoMetadata(_)) => {
            return Ok(error_response(StatusCode::UNPROCESSABLE_ENTITY, err))
        }
        Err(err @ EnrichmentError::MetadataUnavailable { .. }) => {
            tracing::error!("Add book failed {}", err);
            return Ok(error_response(StatusCode::BAD_GATEWAY, err));
        }
    };
    let title = details.title.clone();

    let book_id = match books_repository.add_book(details).await {
        Ok(book_id) => book_id,
        Err(err @ BookRepositoryError::AlreadyExists(_)) => {
            return Ok(error_response(StatusCode::CONFLICT, err))
        }
        Err(err) => return Ok(internal_error("Add book", err)),
    };
    tracing::info!("Book {} added", book_id);

    if let Err(err) = ratings_registry.register(&book_id, &title).await {
        tracing::warn!("Failed to register rating for {} {:#}", book_id, err);
    }

    Ok(HttpResponse::Created()
        .append_header((LOCATION, format!("/books/{}", book_id)))
        .finish())
}

#[api_v2_operation]
pub async fn get_book(
    books_repository: Data<Arc<dyn BookRepository>>,
    book_id: web::Path<BookId>,
) -> Result<HttpResponse, Error> {
    Ok(match books_repository.get_book(book_id.into_inner()).await {
        Ok(book) => HttpResponse::Ok().json(book),
        Err(err @ BookRepositoryError::NotFound(_)) => error_response(StatusCode::NOT_FOUND, err),
        Err(err) => internal_error("Get book", err),
    })
}

#[api_v2_operation]
pub async fn update_book(
    books_repository: Data<Arc<dyn BookRepository>>,
    book_id: web::Path<BookId>,
    patch: web::Json<BookDetailsPatch>,
) -> Result<HttpResponse, Error> {
    let patch = patch.into_inner();
    if patch.is_empty() {
        return Ok(error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "No fields to update",
        ));
    }
    let book_id = book_id.into_inner();
    Ok(
        match books_repository.update_book(book_id.clone(), patch).await {
            Ok(true) => HttpResponse::Ok().finish(),
            Ok(false) => {
                error_response(StatusCode::NOT_FOUND, BookRepositoryError::NotFound(book_id))
            }
            Err(err) => internal_error("Update book", err),
        },
    )
}

#[api_v2_operation]
pub async fn delete_book(
    books_repository: Data<Arc<dyn BookRepository>>,
    ratings_registry: Data<Arc<dyn RatingsRegistry>>,
    book_id: web::Path<BookId>,
) -> Result<HttpResponse, Error> {
    let book_id = book_id.into_inner();
    match books_repository.delete_book(book_id.clone()).await {
        Ok(true) => {}
        Ok(false) => {
            return Ok(error_response(
                StatusCode::NOT_FOUND,
                BookRepositoryError::NotFound(book_id),
            ))
        }
        Err(err) => return Ok(internal_error("Delete book", err)),
    }
    tracing::info!("Book {} deleted", book_id);

    if let Err(err) = ratings_registry.unregister(&book_id).await {
        tracing::warn!("Failed to remove rating of {} {:#}", book_id, err);
    }
    Ok(HttpResponse::Ok().finish())
}
