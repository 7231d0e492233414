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

use crate::api::{BookId, NewRatingRequest, RatingAverage, RatingPatch, RatingSubmission};
use crate::leaderboard::top_rated;
use crate::ratings_repository::{RatingsRepository, RatingsRepositoryError};

fn internal_error(operation: &str, err: RatingsRepositoryError) -> HttpResponse {
    tracing::error!("{} failed {}", operation, err);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, err)
}

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn get_all_ratings(
    ratings_repository: Data<Arc<dyn RatingsRepository>>,
) -> Result<HttpResponse, Error> {
    Ok(match ratings_repository.list_ratings().await {
        Ok(ratings) => HttpResponse::Ok().json(ratings),
        Err(err) => internal_error("Get all ratings", err),
    })
}

#[api_v2_operation]
pub async fn create_rating(
    ratings_repository: Data<Arc<dyn RatingsRepository>>,
    request: web::Json<NewRatingRequest>,
) -> Result<HttpResponse, Error> {
    let request = request.into_inner();
    if request.id.trim().is_empty() {
        return Ok(error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Rating id must not be empty",
        ));
    }
    let book_id = request.id.clone();
    Ok(match ratings_repository.create_rating(request).await {
        Ok(()) => HttpResponse::Created()
            .append_header((LOCATION, format!("/ratings/{}", book_id)))
            .finish(),
        Err(err @ RatingsRepositoryError::AlreadyExists(_)) => {
            error_response(StatusCode::CONFLICT, err)
        }
        Err(err) => internal_error("Create rating", err),
    })
}

#[api_v2_operation]
pub async fn get_rating(
    ratings_repository: Data<Arc<dyn RatingsRepository>>,
    book_id: web::Path<BookId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match ratings_repository.get_rating(book_id.into_inner()).await {
            Ok(rating) => HttpResponse::Ok().json(rating),
            Err(err @ RatingsRepositoryError::NotFound(_)) => {
                error_response(StatusCode::NOT_FOUND, err)
            }
            Err(err) => internal_error("Get rating", err),
        },
    )
}

#[api_v2_operation]
pub async fn submit_rating_value(
    ratings_repository: Data<Arc<dyn RatingsRepository>>,
    book_id: web::Path<BookId>,
    submission: web::Json<RatingSubmission>,
) -> Result<HttpResponse, Error> {
    let value = match submission.validated() {
        Ok(value) => value,
        Err(err) => return Ok(error_response(StatusCode::UNPROCESSABLE_ENTITY, err)),
    };
    Ok(
        match ratings_repository
            .add_value(book_id.into_inner(), value)
            .await
        {
            Ok(record) => {
                tracing::info!("Book {} avg. rating is {}", record.id, record.average);
                HttpResponse::Ok().json(RatingAverage {
                    id: record.id,
                    average: record.average,
                })
            }
            Err(err @ RatingsRepositoryError::NotFound(_)) => {
                error_response(StatusCode::NOT_FOUND, err)
            }
            Err(err) => internal_error("Submit rating", err),
        },
    )
}

#[api_v2_operation]
pub async fn update_rating(
    ratings_repository: Data<Arc<dyn RatingsRepository>>,
    book_id: web::Path<BookId>,
    patch: web::Json<RatingPatch>,
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
        match ratings_repository.update_rating(book_id.clone(), patch).await {
            Ok(true) => HttpResponse::Ok().finish(),
            Ok(false) => error_response(
                StatusCode::NOT_FOUND,
                RatingsRepositoryError::NotFound(book_id),
            ),
            Err(err) => internal_error("Update rating", err),
        },
    )
}

#[api_v2_operation]
pub async fn delete_rating(
    ratings_repository: Data<Arc<dyn RatingsRepository>>,
    book_id: web::Path<BookId>,
) -> Result<HttpResponse, Error> {
    let book_id = book_id.into_inner();
    Ok(
        match ratings_repository.delete_rating(book_id.clone()).await {
            Ok(true) => HttpResponse::Ok().finish(),
            Ok(false) => error_response(
                StatusCode::NOT_FOUND,
                RatingsRepositoryError::NotFound(book_id),
            ),
            Err(err) => internal_error("Delete rating", err),
        },
    )
}

#[api_v2_operation]
pub async fn get_top_rated(
    ratings_repository: Data<Arc<dyn RatingsRepository>>,
) -> Result<HttpResponse, Error> {
    Ok(match ratings_repository.list_ratings().await {
        Ok(ratings) => HttpResponse::Ok().json(top_rated(&ratings)),
        Err(err) => internal_error("Get top rated", err),
    })
}
