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

use crate::api::{LoanFilter, LoanId, LoanRecord, NewLoanRequest};
use crate::book_catalog::BookCatalog;
use crate::loans_repository::{LoansRepository, LoansRepositoryError};

fn internal_error(operation: &str, err: LoansRepositoryError) -> HttpResponse {
    tracing::error!("{} failed {}", operation, err);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, err)
}

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn list_loans(
    loans_repository: Data<Arc<dyn LoansRepository>>,
    filter: web::Query<LoanFilter>,
) -> Result<HttpResponse, Error> {
    Ok(match loans_repository.list_loans(&filter).await {
        Ok(loans) => HttpResponse::Ok().json(loans),
        Err(err) => internal_error("List loans", err),
    })
}

#[api_v2_operation]
pub async fn create_loan(
    loans_repository: Data<Arc<dyn LoansRepository>>,
    book_catalog: Data<Arc<dyn BookCatalog>>,
    request: web::Json<NewLoanRequest>,
) -> Result<HttpResponse, Error> {
    let request = request.into_inner();
    if let Err(err) = request.validate() {
        return Ok(error_response(StatusCode::UNPROCESSABLE_ENTITY, err));
    }

    let book = match book_catalog.find_by_isbn(&request.isbn).await {
        Ok(Some(book)) => book,
        Ok(None) => {
            return Ok(error_response(
                StatusCode::NOT_FOUND,
                format!("No book with ISBN {}", request.isbn),
            ))
        }
        Err(err) => {
            tracing::warn!("Book lookup for {} failed {:#}", request.isbn, err);
            return Ok(error_response(
                StatusCode::NOT_FOUND,
                format!("Book with ISBN {} could not be found", request.isbn),
            ));
        }
    };

    let loan = LoanRecord {
        loan_id: uuid::Uuid::new_v4().to_string(),
        member_name: request.member_name,
        isbn: request.isbn,
        title: book.title,
        book_id: book.id,
        loan_date: request.loan_date,
    };

    Ok(match loans_repository.create_loan(loan).await {
        Ok(loan) => {
            tracing::info!(
                "Loan {} of {} to {} created",
                loan.loan_id,
                loan.isbn,
                loan.member_name
            );
            HttpResponse::Created()
                .append_header((LOCATION, format!("/loans/{}", loan.loan_id)))
                .json(loan)
        }
        Err(err @ LoansRepositoryError::Rejected(_)) => error_response(StatusCode::CONFLICT, err),
        Err(err) => internal_error("Create loan", err),
    })
}

#[api_v2_operation]
pub async fn delete_loan(
    loans_repository: Data<Arc<dyn LoansRepository>>,
    loan_id: web::Path<LoanId>,
) -> Result<HttpResponse, Error> {
    let loan_id = loan_id.into_inner();
    Ok(
        match loans_repository.delete_loan(loan_id.clone()).await {
            Ok(true) => {
                tracing::info!("Loan {} returned", loan_id);
                HttpResponse::Ok().finish()
            }
            Ok(false) => error_response(
                StatusCode::NOT_FOUND,
                LoansRepositoryError::NotFound(loan_id),
            ),
            Err(err) => internal_error("Delete loan", err),
        },
    )
}
