use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

/// Body of every error response returned by the services
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

pub fn error_response(status: StatusCode, message: impl ToString) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse::new(message))
}

/// Json extractor config answering malformed bodies with 422 (415 for a wrong content type)
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let status = match &err {
            JsonPayloadError::ContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        let response = error_response(status, &err);
        InternalError::from_response(err, response).into()
    })
}

/// Query extractor config answering unknown or malformed filters with 422
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let response = error_response(StatusCode::UNPROCESSABLE_ENTITY, &err);
        InternalError::from_response(err, response).into()
    })
}

#[cfg(test)]
mod http_errors_tests {
    use actix_web::{test, App};
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Payload {
        #[allow(dead_code)]
        name: String,
    }

    async fn accept(_payload: web::Json<Payload>, _query: web::Query<Payload>) -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn test_extractor_failures_are_reported_as_json() {
        let app = test::init_service(
            App::new()
                .app_data(json_config())
                .app_data(query_config())
                .route("/", web::post().to(accept)),
        )
        .await;

        let missing_field = test::TestRequest::post()
            .uri("/?name=a")
            .set_json(serde_json::json!({ "other": 1 }))
            .to_request();
        let response = test::call_service(&app, missing_field).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorResponse = test::read_body_json(response).await;
        assert!(body.error.contains("other"), "{}", body.error);

        let wrong_content_type = test::TestRequest::post()
            .uri("/?name=a")
            .insert_header(("content-type", "text/plain"))
            .set_payload("name")
            .to_request();
        let response = test::call_service(&app, wrong_content_type).await;
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let unknown_filter = test::TestRequest::post()
            .uri("/?name=a&genre=b")
            .set_json(serde_json::json!({ "name": "a" }))
            .to_request();
        let response = test::call_service(&app, unknown_filter).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
