use std::sync::Arc;

use actix_web::{App, HttpServer};
use anyhow::Context;
use library_common::http_errors::{json_config, query_config};
use library_common::telemetry::init_telemetry;
use paperclip::actix::{web, OpenApiExt};
use tracing_actix_web::TracingLogger;

use library_loans::app_config::config_app;
use library_loans::book_catalog::{BookCatalog, BooksServiceCatalog};
use library_loans::loans_repository::{
    InMemoryLoansRepository, LoansRepository, PostgresLoansRepository,
};
use library_loans::settings::load_settings;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry("library_loans")?;
    let (settings, loans_settings) = load_settings()?;

    let loans_repository: Arc<dyn LoansRepository> = if settings.use_in_memory_db {
        Arc::new(InMemoryLoansRepository::default())
    } else {
        Arc::new(
            PostgresLoansRepository::init(settings.postgres_config())
                .await
                .context("Failed to init postgres")?,
        )
    };

    tracing::info!("Books service at {}", loans_settings.books_service_url);
    let book_catalog: Arc<dyn BookCatalog> =
        Arc::new(BooksServiceCatalog::new(&loans_settings.books_service_url)?);

    tracing::info!("starting HTTP server at http://0.0.0.0:{}", settings.port);
    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(web::Data::new(loans_repository.clone()))
            .app_data(web::Data::new(book_catalog.clone()))
            .app_data(json_config())
            .app_data(query_config())
            .wrap(TracingLogger::default())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .bind(("0.0.0.0", settings.port))?
    .run()
    .await
    .context("HTTP server failed")
}
