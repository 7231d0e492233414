use std::sync::Arc;

use actix_web::{App, HttpServer};
use anyhow::Context;
use library_common::http_errors::{json_config, query_config};
use library_common::telemetry::init_telemetry;
use paperclip::actix::{web, OpenApiExt};
use tracing_actix_web::TracingLogger;

use library_books::app_config::config_app;
use library_books::books_repository::{
    BookRepository, InMemoryBookRepository, PostgresBooksRepository,
};
use library_books::enrichment::{
    BookEnricher, GeminiSummarySource, GoogleBooksSource, OpenLibrarySource,
};
use library_books::ratings_registry::{
    DisabledRatingsRegistry, RatingsRegistry, RatingsServiceRegistry,
};
use library_books::settings::load_settings;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry("library_books")?;
    let (settings, books_settings) = load_settings()?;

    let books_repository: Arc<dyn BookRepository> = if settings.use_in_memory_db {
        Arc::new(InMemoryBookRepository::default())
    } else {
        Arc::new(
            PostgresBooksRepository::init(settings.postgres_config())
                .await
                .context("Failed to init postgres")?,
        )
    };

    let enricher = Arc::new(BookEnricher::new(
        Arc::new(GoogleBooksSource::new(&books_settings.google_books_url)?),
        Arc::new(OpenLibrarySource::new(&books_settings.open_library_url)?),
        Arc::new(GeminiSummarySource::new(
            &books_settings.summary_api_url,
            books_settings.summary_api_key.clone(),
        )?),
    ));

    let ratings_registry: Arc<dyn RatingsRegistry> = match &books_settings.ratings_service_url {
        Some(url) => {
            tracing::info!("Registering books for ratings at {}", url);
            Arc::new(RatingsServiceRegistry::new(url)?)
        }
        None => {
            tracing::warn!("RATINGS_SERVICE_URL not set, ratings registration disabled");
            Arc::new(DisabledRatingsRegistry)
        }
    };

    tracing::info!("starting HTTP server at http://0.0.0.0:{}", settings.port);
    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(web::Data::new(books_repository.clone()))
            .app_data(web::Data::new(enricher.clone()))
            .app_data(web::Data::new(ratings_registry.clone()))
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
