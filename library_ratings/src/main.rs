use std::sync::Arc;

use actix_web::{App, HttpServer};
use anyhow::Context;
use library_common::http_errors::{json_config, query_config};
use library_common::telemetry::init_telemetry;
use paperclip::actix::{web, OpenApiExt};
use tracing_actix_web::TracingLogger;

use library_ratings::app_config::config_app;
use library_ratings::ratings_repository::{
    InMemoryRatingsRepository, PostgresRatingsRepository, RatingsRepository,
};
use library_ratings::settings::load_settings;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry("library_ratings")?;
    let settings = load_settings()?;

    let ratings_repository: Arc<dyn RatingsRepository> = if settings.use_in_memory_db {
        Arc::new(InMemoryRatingsRepository::default())
    } else {
        Arc::new(
            PostgresRatingsRepository::init(settings.postgres_config())
                .await
                .context("Failed to init postgres")?,
        )
    };

    tracing::info!("starting HTTP server at http://0.0.0.0:{}", settings.port);
    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(web::Data::new(ratings_repository.clone()))
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
