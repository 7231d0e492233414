use anyhow::Context;
use library_common::settings::{load_config, ServiceSettings};
use serde::Deserialize;

use crate::enrichment::{GEMINI_URL, GOOGLE_BOOKS_URL, OPEN_LIBRARY_URL};

/// Books service settings on top of the common ones
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BooksSettings {
    pub ratings_service_url: Option<String>,
    pub google_books_url: String,
    pub open_library_url: String,
    pub summary_api_url: String,
    pub summary_api_key: Option<String>,
}

pub fn load_settings() -> anyhow::Result<(ServiceSettings, BooksSettings)> {
    let config = load_config(&[
        ("google_books_url", GOOGLE_BOOKS_URL),
        ("open_library_url", OPEN_LIBRARY_URL),
        ("summary_api_url", GEMINI_URL),
    ])?;
    let books_settings = config
        .clone()
        .try_deserialize()
        .context("Failed to read books settings")?;
    Ok((ServiceSettings::from_config(&config)?, books_settings))
}
