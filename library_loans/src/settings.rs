use anyhow::Context;
use library_common::settings::{load_config, ServiceSettings};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoansSettings {
    pub books_service_url: String,
}

pub fn load_settings() -> anyhow::Result<(ServiceSettings, LoansSettings)> {
    let config = load_config(&[("books_service_url", "http://localhost:8080")])?;
    let loans_settings = config
        .clone()
        .try_deserialize()
        .context("Failed to read loans settings")?;
    Ok((ServiceSettings::from_config(&config)?, loans_settings))
}

#[cfg(test)]
mod settings_tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_books_service_url() {
        std::env::remove_var("BOOKS_SERVICE_URL");
        let (_, defaults) = load_settings().expect("Failed to load settings");
        assert_eq!(defaults.books_service_url, "http://localhost:8080");

        std::env::set_var("BOOKS_SERVICE_URL", "http://books:8080");
        let (_, configured) = load_settings().expect("Failed to load settings");
        std::env::remove_var("BOOKS_SERVICE_URL");
        assert_eq!(configured.books_service_url, "http://books:8080");
    }
}
