use anyhow::Context;
use config::{Config, Environment};
use serde::Deserialize;

use crate::postgres::PostgresConfig;

/// Settings every service reads: where to listen and which store to use
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServiceSettings {
    pub port: u16,
    pub use_in_memory_db: bool,
    pub db_host: String,
    pub db_username: String,
    pub db_password: String,
}

impl ServiceSettings {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        config
            .clone()
            .try_deserialize()
            .context("Failed to read service settings")
    }

    pub fn postgres_config(&self) -> PostgresConfig {
        PostgresConfig {
            hostname: self.db_host.clone(),
            username: self.db_username.clone(),
            password: self.db_password.clone(),
        }
    }
}

/// Builds configuration from defaults overridden by environment variables.
/// `DB_HOST` in the environment becomes the `db_host` key.
pub fn load_config(service_defaults: &[(&str, &str)]) -> anyhow::Result<Config> {
    let mut builder = Config::builder()
        .set_default("port", 8080_i64)?
        .set_default("use_in_memory_db", false)?
        .set_default("db_host", "127.0.0.1")?
        .set_default("db_username", "postgres")?
        .set_default("db_password", "postgres")?;
    for (key, value) in service_defaults {
        builder = builder.set_default(*key, *value)?;
    }
    builder
        .add_source(Environment::default().try_parsing(true))
        .build()
        .context("Failed to build configuration")
}
