use library_common::settings::{load_config, ServiceSettings};

/// The ratings service only needs the common settings
pub fn load_settings() -> anyhow::Result<ServiceSettings> {
    ServiceSettings::from_config(&load_config(&[])?)
}
