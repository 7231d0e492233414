use anyhow::Context;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls};

/// Connection parameters shared by every Postgres backed repository
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

/// Connects to postgres, spawns the connection driver and runs the given schema statements
pub async fn connect(config: &PostgresConfig, schema: &[&str]) -> anyhow::Result<Client> {
    let connection_str = format!(
        "postgresql://{}:{}@{}",
        config.username, config.password, config.hostname
    );
    tracing::info!(
        "Connecting to postgres at {} as {}",
        config.hostname,
        config.username
    );
    let (client, connection) = tokio_postgres::connect(&connection_str, NoTls)
        .await
        .context("Failed to start postgres")?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("Postgres connection error: {}", e);
        }
    });

    for statement in schema {
        client
            .batch_execute(statement)
            .await
            .context("Failed to setup table")?;
    }
    Ok(client)
}

fn has_code(err: &tokio_postgres::Error, code: &SqlState) -> bool {
    err.as_db_error()
        .map(|db_err| db_err.code() == code)
        .unwrap_or_default()
}

/// True if the error is a violation of a unique constraint
pub fn is_unique_violation(err: &tokio_postgres::Error) -> bool {
    has_code(err, &SqlState::UNIQUE_VIOLATION)
}

pub fn is_check_violation(err: &tokio_postgres::Error) -> bool {
    has_code(err, &SqlState::CHECK_VIOLATION)
}
