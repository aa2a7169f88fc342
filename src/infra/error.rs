use thiserror::Error;

/// Start-up failures of the store, the cache and the runtime plumbing.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("database error: {message}")]
    Database { message: String },
    #[error("database migration failed: {message}")]
    Migration { message: String },
    #[error("{backend} cache error: {message}")]
    Cache {
        backend: &'static str,
        message: String,
    },
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl InfraError {
    pub fn database(err: impl std::fmt::Display) -> Self {
        Self::Database {
            message: err.to_string(),
        }
    }

    pub fn migration(err: impl std::fmt::Display) -> Self {
        Self::Migration {
            message: err.to_string(),
        }
    }

    pub fn cache(backend: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Cache {
            backend,
            message: err.to_string(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
