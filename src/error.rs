//! Unified error types for the account service.

use thiserror::Error;

use crate::account::AccountId;

/// Top-level error for startup and process-wide operations.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Metrics recorder could not be installed.
    #[error("metrics error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage layer errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// No account row has the requested ID.
    #[error("account {id} not found")]
    NotFound {
        /// The ID that was looked up.
        id: AccountId,
    },

    /// A unique column (email, phone number, account number) already holds the value.
    #[error("account already exists: {0}")]
    Conflict(String),

    /// A value does not fit the column (too long, or missing where required).
    #[error("invalid account data: {0}")]
    Invalid(String),

    /// The database could not be reached.
    #[error("database unavailable: {0}")]
    Unavailable(String),

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl StorageError {
    /// Short label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            StorageError::NotFound { .. } => "not_found",
            StorageError::Conflict(_) => "conflict",
            StorageError::Invalid(_) => "invalid",
            StorageError::Unavailable(_) => "unavailable",
            StorageError::Database(_) => "database",
        }
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                let detail = match db.constraint() {
                    Some(constraint) => format!("{} ({})", db.message(), constraint),
                    None => db.message().to_string(),
                };
                return StorageError::Conflict(detail);
            }

            // 22001 string_data_right_truncation, 23502 not_null_violation
            if matches!(db.code().as_deref(), Some("22001" | "23502")) {
                return StorageError::Invalid(db.message().to_string());
            }
        }

        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StorageError::Unavailable(err.to_string()),
            other => StorageError::Database(other),
        }
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServiceError>;
