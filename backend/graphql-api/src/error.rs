//! Error types for the store boundary and the seed programs

use async_graphql::ErrorExtensions;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a [`Store`](crate::store::Store) implementation
#[derive(Error, Debug)]
pub enum StoreError {
    /// No row matched the given key
    #[error("{entity} with {field} {key} does not exist in the database.")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        key: String,
    },

    /// Arguments rejected before reaching the database
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unique or foreign key constraint violated
    #[error("{0}")]
    Conflict(String),

    /// Database operation failed
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() || db.is_foreign_key_violation() => {
                StoreError::Conflict(db.message().to_owned())
            }
            _ => StoreError::Database(err),
        }
    }
}

impl StoreError {
    /// Not-found error keyed by primary identifier
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::not_found_by(entity, "ID", id)
    }

    pub fn not_found_by(entity: &'static str, field: &'static str, key: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            field,
            key: key.to_string(),
        }
    }

    /// Machine readable code exposed in GraphQL error extensions
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "NOT_FOUND",
            StoreError::InvalidArgument(_) => "BAD_USER_INPUT",
            StoreError::Conflict(_) => "CONFLICT",
            StoreError::Database(_) => "INTERNAL",
        }
    }
}

impl ErrorExtensions for StoreError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code();
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", code))
    }
}

/// Errors raised while seeding the database
#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<sqlx::Error> for SeedError {
    fn from(err: sqlx::Error) -> Self {
        SeedError::Store(err.into())
    }
}
