//! Database error handling module
//! Define custom error types for connector construction and operations

use sea_orm::sqlx;
use thiserror::Error;
use crate::config::Role;

/// Database connector error
#[derive(Error, Debug)]
pub enum DbError {
    /// Role is not one of the known access tiers
    #[error("Unsupported role: {0} (expected 'readonly', 'insertupdate', 'delete' or 'auth')")]
    UnsupportedRole(String),

    /// Username or password for the role missing from environment variables
    #[error("Database credentials for role '{role}' are incomplete (environment variables missing?)")]
    IncompleteCredentials { role: Role },

    /// Engine is not one of the supported database products
    #[error("Unsupported engine: {0} (expected 'pgsql' or 'mysql')")]
    UnsupportedEngine(String),

    /// Database name passed to the constructor is empty
    #[error("Database name must not be empty")]
    EmptyDatabaseName,

    /// Database connection error
    #[error("Database connection failed: {source}")]
    ConnectionFailed {
        #[source]
        source: sqlx::Error,
    },

    /// Named placeholder in the SQL without a bound value
    #[error("No value bound for named parameter ':{0}'")]
    MissingParameter(String),

    /// `begin` called while a transaction is still open
    #[error("There is already an active transaction")]
    TransactionAlreadyActive,

    /// `commit` or `rollback` called without an open transaction
    #[error("There is no active transaction")]
    NoActiveTransaction,

    /// Error raised by the client library while executing a statement
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),
}
