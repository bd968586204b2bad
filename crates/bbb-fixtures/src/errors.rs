//! Fixture builder error types.
//!
//! Every variant is fatal for the test that requested the fixture. Nothing is
//! retried and no partially built fixture is persisted; callers propagate the
//! error and fail the test.

use thiserror::Error;

/// Fixture builder error type.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// A required field is missing or holds an unusable value.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A participant token is not of the form `role:<name>` or `user:<name>`.
    #[error("Unrecognized participant selection type in '{0}'")]
    UnrecognizedSelectionType(String),

    /// A `role:<name>` token names a role the directory does not know.
    #[error("Unknown role '{0}'")]
    UnknownRole(String),

    /// A `user:<name>` token names a username the directory does not know.
    #[error("Record not found: no user with username '{0}'")]
    UnknownUser(String),

    /// A directory, instance or recording lookup missed.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The mock server was unreachable or replied with something unusable.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A fixture field could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FixtureError {
    /// Whether this error is a record-not-found failure.
    ///
    /// Unknown usernames surface as not-found errors, matching a
    /// must-exist lookup in the user directory.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FixtureError::NotFound(_) | FixtureError::UnknownUser(_))
    }
}

impl From<reqwest::Error> for FixtureError {
    fn from(err: reqwest::Error) -> Self {
        FixtureError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for FixtureError {
    fn from(err: serde_json::Error) -> Self {
        FixtureError::Serialization(err.to_string())
    }
}
