// src/error.rs

use thiserror::Error;

/// Errors surfaced by the library. Empty results are never errors: an
/// unmatched pattern yields an empty list and a survey with no usable
/// tables yields an empty relation.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested survey id is not in the registry.
    #[error("unknown survey `{0}`")]
    UnknownSurvey(String),

    /// A table listed by the catalog vanished before it could be read.
    #[error("table `{0}` not found in catalog")]
    TableNotFound(String),

    /// A malformed table pattern. Registry patterns are validated by the
    /// test suite, so hitting this at runtime means a caller-supplied
    /// pattern was bad.
    #[error("invalid table pattern `{pattern}`")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Db(#[from] duckdb::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
