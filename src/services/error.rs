//! Domain errors raised by the film read/write services.
//!
//! Every variant is produced where the condition is detected and travels unchanged to
//! the transport layer (REST handlers in [crate::api], resolvers in [crate::graphql]),
//! which decides how it looks on the wire.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilmError {
    /// No film matches the given id or criteria
    #[error("{0}")]
    NotFound(String),

    /// A search criterion is not a known film attribute, or its value has the wrong type
    #[error("invalid search criteria: {0}")]
    InvalidCriteria(String),

    /// The ISAN is already used by another film
    #[error("ISAN {0} already exists")]
    DuplicateCode(String),

    /// The title text is already used by another film
    #[error("title \"{0}\" already exists")]
    TitleExists(String),

    /// Input constraints were violated; one message per offending field
    #[error("invalid film data: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// An update arrived without a version token
    #[error("version token is missing")]
    VersionMissing,

    /// The version token is not a quoted integer such as `"3"`
    #[error("version token {0} is invalid")]
    VersionInvalid(String),

    /// The version token is older than the persisted version
    #[error("version {0} is outdated")]
    VersionOutdated(i64),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl FilmError {
    pub fn not_found_id(id: i64) -> Self {
        Self::NotFound(format!("no film found with id {}", id))
    }

    /// Machine-readable code shared by the REST and GraphQL error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            FilmError::NotFound(_) => "NOT_FOUND",
            FilmError::InvalidCriteria(_) => "INVALID_CRITERIA",
            FilmError::DuplicateCode(_) => "DUPLICATE_ISAN",
            FilmError::TitleExists(_) => "DUPLICATE_TITLE",
            FilmError::Validation(_) => "VALIDATION_FAILED",
            FilmError::VersionMissing => "VERSION_MISSING",
            FilmError::VersionInvalid(_) => "VERSION_INVALID",
            FilmError::VersionOutdated(_) => "VERSION_OUTDATED",
            FilmError::Database(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}
