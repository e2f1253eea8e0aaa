//! Mapping of domain errors to GraphQL errors

use async_graphql::ErrorExtensions;

use crate::services::FilmError;

impl FilmError {
    /// Value of `extensions.code` on the GraphQL error
    pub fn graphql_code(&self) -> &'static str {
        match self {
            FilmError::NotFound(_) => "NOT_FOUND",
            FilmError::Database(_) => "INTERNAL_SERVER_ERROR",
            _ => "BAD_USER_INPUT",
        }
    }
}

impl ErrorExtensions for FilmError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.graphql_code();
        let reason = self.code();
        let message = match self {
            FilmError::Database(e) => {
                tracing::error!(error = %e, "Database error in GraphQL resolver");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        async_graphql::Error::new(message).extend_with(|_, e| {
            e.set("code", code);
            e.set("reason", reason);
        })
    }
}
