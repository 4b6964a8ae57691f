//! Catalog error types.
//!
//! Every catalog operation returns [`Result`]; the HTTP layer maps each
//! variant to a status code via [`CatalogError::status_code`].

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors produced by the catalog and its collaborators.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CatalogError {
    /// Missing or invalid bearer token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// A referenced image, category or pin does not exist.
    #[error("{message}")]
    NotFound {
        message: String,
        /// Ids that could not be resolved (batch operations only).
        missing: Vec<String>,
    },

    /// The target key is already taken.
    #[error("{0}")]
    Conflict(String),

    /// Underlying storage failure.
    #[error("store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl CatalogError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            missing: Vec::new(),
        }
    }

    /// Create a not found error listing the ids that were missing.
    pub fn not_found_ids(message: impl Into<String>, missing: Vec<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            missing,
        }
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Get the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Validation(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Conflict(_) => 409,
            Self::Store(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(CatalogError::Unauthorized("x".into()).status_code(), 401);
        assert_eq!(CatalogError::validation("x").status_code(), 400);
        assert_eq!(CatalogError::not_found("x").status_code(), 404);
        assert_eq!(CatalogError::conflict("x").status_code(), 409);
        assert_eq!(
            CatalogError::from(anyhow::anyhow!("disk full")).status_code(),
            500
        );
    }

    #[test]
    fn test_not_found_ids_keeps_list() {
        let err = CatalogError::not_found_ids("Some images not found", vec!["a".into()]);
        match err {
            CatalogError::NotFound { message, missing } => {
                assert_eq!(message, "Some images not found");
                assert_eq!(missing, vec!["a"]);
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
