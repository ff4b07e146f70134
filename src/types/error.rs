//! Error types for the survey service

/// Main error type for survey operations
#[derive(Debug, thiserror::Error)]
pub enum SurveyError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// A row read from the store did not satisfy the entity's constraints
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),
}

impl SurveyError {
    /// Message suitable for an operator-facing notification.
    ///
    /// Store errors carry the driver's text; everything else falls back to
    /// the display form.
    pub fn detail(&self) -> &str {
        match self {
            Self::NotFound(m)
            | Self::InvalidRecord(m)
            | Self::Database(m)
            | Self::Internal(m)
            | Self::Config(m)
            | Self::Auth(m) => m,
        }
    }
}

impl From<std::io::Error> for SurveyError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Result type alias for survey operations
pub type Result<T> = std::result::Result<T, SurveyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_is_the_bare_message() {
        let err = SurveyError::Database("connection reset".into());
        assert_eq!(err.detail(), "connection reset");
    }

    #[test]
    fn test_display_includes_category() {
        let err = SurveyError::NotFound("panchayath abc".into());
        assert_eq!(err.to_string(), "Not found: panchayath abc");
    }

    #[test]
    fn test_bind_failure_is_internal() {
        let err: SurveyError =
            std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use").into();
        assert!(matches!(err, SurveyError::Internal(_)));
    }
}
