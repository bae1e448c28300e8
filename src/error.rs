//! Error types for sqlcase.

use thiserror::Error;

/// The main error type for sqlcase operations.
///
/// Building a CASE expression never fails; these cover the clause DSL,
/// configuration and file access around the builder.
#[derive(Debug, Error)]
pub enum CaseError {
    /// Failed to parse a clause or definition.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// A literal that cannot be turned into a bind value.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaseError {
    /// Create a parse error at the given position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for CaseError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for sqlcase operations.
pub type CaseResult<T> = Result<T, CaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CaseError::parse(5, "unexpected character");
        assert_eq!(
            err.to_string(),
            "Parse error at position 5: unexpected character"
        );
    }

    #[test]
    fn test_toml_error_becomes_config_error() {
        let err: CaseError = toml::from_str::<toml::Value>("= broken")
            .unwrap_err()
            .into();
        assert!(matches!(err, CaseError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error:"));
    }
}
