//! Error types for mod authors

use thiserror::Error;

/// Errors that mods can return from entry points and toggle callbacks
#[derive(Error, Debug)]
pub enum ModError {
    /// Version string could not be parsed
    #[error("Invalid version '{0}'")]
    InvalidVersion(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Custom error with message
    #[error("{0}")]
    Custom(String),
}

impl ModError {
    /// Create a custom error with a message
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModError::InvalidVersion("1.2".to_string());
        assert_eq!(err.to_string(), "Invalid version '1.2'");

        let err = ModError::Config("missing key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing key");

        let err = ModError::Custom("something happened".to_string());
        assert_eq!(err.to_string(), "something happened");
    }

    #[test]
    fn test_helper_constructors() {
        assert!(matches!(ModError::custom("x"), ModError::Custom(_)));
        assert!(matches!(ModError::config("x"), ModError::Config(_)));
    }
}
