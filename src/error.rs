//! Error types for the aspect engine crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AspectError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AspectError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("YAML parsing error: {0}")]
    YamlError(String),
    #[error("JSON parsing error: {0}")]
    JsonError(String),
}

impl From<std::io::Error> for AspectError {
    fn from(err: std::io::Error) -> Self {
        AspectError::IoError(err.to_string())
    }
}

impl From<serde_yaml::Error> for AspectError {
    fn from(err: serde_yaml::Error) -> Self {
        AspectError::YamlError(err.to_string())
    }
}

impl From<serde_json::Error> for AspectError {
    fn from(err: serde_json::Error) -> Self {
        AspectError::JsonError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_invalid_argument() {
        let error = AspectError::InvalidArgument("pointcutPattern must not be null".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid argument: pointcutPattern must not be null"
        );
        assert!(error.source().is_none());
    }

    #[test]
    fn test_invalid_token() {
        let error = AspectError::InvalidToken("TEXT is not a reference type".to_string());
        assert_eq!(error.to_string(), "Invalid token: TEXT is not a reference type");
    }

    #[test]
    fn test_invalid_regex() {
        let error = AspectError::InvalidRegex("Pattern '(': unclosed group".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid regex pattern: Pattern '(': unclosed group"
        );
    }

    #[test]
    fn test_error_equality() {
        let error1 = AspectError::ConfigError("test".to_string());
        let error2 = AspectError::ConfigError("test".to_string());
        let error3 = AspectError::ConfigError("different".to_string());

        assert_eq!(error1, error2);
        assert_ne!(error1, error3);
    }

    #[test]
    fn test_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: AspectError = io_error.into();

        match error {
            AspectError::IoError(msg) => assert!(msg.contains("file not found")),
            _ => panic!("Expected IoError variant"),
        }
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_error = serde_yaml::from_str::<Vec<String>>("{ unbalanced").unwrap_err();
        let error: AspectError = yaml_error.into();
        assert!(matches!(error, AspectError::YamlError(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_error = serde_json::from_str::<Vec<String>>("[1,").unwrap_err();
        let error: AspectError = json_error.into();
        assert!(matches!(error, AspectError::JsonError(_)));
    }

    #[test]
    fn test_result_type_alias_error() {
        fn test_function() -> Result<i32> {
            Err(AspectError::ConfigError("cache size must be positive".to_string()))
        }

        match test_function().unwrap_err() {
            AspectError::ConfigError(msg) => assert_eq!(msg, "cache size must be positive"),
            _ => panic!("Expected ConfigError"),
        }
    }
}
