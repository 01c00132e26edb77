//! Keepsake CLI — error types.

use keepsake_core::error::DomainError;
use thiserror::Error;

/// Startup and runtime errors of the terminal front end.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A configuration file could not be read.
    #[error("cannot read {path}: {source}")]
    ReadFile {
        /// Path taken from the environment.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A line of input is not a known command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Terminal I/O failed.
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),

    /// The presentation view could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The presentation rejected a configuration or an operation.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl AppError {
    /// Whether the error concerns one line of input and the session can
    /// go on.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::UnknownCommand(_) => true,
            Self::Domain(e) => matches!(
                e,
                DomainError::InvalidInput(_) | DomainError::InvalidStep(_)
            ),
            Self::Config(_) | Self::ReadFile { .. } | Self::Io(_) | Self::Serialization(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_is_a_user_error() {
        let err = AppError::from(DomainError::InvalidInput("not now".into()));

        assert!(err.is_user_error());
        assert_eq!(err.to_string(), "invalid input: not now");
    }

    #[test]
    fn test_unknown_command_is_a_user_error() {
        assert!(AppError::UnknownCommand("dance".into()).is_user_error());
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let err = AppError::from(DomainError::InvalidConfig("cadence".into()));

        assert!(!err.is_user_error());
    }

    #[test]
    fn test_read_file_names_the_path() {
        let err = AppError::ReadFile {
            path: "script.yaml".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };

        assert!(!err.is_user_error());
        assert!(err.to_string().starts_with("cannot read script.yaml: "));
    }
}
