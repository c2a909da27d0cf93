//! Error types for rustible-ios.
//!
//! Engine and module failures are [`ModuleError`]s; this enum wraps them
//! together with the input and serialization failures of the command-line
//! layer.

use std::path::PathBuf;
use thiserror::Error;

use crate::modules::ModuleError;

/// Result type alias for rustible-ios operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for rustible-ios.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Input Errors
    // ========================================================================
    /// Error reading or decoding an input file.
    #[error("Failed to read '{path}': {message}")]
    InputFile {
        /// Path to the input file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Resource name not known to the registry.
    #[error("Unknown resource '{0}'")]
    UnknownResource(String),

    // ========================================================================
    // Module Errors
    // ========================================================================
    /// Resource module failure.
    #[error(transparent)]
    Module(#[from] ModuleError),

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON parse error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl Error {
    /// Creates a new input file error.
    pub fn input_file(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InputFile {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Module(ModuleError::Validation(_))
            | Error::Module(ModuleError::InvalidParameter(_))
            | Error::Module(ModuleError::MissingParameter(_)) => 2,
            Error::Module(ModuleError::TemplateError(_)) => 3,
            Error::InputFile { .. } | Error::YamlParse(_) | Error::JsonParse(_) => 4,
            Error::UnknownResource(_) | Error::Module(ModuleError::NotFound(_)) => 5,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            Error::from(ModuleError::Validation("bad".into())).exit_code(),
            2
        );
        assert_eq!(Error::input_file("x.yml", "missing").exit_code(), 4);
        assert_eq!(Error::UnknownResource("ios_bgp".into()).exit_code(), 5);
        assert_eq!(
            Error::from(std::io::Error::other("broken pipe")).exit_code(),
            1
        );
    }

    #[test]
    fn test_module_error_is_transparent() {
        let err = Error::from(ModuleError::MissingParameter("config".into()));
        assert_eq!(err.to_string(), "Missing required parameter: config");
    }
}
