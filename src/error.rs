use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the compiler
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the compiler.
///
/// Every variant except `Io`, `Config` and `Serialization` describes bad
/// annotation or configuration input that aborts the current path-group.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration in {}: {message}", file.display())]
    Config { file: PathBuf, message: String },

    #[error("input params as array are not supported (handler {handler})")]
    ArrayInputParameter { handler: String },

    #[error("multiple models defined but not inside array (handler {handler}, response {code})")]
    MultipleModelsWithoutArray { handler: String, code: String },

    #[error("invalid security configuration, add a config entry for {scheme} @ {path}")]
    MissingSecurityScheme { scheme: String, path: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Whether this error is caused by annotation or configuration content rather than I/O.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::ArrayInputParameter { .. }
                | Error::MultipleModelsWithoutArray { .. }
                | Error::MissingSecurityScheme { .. }
                | Error::Config { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON serialization error: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(format!("YAML serialization error: {}", err))
    }
}
