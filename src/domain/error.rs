use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize)]
pub enum AppError {
    ValidationError(String),
    ConfigError(String),
    IoError(String),
    Conversion(ConversionError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
            AppError::Conversion(err) => write!(f, "Conversion error: {}", err),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        AppError::Conversion(err)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Terminal failure of one read + decode attempt.
///
/// This is the only error type the conversion pipeline hands to its
/// observers; read failures and decoder failures both end up here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConversionError {
    /// File content could not be obtained
    Read { cause: String },

    /// Quoting, structural or byte-level decode failure
    MalformedInput { cause: String },

    /// A row's field count differs from the header's and the
    /// configured width policy rejects it
    RowWidthMismatch {
        line: u64,
        expected: usize,
        found: usize,
    },
}

impl ConversionError {
    pub fn read(cause: impl Into<String>) -> Self {
        ConversionError::Read {
            cause: cause.into(),
        }
    }

    pub fn malformed(cause: impl Into<String>) -> Self {
        ConversionError::MalformedInput {
            cause: cause.into(),
        }
    }

    /// Human-readable cause, suitable for an error banner
    pub fn cause(&self) -> String {
        match self {
            ConversionError::Read { cause } | ConversionError::MalformedInput { cause } => {
                cause.clone()
            }
            ConversionError::RowWidthMismatch {
                line,
                expected,
                found,
            } => format!(
                "row on line {} has {} fields, header has {}",
                line, found, expected
            ),
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::Read { cause } => write!(f, "failed to read file: {}", cause),
            ConversionError::MalformedInput { cause } => write!(f, "malformed input: {}", cause),
            ConversionError::RowWidthMismatch { .. } => {
                write!(f, "row width mismatch: {}", self.cause())
            }
        }
    }
}

impl std::error::Error for ConversionError {}
