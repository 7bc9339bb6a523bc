//! Unified error type and output error codes.
//!
//! Each subsystem has its own error enum ([`FilterError`], [`ConfigError`]).
//! [`QueryError`] bridges them into one type for callers that render errors
//! as JSON, and [`OutputErrorCode`] gives every error a stable integer code
//! (also used as the `qk` exit code).
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (malformed filters, bad `or` payloads, bad dates)
//! - `3`: Configuration errors (unreadable or invalid config file)
//! - `10`: Internal errors (output could not be produced)

use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;
use crate::filter::FilterError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable error codes for JSON output and process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller.
    InvalidArguments = 2,
    /// Configuration could not be loaded.
    ConfigError = 3,
    /// Internal errors.
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for querykit callers.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Filter parsing failed.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Internal error.
    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl QueryError {
    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        QueryError::InternalError {
            message: message.into(),
        }
    }

    /// The output error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

impl From<&QueryError> for OutputErrorCode {
    fn from(err: &QueryError) -> Self {
        match err {
            QueryError::Filter(_) => OutputErrorCode::InvalidArguments,
            QueryError::Config(_) => OutputErrorCode::ConfigError,
            QueryError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}
