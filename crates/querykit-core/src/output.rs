//! JSON output types.
//!
//! [`QueryOptions`] bundles everything parsed from one request. Error
//! responses carry a stable code from [`OutputErrorCode`].

use std::io::{self, Write};

use serde::Serialize;

use crate::error::{OutputErrorCode, QueryError};
use crate::options::{FieldProjection, PaginationOptions};
use crate::types::FilterMap;

/// Output schema version.
pub const SCHEMA_VERSION: &str = "1";

/// Everything parsed from one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOptions {
    /// Merged filters.
    pub filters: FilterMap,
    /// Rendered sort clauses, in order.
    pub sort: Vec<FilterMap>,
    /// Pagination.
    pub pagination: PaginationOptions,
    /// Field projection, if requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldProjection>,
}

/// Error information for error responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
}

/// Error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Output schema version.
    pub schema_version: String,
    /// Always `"error"`.
    pub status: String,
    /// Error details.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response.
    pub fn new(code: OutputErrorCode, message: impl Into<String>) -> Self {
        ErrorResponse {
            schema_version: SCHEMA_VERSION.to_string(),
            status: "error".to_string(),
            error: ErrorInfo {
                code: code.code(),
                message: message.into(),
            },
        }
    }
}

impl From<&QueryError> for ErrorResponse {
    fn from(err: &QueryError) -> Self {
        ErrorResponse::new(err.error_code(), err.to_string())
    }
}

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Emit a response as compact JSON (single line) to a writer.
pub fn emit_response_compact<T: Serialize>(
    response: &T,
    writer: &mut impl Write,
) -> io::Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}
