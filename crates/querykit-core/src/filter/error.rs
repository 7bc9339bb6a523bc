//! Errors raised while building and merging filters.

use thiserror::Error;

/// Error type for filter parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// Two filters on the same attribute cannot be combined.
    #[error("arguments `{left}` and `{right}` could not be mixed")]
    MixedArgument { left: String, right: String },

    /// A value looked like a date but is not a valid calendar date/time.
    #[error("invalid date/time '{value}': {message}")]
    DateTimeParse { value: String, message: String },

    /// The `or` parameter is not a list of attribute maps.
    #[error("invalid `or` expression: {message}")]
    InvalidGroupExpression { message: String },
}

impl FilterError {
    pub(crate) fn group(message: impl Into<String>) -> Self {
        FilterError::InvalidGroupExpression {
            message: message.into(),
        }
    }
}
