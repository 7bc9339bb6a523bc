//! Parser configuration.
//!
//! [`QueryConfig`] holds everything the embedding application supplies
//! besides the request itself: default filters and sort, rename tables,
//! pagination defaults, reserved parameter names and decode options.
//!
//! ## File format
//!
//! ```json
//! {
//!   "default_filters": {"status": "published"},
//!   "default_sort": ["created_at.desc", {"updated_at": "asc"}],
//!   "filter_renames": {"names": "tags"},
//!   "sort_renames": {"updated_at": "updated_at_sortable"},
//!   "pagination": {"per_page": 12, "page": 1},
//!   "decode": {"parse_json_times": false},
//!   "sort_representation": "symbolic"
//! }
//! ```
//!
//! Every key is optional. Value-transform renames cannot be expressed in the
//! file and are registered in code with [`AttributeRenames::transform`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::filter::{AttributeRenames, DecodeOptions};
use crate::options::{PaginationOptions, ReservedParameters};
use crate::sort::{SortItem, SortRepresentation};
use crate::types::FilterMap;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The contents are not a valid configuration.
    #[error("invalid config: {message}")]
    Parse { message: String },
}

/// Static configuration for filter, sort and option parsing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Filters applied unless overridden or disabled.
    pub default_filters: FilterMap,
    /// Sort used when the request has no `order_by`.
    pub default_sort: Vec<SortItem>,
    /// Rename rules for filter attributes.
    pub filter_renames: AttributeRenames,
    /// Rename rules for sort attributes.
    pub sort_renames: AttributeRenames,
    /// Pagination defaults.
    pub pagination: PaginationOptions,
    /// Parameters excluded from filtering.
    pub reserved: ReservedParameters,
    /// `or` payload decoding.
    pub decode: DecodeOptions,
    /// How sort clauses render their direction.
    pub sort_representation: SortRepresentation,
}

impl QueryConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }
}
