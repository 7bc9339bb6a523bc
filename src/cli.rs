//! CLI front door.
//!
//! Helpers behind the `qk` binary: build a [`QueryInterface`] from an
//! optional config file plus command-line overrides, then parse one query
//! string into [`QueryOptions`].
//!
//! ## Error Handling
//!
//! All functions return `Result<T, QueryError>`, so the binary can map any
//! failure to an error JSON response and exit code.

use std::path::Path;

use querykit_core::config::QueryConfig;
use querykit_core::error::QueryError;
use querykit_core::interface::QueryInterface;
use querykit_core::output::QueryOptions;
use querykit_core::params::RawParams;
use querykit_core::sort::SortRepresentation;
use tracing::info;

/// Settings that override the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Convert date-shaped strings inside `or` payloads.
    pub parse_json_times: bool,
    /// Render sort directions as `1` / `-1`.
    pub numeric_sort: bool,
}

/// Load the config file (if any) and apply overrides.
pub fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<QueryConfig, QueryError> {
    let mut config = match path {
        Some(path) => QueryConfig::load(path)?,
        None => QueryConfig::default(),
    };
    if overrides.parse_json_times {
        config.decode.parse_json_times = true;
    }
    if overrides.numeric_sort {
        config.sort_representation = SortRepresentation::Numeric;
    }
    Ok(config)
}

/// Parse one query string with the given configuration.
pub fn run_query(query: &str, config: QueryConfig) -> Result<QueryOptions, QueryError> {
    let params = RawParams::from_query_string(query);
    info!("parsing {} parameters", params.len());
    let options = QueryInterface::new(config).parse_request(&params)?;
    Ok(options)
}
