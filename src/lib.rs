//! querykit: request parameters to document-database queries
//!
//! Turns flat query-string style parameters (`count.gte=1&tags.in=a|b`) into
//! nested filter maps, sort clauses, pagination and field projection.

// Core library - re-exported from querykit-core
pub use querykit_core::config;
pub use querykit_core::error;
pub use querykit_core::filter;
pub use querykit_core::interface;
pub use querykit_core::options;
pub use querykit_core::output;
pub use querykit_core::params;
pub use querykit_core::sort;
pub use querykit_core::types;

// Common entry points
pub use querykit_core::config::QueryConfig;
pub use querykit_core::interface::QueryInterface;
pub use querykit_core::params::RawParams;

// Front door
pub mod cli;
