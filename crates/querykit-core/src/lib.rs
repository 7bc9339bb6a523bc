//! Core of querykit.
//!
//! This crate turns flat request parameters into document-database query
//! specifications:
//! - Attribute/operator splitting and value coercion
//! - Filter merging, including `$or` groups
//! - Sort specification parsing
//! - Pagination and field projection options
//! - Configuration, error types and JSON output types

pub mod config;
pub mod error;
pub mod filter;
pub mod interface;
pub mod options;
pub mod output;
pub mod params;
pub mod sort;
pub mod types;
