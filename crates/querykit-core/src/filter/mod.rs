//! Filter parsing.
//!
//! This module turns flat request parameters into a nested filter map:
//! - Keys are split on a trailing operator suffix (`count.gte`, `tags.all`)
//! - Values are percent-decoded and coerced (lists, dates, numbers, regexes, booleans)
//! - Attributes are renamed, optionally transforming their values
//! - Filters on the same attribute are merged
//! - An `or` parameter carrying a JSON list of maps becomes an `$or` group
//!
//! ## Usage
//!
//! ```
//! use querykit_core::filter::{AttributeRenames, DecodeOptions, FilterCollection, ParseContext};
//! use querykit_core::params::RawParams;
//! use querykit_core::types::{FilterMap, FilterValue};
//!
//! let params = RawParams::new().with("count.gte", "1").with("count.lt", "10");
//! let renames = AttributeRenames::new();
//! let ctx = ParseContext::new(&renames, &params, DecodeOptions::default());
//!
//! let filters = FilterCollection::new(&params, &FilterMap::new(), &ctx)
//!     .unwrap()
//!     .parse()
//!     .unwrap();
//! let count = filters["count"].as_map().unwrap();
//! assert_eq!(count["$gte"], FilterValue::Integer(1));
//! assert_eq!(count["$lt"], FilterValue::Integer(10));
//! ```

mod coerce;
mod collection;
mod datetime;
mod error;
mod json;
mod node;
mod rename;
mod split;

// Re-export public API from coercion
pub use coerce::{
    coerce, coerce_value, parse_number, parse_regex, split_list, unescape, ValueParser,
};

// Re-export public API from date/time recognition
pub use datetime::{looks_like_date_time, parse_date_time};

// Re-export public API from collections and nodes
pub use collection::{FilterCollection, ParseContext};
pub use node::{FilterNode, NodeValue};

// Re-export remaining public API
pub use error::FilterError;
pub use json::{decode_group, group_branches, DecodeOptions};
pub use rename::{AttributeRenames, RenameRule, ValueTransform};
pub use split::{split_attribute, split_key};
