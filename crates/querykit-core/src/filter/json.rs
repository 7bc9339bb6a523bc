//! JSON decoding of `or` payloads.
//!
//! The `or` parameter carries a JSON array of objects, each object being a
//! flat attribute map with the same key syntax as the top-level parameters:
//!
//! ```json
//! [{"tags.in": ["Value", "Other Value"]}, {"tags.nin": ["Yup", "Yeah"]}]
//! ```
//!
//! String leaves inside branches are coerced later like any other raw value.
//! With [`DecodeOptions::parse_json_times`] set, date-shaped string leaves
//! are turned into timestamps while decoding.

use serde::{Deserialize, Serialize};

use super::datetime::parse_date_time;
use super::error::FilterError;
use crate::types::{FilterMap, FilterValue};

/// Options for decoding `or` payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Convert date-shaped string leaves to timestamps while decoding.
    pub parse_json_times: bool,
}

/// Decode a (percent-decoded) JSON `or` payload into its branch maps.
pub fn decode_group(payload: &str, options: DecodeOptions) -> Result<Vec<FilterMap>, FilterError> {
    let json: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| FilterError::group(format!("invalid JSON: {e}")))?;
    let value = FilterValue::from(json);
    let value = if options.parse_json_times {
        convert_times(value)?
    } else {
        value
    };
    group_branches(value)
}

/// Interpret an already structured `or` value as a list of branch maps.
pub fn group_branches(value: FilterValue) -> Result<Vec<FilterMap>, FilterError> {
    let items = match value {
        FilterValue::List(items) => items,
        other => {
            return Err(FilterError::group(format!(
                "expected a list of attribute maps, found {}",
                other.type_name()
            )))
        }
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            FilterValue::Map(branch) => Ok(branch),
            other => Err(FilterError::group(format!(
                "branch {index} is a {}, expected an attribute map",
                other.type_name()
            ))),
        })
        .collect()
}

fn convert_times(value: FilterValue) -> Result<FilterValue, FilterError> {
    match value {
        FilterValue::String(s) => match parse_date_time(&s) {
            Some(result) => result.map(FilterValue::DateTime),
            None => Ok(FilterValue::String(s)),
        },
        FilterValue::List(items) => items
            .into_iter()
            .map(convert_times)
            .collect::<Result<Vec<_>, _>>()
            .map(FilterValue::List),
        FilterValue::Map(entries) => entries
            .into_iter()
            .map(|(key, value)| convert_times(value).map(|value| (key, value)))
            .collect::<Result<FilterMap, _>>()
            .map(FilterValue::Map),
        other => Ok(other),
    }
}
