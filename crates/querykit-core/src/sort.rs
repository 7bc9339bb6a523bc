//! Sort specification parsing.
//!
//! Sort items come from the `order_by` parameter (a `|`-separated string or a
//! list) or, when it is absent, from the configured defaults. Each item names
//! an attribute and a direction:
//!
//! | Form          | Example                    | Result            |
//! |---------------|----------------------------|-------------------|
//! | field         | `title`                    | `title` asc       |
//! | suffixed      | `created_at.desc`          | `created_at` desc |
//! | pre-split     | `PreSplit(hits, desc)`     | `hits` desc       |
//! | map           | `{"hits": "desc"}`         | `hits` desc       |
//!
//! Sort renames replace the attribute name only.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::filter::{split_key, unescape, AttributeRenames};
use crate::params::RawParams;
use crate::types::{Direction, FilterMap, FilterValue, PreSplitAttribute};

/// Name of the sort parameter.
pub const ORDER_BY_PARAMETER: &str = "order_by";

/// Error type for sort item parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    /// A value that is neither a field string nor a single-entry map.
    #[error("invalid sort item {item}: {message}")]
    InvalidItem { item: String, message: String },
}

/// One requested sort item, before renaming.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "FilterValue")]
pub enum SortItem {
    /// `title` or `title.desc`.
    Field(String),
    /// Attribute with its direction already attached.
    PreSplit(PreSplitAttribute),
    /// Single-entry map form.
    Pair(String, Direction),
}

impl SortItem {
    /// Read a sort item from a string or a single-entry map.
    pub fn from_value(value: &FilterValue) -> Result<Self, SortError> {
        let invalid = |message: &str| SortError::InvalidItem {
            item: describe(value),
            message: message.to_string(),
        };
        match value {
            FilterValue::String(field) => Ok(SortItem::Field(field.clone())),
            FilterValue::Map(entries) => {
                let mut iter = entries.iter();
                match (iter.next(), iter.next()) {
                    (Some((attribute, direction)), None) => {
                        let direction = Direction::from_value(direction)
                            .ok_or_else(|| invalid("direction must be asc, desc, 1 or -1"))?;
                        Ok(SortItem::Pair(attribute.clone(), direction))
                    }
                    _ => Err(invalid("expected exactly one attribute")),
                }
            }
            _ => Err(invalid("expected a field name or a single-entry map")),
        }
    }

    /// Split into base attribute and direction.
    fn resolve(&self) -> (&str, Direction) {
        match self {
            SortItem::Field(field) => match split_key(field) {
                (attribute, Some(op)) if op.is_direction() => {
                    (attribute, op.direction().unwrap_or_default())
                }
                _ => (field.as_str(), Direction::Asc),
            },
            SortItem::PreSplit(attr) => (
                attr.name.as_str(),
                attr.operator.direction().unwrap_or_default(),
            ),
            SortItem::Pair(attribute, direction) => (attribute.as_str(), *direction),
        }
    }
}

impl TryFrom<FilterValue> for SortItem {
    type Error = SortError;

    fn try_from(value: FilterValue) -> Result<Self, Self::Error> {
        SortItem::from_value(&value)
    }
}

impl From<&str> for SortItem {
    fn from(field: &str) -> Self {
        SortItem::Field(field.to_string())
    }
}

fn describe(value: &FilterValue) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.type_name().to_string())
}

/// How a sort clause renders its direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortRepresentation {
    /// `{"title": "asc"}`
    #[default]
    Symbolic,
    /// `{"title": 1}`
    Numeric,
}

/// A resolved sort clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortClause {
    /// Attribute name after renaming.
    pub attribute: String,
    /// Direction.
    pub direction: Direction,
}

impl SortClause {
    /// Create a clause.
    pub fn new(attribute: impl Into<String>, direction: Direction) -> Self {
        Self {
            attribute: attribute.into(),
            direction,
        }
    }

    /// Render as a single-entry map.
    pub fn render(&self, representation: SortRepresentation) -> FilterMap {
        let direction = match representation {
            SortRepresentation::Symbolic => FilterValue::from(self.direction.name()),
            SortRepresentation::Numeric => FilterValue::Integer(self.direction.signum()),
        };
        let mut map = FilterMap::new();
        map.insert(self.attribute.clone(), direction);
        map
    }
}

/// Parses sort items into ordered clauses.
///
/// Request values never produce [`SortItem::PreSplit`]; callers holding
/// tagged attribute/direction objects pass them through
/// [`SortSpecParser::parse_items`] (or configure them as defaults).
#[derive(Debug, Clone, Copy)]
pub struct SortSpecParser<'a> {
    defaults: &'a [SortItem],
    renames: &'a AttributeRenames,
}

impl<'a> SortSpecParser<'a> {
    /// Create a parser with default items and rename rules.
    pub fn new(defaults: &'a [SortItem], renames: &'a AttributeRenames) -> Self {
        Self { defaults, renames }
    }

    /// Parse `order_by` from the request, falling back to the defaults when
    /// the parameter is absent. A present `order_by` fully replaces them.
    pub fn parse(&self, params: &RawParams) -> Vec<SortClause> {
        match params.get(ORDER_BY_PARAMETER) {
            Some(value) => self.parse_value(value),
            None => self.parse_items(self.defaults),
        }
    }

    /// Parse an `order_by` value: a `|`-separated (percent-encoded) string,
    /// a list of items, or a map of attribute to direction.
    pub fn parse_value(&self, value: &FilterValue) -> Vec<SortClause> {
        let items: Vec<SortItem> = match value {
            FilterValue::String(spec) => unescape(spec)
                .split('|')
                .filter(|field| !field.is_empty())
                .map(SortItem::from)
                .collect(),
            FilterValue::List(values) => values.iter().filter_map(read_item).collect(),
            FilterValue::Map(entries) => entries
                .iter()
                .filter_map(|(attribute, direction)| {
                    let mut single = FilterMap::new();
                    single.insert(attribute.clone(), direction.clone());
                    read_item(&FilterValue::Map(single))
                })
                .collect(),
            other => {
                warn!("ignoring {} order_by value", other.type_name());
                Vec::new()
            }
        };
        self.parse_items(&items)
    }

    /// Resolve items in positional order.
    pub fn parse_items(&self, items: &[SortItem]) -> Vec<SortClause> {
        items
            .iter()
            .map(|item| {
                let (attribute, direction) = item.resolve();
                SortClause::new(self.renames.resolve_name(attribute), direction)
            })
            .collect()
    }
}

fn read_item(value: &FilterValue) -> Option<SortItem> {
    match SortItem::from_value(value) {
        Ok(item) => Some(item),
        Err(e) => {
            warn!("skipping sort item: {}", e);
            None
        }
    }
}
