//! Shared value types for filter and sort parsing.
//!
//! These types are used throughout querykit to represent:
//! - Operators recognised as attribute suffixes (`tags.all`, `count.gte`)
//! - Attribute keys, either raw strings or pre-split name/operator pairs
//! - Coerced filter values (numbers, dates, regexes, lists, nested maps)

use std::fmt;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Encounter-ordered, string-keyed map used for raw branches, defaults and output.
///
/// Equality ignores key order.
pub type FilterMap = IndexMap<String, FilterValue>;

// ============================================================================
// Operators
// ============================================================================

/// Every operator recognised as an attribute suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `$exists`
    Exists,
    /// `$gte`
    Gte,
    /// `$gt`
    Gt,
    /// `$lte`
    Lte,
    /// `$lt`
    Lt,
    /// `$ne`
    Ne,
    /// `$size`
    Size,
    /// `$near`
    Near,
    /// `$within`
    Within,
    /// `$all` (array-valued)
    All,
    /// `$in` (array-valued)
    In,
    /// `$nin` (array-valued)
    Nin,
    /// `$or` grouping operator.
    Or,
    /// Ascending sort direction.
    Asc,
    /// Descending sort direction.
    Desc,
}

impl Operator {
    /// Comparison operators whose operand is a single value.
    pub const COMPARISON: [Operator; 9] = [
        Operator::Exists,
        Operator::Gte,
        Operator::Gt,
        Operator::Lte,
        Operator::Lt,
        Operator::Ne,
        Operator::Size,
        Operator::Near,
        Operator::Within,
    ];

    /// Operators whose operand is always a list.
    pub const ARRAY: [Operator; 3] = [Operator::All, Operator::In, Operator::Nin];

    /// Parse an operator from its suffix name (case-sensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "exists" => Some(Operator::Exists),
            "gte" => Some(Operator::Gte),
            "gt" => Some(Operator::Gt),
            "lte" => Some(Operator::Lte),
            "lt" => Some(Operator::Lt),
            "ne" => Some(Operator::Ne),
            "size" => Some(Operator::Size),
            "near" => Some(Operator::Near),
            "within" => Some(Operator::Within),
            "all" => Some(Operator::All),
            "in" => Some(Operator::In),
            "nin" => Some(Operator::Nin),
            "or" => Some(Operator::Or),
            "asc" => Some(Operator::Asc),
            "desc" => Some(Operator::Desc),
            _ => None,
        }
    }

    /// The suffix name (`gte`, `all`, `desc`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            Operator::Exists => "exists",
            Operator::Gte => "gte",
            Operator::Gt => "gt",
            Operator::Lte => "lte",
            Operator::Lt => "lt",
            Operator::Ne => "ne",
            Operator::Size => "size",
            Operator::Near => "near",
            Operator::Within => "within",
            Operator::All => "all",
            Operator::In => "in",
            Operator::Nin => "nin",
            Operator::Or => "or",
            Operator::Asc => "asc",
            Operator::Desc => "desc",
        }
    }

    /// The external operator tag used in rendered filters (`$gte`, `$or`, ...).
    pub fn tag(&self) -> &'static str {
        match self {
            Operator::Exists => "$exists",
            Operator::Gte => "$gte",
            Operator::Gt => "$gt",
            Operator::Lte => "$lte",
            Operator::Lt => "$lt",
            Operator::Ne => "$ne",
            Operator::Size => "$size",
            Operator::Near => "$near",
            Operator::Within => "$within",
            Operator::All => "$all",
            Operator::In => "$in",
            Operator::Nin => "$nin",
            Operator::Or => "$or",
            Operator::Asc => "$asc",
            Operator::Desc => "$desc",
        }
    }

    /// Returns true for `all`, `in` and `nin`.
    pub fn is_array(&self) -> bool {
        matches!(self, Operator::All | Operator::In | Operator::Nin)
    }

    /// Returns true for comparison and array operators.
    pub fn is_conditional(&self) -> bool {
        self.is_array() || Self::COMPARISON.contains(self)
    }

    /// Returns true for `asc` and `desc`.
    pub fn is_direction(&self) -> bool {
        matches!(self, Operator::Asc | Operator::Desc)
    }

    /// The sort direction this operator names, if any.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Operator::Asc => Some(Direction::Asc),
            Operator::Desc => Some(Direction::Desc),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending (the default when no direction is given).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl Direction {
    /// Read a direction from `"asc"`/`"desc"` (any case) or `1`/`-1`.
    pub fn from_value(value: &FilterValue) -> Option<Self> {
        match value {
            FilterValue::String(s) if s.eq_ignore_ascii_case("asc") => Some(Direction::Asc),
            FilterValue::String(s) if s.eq_ignore_ascii_case("desc") => Some(Direction::Desc),
            FilterValue::Integer(1) => Some(Direction::Asc),
            FilterValue::Integer(-1) => Some(Direction::Desc),
            _ => None,
        }
    }

    /// Symbolic name (`asc` / `desc`).
    pub fn name(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }

    /// Numeric marker (`1` / `-1`).
    pub fn signum(&self) -> i64 {
        match self {
            Direction::Asc => 1,
            Direction::Desc => -1,
        }
    }
}

// ============================================================================
// Attribute Keys
// ============================================================================

/// An attribute that already carries its operator, so no suffix matching is done.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreSplitAttribute {
    /// Attribute path (e.g. `names` or `program.title`).
    pub name: String,
    /// Operator attached to the attribute.
    pub operator: Operator,
}

impl PreSplitAttribute {
    /// Create a new pre-split attribute.
    pub fn new(name: impl Into<String>, operator: Operator) -> Self {
        Self {
            name: name.into(),
            operator,
        }
    }
}

/// Key of a raw request parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeKey {
    /// Plain string key, split on a trailing `.<operator>` suffix.
    Raw(String),
    /// Key that was split by the caller.
    PreSplit(PreSplitAttribute),
}

impl AttributeKey {
    /// The literal key naming the grouping operator.
    pub const GROUPING: &'static str = "or";

    /// Returns true for the reserved `or` key.
    pub fn is_grouping(&self) -> bool {
        matches!(self, AttributeKey::Raw(key) if key == Self::GROUPING)
    }

    /// The raw string key, if this is not a pre-split attribute.
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            AttributeKey::Raw(key) => Some(key),
            AttributeKey::PreSplit(_) => None,
        }
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKey::Raw(key) => f.write_str(key),
            AttributeKey::PreSplit(attr) => write!(f, "{}.{}", attr.name, attr.operator),
        }
    }
}

impl From<&str> for AttributeKey {
    fn from(key: &str) -> Self {
        AttributeKey::Raw(key.to_string())
    }
}

impl From<String> for AttributeKey {
    fn from(key: String) -> Self {
        AttributeKey::Raw(key)
    }
}

impl From<PreSplitAttribute> for AttributeKey {
    fn from(attr: PreSplitAttribute) -> Self {
        AttributeKey::PreSplit(attr)
    }
}

// ============================================================================
// Regex Literals
// ============================================================================

/// A `/pattern/flags` literal, kept as text for the downstream query layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexLiteral {
    /// Pattern between the slashes.
    pub pattern: String,
    /// Subset of `i`, `m`, `x`.
    pub flags: String,
}

impl RegexLiteral {
    /// Create a literal from a pattern and flags.
    pub fn new(pattern: impl Into<String>, flags: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            flags: flags.into(),
        }
    }

    /// Compile into a [`Regex`], mapping `i`, `m` and `x` onto the builder switches.
    pub fn compile(&self) -> Result<Regex, regex::Error> {
        RegexBuilder::new(&self.pattern)
            .case_insensitive(self.flags.contains('i'))
            .multi_line(self.flags.contains('m'))
            .ignore_whitespace(self.flags.contains('x'))
            .build()
    }
}

impl fmt::Display for RegexLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.pattern, self.flags)
    }
}

// ============================================================================
// Filter Values
// ============================================================================

/// A raw or coerced parameter value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FilterValue {
    /// Absent value (`nil`).
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// String (raw, or left as-is by the coercion chain).
    String(String),
    /// Timestamp.
    DateTime(DateTime<FixedOffset>),
    /// Regular expression literal.
    Regex(RegexLiteral),
    /// List of values.
    List(Vec<FilterValue>),
    /// Nested map (operator maps, `$or` branches, verbatim structured input).
    Map(FilterMap),
}

impl FilterValue {
    /// Borrow the string, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FilterValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the list, if this is a list value.
    pub fn as_list(&self) -> Option<&[FilterValue]> {
        match self {
            FilterValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the map, if this is a map value.
    pub fn as_map(&self) -> Option<&FilterMap> {
        match self {
            FilterValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Convert into a list, wrapping scalars as one-element lists.
    pub fn into_list(self) -> Vec<FilterValue> {
        match self {
            FilterValue::List(items) => items,
            other => vec![other],
        }
    }

    /// Short type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            FilterValue::Null => "null",
            FilterValue::Bool(_) => "boolean",
            FilterValue::Integer(_) => "integer",
            FilterValue::Float(_) => "float",
            FilterValue::String(_) => "string",
            FilterValue::DateTime(_) => "datetime",
            FilterValue::Regex(_) => "regex",
            FilterValue::List(_) => "list",
            FilterValue::Map(_) => "map",
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::String(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Float(value)
    }
}

impl From<DateTime<FixedOffset>> for FilterValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        FilterValue::DateTime(value)
    }
}

impl From<RegexLiteral> for FilterValue {
    fn from(value: RegexLiteral) -> Self {
        FilterValue::Regex(value)
    }
}

impl From<Vec<FilterValue>> for FilterValue {
    fn from(value: Vec<FilterValue>) -> Self {
        FilterValue::List(value)
    }
}

impl From<FilterMap> for FilterValue {
    fn from(value: FilterMap) -> Self {
        FilterValue::Map(value)
    }
}

impl From<serde_json::Value> for FilterValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FilterValue::Null,
            serde_json::Value::Bool(b) => FilterValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => FilterValue::Integer(i),
                None => FilterValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => FilterValue::String(s),
            serde_json::Value::Array(items) => {
                FilterValue::List(items.into_iter().map(FilterValue::from).collect())
            }
            serde_json::Value::Object(map) => FilterValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, FilterValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Dates render as `{"$date": <rfc3339>}` and regexes as
/// `{"$regex": <pattern>, "$options": <flags>}`.
impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterValue::Null => serializer.serialize_none(),
            FilterValue::Bool(b) => serializer.serialize_bool(*b),
            FilterValue::Integer(i) => serializer.serialize_i64(*i),
            FilterValue::Float(f) => serializer.serialize_f64(*f),
            FilterValue::String(s) => serializer.serialize_str(s),
            FilterValue::DateTime(dt) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$date", &dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))?;
                map.end()
            }
            FilterValue::Regex(re) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("$regex", &re.pattern)?;
                map.serialize_entry("$options", &re.flags)?;
                map.end()
            }
            FilterValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            FilterValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// Reads plain JSON; dates and regexes are never produced here.
impl<'de> Deserialize<'de> for FilterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(FilterValue::from)
    }
}
