//! Request options that are not filters: reserved parameter names,
//! pagination and field projection.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::filter::{split_list, unescape};
use crate::params::RawParams;
use crate::sort::ORDER_BY_PARAMETER;
use crate::types::FilterValue;

/// Framework routing parameters.
pub const FRAMEWORK_PARAMETERS: [&str; 3] = ["controller", "action", "format"];

/// Pagination parameters.
pub const PAGINATION_PARAMETERS: [&str; 2] = ["per_page", "page"];

/// Parameter whose presence disables default filters.
pub const DISABLE_DEFAULT_FILTERS: &str = "disable_default_filters";

/// Field projection parameters, in precedence order.
pub const FIELD_FILTERING_PARAMETERS: [&str; 2] = ["only", "except"];

// ============================================================================
// Reserved Parameters
// ============================================================================

/// Parameter names excluded from filter parsing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ReservedParameters {
    names: Vec<String>,
}

impl Default for ReservedParameters {
    fn default() -> Self {
        let names = FRAMEWORK_PARAMETERS
            .iter()
            .chain(PAGINATION_PARAMETERS.iter())
            .chain([ORDER_BY_PARAMETER, DISABLE_DEFAULT_FILTERS].iter())
            .chain(FIELD_FILTERING_PARAMETERS.iter())
            .map(|name| name.to_string())
            .collect();
        Self { names }
    }
}

impl ReservedParameters {
    /// Use exactly the given names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if `name` is reserved.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|reserved| reserved == name)
    }

    /// Reserved names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Copy of `params` without reserved keys.
    pub fn strip(&self, params: &RawParams) -> RawParams {
        params.without(self.names())
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// Page size and page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PaginationOptions {
    /// Items per page.
    pub per_page: u64,
    /// One-based page number.
    pub page: u64,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            per_page: 12,
            page: 1,
        }
    }
}

impl PaginationOptions {
    /// These options, overridden by positive integer `per_page` and `page`
    /// parameters. Unusable values are logged and ignored.
    pub fn resolve(&self, params: &RawParams) -> PaginationOptions {
        PaginationOptions {
            per_page: positive(params, "per_page").unwrap_or(self.per_page),
            page: positive(params, "page").unwrap_or(self.page),
        }
    }
}

fn positive(params: &RawParams, name: &str) -> Option<u64> {
    let value = params.get(name)?;
    let parsed = match value {
        FilterValue::Integer(n) => u64::try_from(*n).ok(),
        FilterValue::String(s) => unescape(s).trim().parse::<u64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n > 0 => Some(n),
        _ => {
            warn!("ignoring {} value {:?}", name, value);
            None
        }
    }
}

// ============================================================================
// Field Projection
// ============================================================================

/// Which fields to return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldProjection {
    /// Return only these fields.
    Only(Vec<String>),
    /// Return everything but these fields.
    Except(Vec<String>),
}

impl FieldProjection {
    /// Read `only` (preferred) or `except` from the request.
    pub fn from_params(params: &RawParams) -> Option<Self> {
        if let Some(fields) = params.get("only").and_then(field_list) {
            return Some(FieldProjection::Only(fields));
        }
        params
            .get("except")
            .and_then(field_list)
            .map(FieldProjection::Except)
    }

    /// The listed fields.
    pub fn fields(&self) -> &[String] {
        match self {
            FieldProjection::Only(fields) | FieldProjection::Except(fields) => fields,
        }
    }
}

/// `a|b|c`, or a list of strings. Empty values count as absent.
fn field_list(value: &FilterValue) -> Option<Vec<String>> {
    let fields: Vec<String> = match value {
        FilterValue::String(s) => split_list(&unescape(s)).map(str::to_string).collect(),
        FilterValue::List(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };
    (!fields.is_empty()).then_some(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reserved_parameters() {
        let reserved = ReservedParameters::default();
        for name in [
            "controller",
            "action",
            "format",
            "per_page",
            "page",
            "order_by",
            "disable_default_filters",
            "only",
            "except",
        ] {
            assert!(reserved.contains(name), "{name}");
        }
        assert!(!reserved.contains("title"));
    }

    #[test]
    fn test_strip_reserved() {
        let params = RawParams::new()
            .with("controller", "videos")
            .with("title", "x")
            .with("order_by", "title");
        let stripped = ReservedParameters::default().strip(&params);
        assert_eq!(stripped.len(), 1);
        assert!(stripped.contains_key("title"));
    }

    #[test]
    fn test_pagination_defaults_and_overrides() {
        let defaults = PaginationOptions::default();
        assert_eq!(defaults, PaginationOptions { per_page: 12, page: 1 });

        let params = RawParams::new().with("page", "3").with("per_page", FilterValue::Integer(50));
        assert_eq!(
            defaults.resolve(&params),
            PaginationOptions { per_page: 50, page: 3 }
        );
    }

    #[test]
    fn test_pagination_ignores_bad_values() {
        let params = RawParams::new().with("page", "0").with("per_page", "lots");
        assert_eq!(
            PaginationOptions::default().resolve(&params),
            PaginationOptions::default()
        );
    }

    #[test]
    fn test_projection_only_wins() {
        let params = RawParams::new().with("except", "body").with("only", "title%7Cbody");
        assert_eq!(
            FieldProjection::from_params(&params),
            Some(FieldProjection::Only(vec!["title".to_string(), "body".to_string()]))
        );
    }

    #[test]
    fn test_projection_except_and_absent() {
        let params = RawParams::new().with(
            "except",
            FilterValue::List(vec!["created_at".into(), FilterValue::Integer(1)]),
        );
        assert_eq!(
            FieldProjection::from_params(&params),
            Some(FieldProjection::Except(vec!["created_at".to_string()]))
        );
        assert_eq!(FieldProjection::from_params(&RawParams::new()), None);
        assert_eq!(
            FieldProjection::from_params(&RawParams::new().with("only", "")),
            None
        );
    }

    #[test]
    fn test_projection_serializes_by_kind() {
        let json = serde_json::to_value(FieldProjection::Only(vec!["title".to_string()])).unwrap();
        assert_eq!(json, serde_json::json!({"only": ["title"]}));
    }
}
