//! Attribute renaming and value transforms.
//!
//! A rename maps a request-facing attribute name to the stored attribute
//! name (`names` -> `tags`). A transform rename also rewrites the coerced
//! value, with the full request parameters available to the conversion
//! (`status` -> `status_for_product`, keyed on `product_id`).

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::params::RawParams;
use crate::types::FilterValue;

/// Value conversion applied by a transform rename.
pub type ValueTransform = Arc<dyn Fn(FilterValue, &RawParams) -> FilterValue + Send + Sync>;

/// A single rename rule.
#[derive(Clone)]
pub enum RenameRule {
    /// Rename only.
    Name(String),
    /// Rename and convert the value.
    Transform {
        /// Target attribute name.
        to: String,
        /// Conversion applied to the coerced value.
        convert: ValueTransform,
    },
}

impl RenameRule {
    /// The target attribute name.
    pub fn target(&self) -> &str {
        match self {
            RenameRule::Name(to) => to,
            RenameRule::Transform { to, .. } => to,
        }
    }
}

impl fmt::Debug for RenameRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenameRule::Name(to) => f.debug_tuple("Name").field(to).finish(),
            RenameRule::Transform { to, .. } => f
                .debug_struct("Transform")
                .field("to", to)
                .finish_non_exhaustive(),
        }
    }
}

/// Rename rules keyed by base attribute name (the attribute before renaming,
/// without its operator suffix).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(from = "IndexMap<String, String>", into = "IndexMap<String, String>")]
pub struct AttributeRenames {
    rules: IndexMap<String, RenameRule>,
}

impl AttributeRenames {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain rename.
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rules.insert(from.into(), RenameRule::Name(to.into()));
        self
    }

    /// Add a rename that also converts the value.
    pub fn transform<F>(mut self, from: impl Into<String>, to: impl Into<String>, convert: F) -> Self
    where
        F: Fn(FilterValue, &RawParams) -> FilterValue + Send + Sync + 'static,
    {
        self.rules.insert(
            from.into(),
            RenameRule::Transform {
                to: to.into(),
                convert: Arc::new(convert),
            },
        );
        self
    }

    /// Look up the rule for a base attribute.
    pub fn get(&self, attribute: &str) -> Option<&RenameRule> {
        self.rules.get(attribute)
    }

    /// Returns true if no rules are configured.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The attribute name after renaming.
    pub fn resolve_name<'a>(&'a self, attribute: &'a str) -> &'a str {
        self.get(attribute).map_or(attribute, RenameRule::target)
    }

    /// The value after any transform registered for `attribute`.
    pub fn resolve_value(
        &self,
        attribute: &str,
        value: FilterValue,
        params: &RawParams,
    ) -> FilterValue {
        match self.get(attribute) {
            Some(RenameRule::Transform { convert, .. }) => convert(value, params),
            _ => value,
        }
    }
}

impl From<IndexMap<String, String>> for AttributeRenames {
    fn from(names: IndexMap<String, String>) -> Self {
        names
            .into_iter()
            .fold(AttributeRenames::new(), |renames, (from, to)| {
                renames.rename(from, to)
            })
    }
}

/// Transform rules are dropped: only the name form is serializable.
impl From<AttributeRenames> for IndexMap<String, String> {
    fn from(renames: AttributeRenames) -> Self {
        renames
            .rules
            .into_iter()
            .filter_map(|(from, rule)| match rule {
                RenameRule::Name(to) => Some((from, to)),
                RenameRule::Transform { .. } => None,
            })
            .collect()
    }
}
