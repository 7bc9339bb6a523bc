//! A single resolved filter.
//!
//! A [`FilterNode`] is built from one raw parameter: its key is split into
//! attribute and operator, the attribute is renamed, and its value is coerced
//! and transformed. Nodes for the same attribute are later merged into one
//! rendered value by [`FilterCollection`].

use indexmap::IndexMap;
use tracing::trace;

use super::coerce::{coerce_value, unescape};
use super::collection::{FilterCollection, ParseContext};
use super::error::FilterError;
use super::json::{decode_group, group_branches};
use super::split::split_attribute;
use crate::types::{AttributeKey, FilterMap, FilterValue, Operator};

/// Resolved value of a filter node.
#[derive(Debug, Clone)]
pub enum NodeValue {
    /// Equality value (`{attribute: value}`).
    Plain(FilterValue),
    /// Operator map (`{attribute: {"$gte": 1, "$lt": 10}}`).
    Conditions(IndexMap<Operator, FilterValue>),
    /// `$or` branches, each an independent collection.
    Group(Vec<FilterCollection>),
}

/// One filter: a renamed attribute, its operator and its resolved value.
#[derive(Debug, Clone)]
pub struct FilterNode {
    attribute: String,
    operator: Option<Operator>,
    value: NodeValue,
    raw_attribute: AttributeKey,
    raw_value: FilterValue,
}

impl FilterNode {
    /// Resolve a raw parameter into a node.
    ///
    /// Only comparison and array operators are kept. Any other suffix
    /// (`asc`, `desc`, or `or` on a non-grouping key) is dropped, leaving a
    /// plain equality filter on the base attribute.
    pub fn resolve(
        raw_attribute: AttributeKey,
        raw_value: FilterValue,
        ctx: &ParseContext<'_>,
    ) -> Result<Self, FilterError> {
        let (base, operator) = split_attribute(&raw_attribute);
        let attribute = ctx.renames.resolve_name(&base).to_string();

        let (operator, value) = if raw_attribute.is_grouping() {
            let branches = decode_branches(&raw_value, ctx)?;
            (Some(Operator::Or), NodeValue::Group(branches))
        } else {
            match operator.filter(Operator::is_conditional) {
                Some(op) => {
                    let coerced = coerce_value(&raw_value, Some(op))?;
                    let value = ctx.renames.resolve_value(&base, coerced, ctx.params);
                    let mut conditions = IndexMap::new();
                    conditions.insert(op, value);
                    (Some(op), NodeValue::Conditions(conditions))
                }
                None => {
                    let coerced = coerce_value(&raw_value, None)?;
                    let value = ctx.renames.resolve_value(&base, coerced, ctx.params);
                    (None, NodeValue::Plain(value))
                }
            }
        };

        trace!("resolved `{}` to attribute `{}`", raw_attribute, attribute);
        Ok(FilterNode {
            attribute,
            operator,
            value,
            raw_attribute,
            raw_value,
        })
    }

    /// Attribute name after renaming.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Operator, if any (`$or` for grouping nodes).
    pub fn operator(&self) -> Option<Operator> {
        self.operator
    }

    /// Resolved value.
    pub fn value(&self) -> &NodeValue {
        &self.value
    }

    /// Key as it appeared in the request.
    pub fn raw_attribute(&self) -> &AttributeKey {
        &self.raw_attribute
    }

    /// Value as it appeared in the request.
    pub fn raw_value(&self) -> &FilterValue {
        &self.raw_value
    }

    /// Returns true for `$or` grouping nodes.
    pub fn is_group(&self) -> bool {
        matches!(self.value, NodeValue::Group(_))
    }

    /// The sole branch of a grouping node with exactly one branch.
    pub(crate) fn single_branch(&self) -> Option<&FilterCollection> {
        match &self.value {
            NodeValue::Group(branches) if branches.len() == 1 => branches.first(),
            _ => None,
        }
    }

    /// Returns true if this is a grouping node and some branch filters the
    /// same attribute with the same array operator as `other`.
    pub fn includes(&self, other: &FilterNode) -> bool {
        let NodeValue::Group(branches) = &self.value else {
            return false;
        };
        let Some(op) = other.operator.filter(Operator::is_array) else {
            return false;
        };
        branches.iter().any(|branch| {
            branch
                .nodes()
                .iter()
                .any(|node| node.attribute == other.attribute && node.operator == Some(op))
        })
    }

    /// Fold `other` (a node for the same attribute) into this one.
    ///
    /// - A grouping node adds `other` to every branch.
    /// - Two operator maps combine: array operators concatenate their lists,
    ///   other operators take the incoming value.
    /// - Anything else cannot be combined.
    pub fn merge(&mut self, other: FilterNode) -> Result<(), FilterError> {
        if let NodeValue::Group(branches) = &mut self.value {
            for branch in branches.iter_mut() {
                branch.push(other.clone());
                branch.parse()?;
            }
            return Ok(());
        }

        match (&mut self.value, other.value) {
            (NodeValue::Conditions(mine), NodeValue::Conditions(theirs)) => {
                for (op, value) in theirs {
                    merge_condition(mine, op, value);
                }
                Ok(())
            }
            _ => Err(FilterError::MixedArgument {
                left: self.raw_attribute.to_string(),
                right: other.raw_attribute.to_string(),
            }),
        }
    }

    /// Render the value placed under this node's attribute.
    pub fn render(&self) -> Result<FilterValue, FilterError> {
        match &self.value {
            NodeValue::Plain(value) => Ok(value.clone()),
            NodeValue::Conditions(conditions) => Ok(FilterValue::Map(
                conditions
                    .iter()
                    .map(|(op, value)| (op.tag().to_string(), value.clone()))
                    .collect(),
            )),
            NodeValue::Group(branches) => branches
                .iter()
                .map(|branch| branch.parse().map(FilterValue::Map))
                .collect::<Result<Vec<_>, _>>()
                .map(FilterValue::List),
        }
    }
}

fn merge_condition(
    conditions: &mut IndexMap<Operator, FilterValue>,
    op: Operator,
    value: FilterValue,
) {
    if op.is_array() {
        if let Some(existing) = conditions.get_mut(&op) {
            let mut items = std::mem::take(existing).into_list();
            items.extend(value.into_list());
            *existing = FilterValue::List(items);
            return;
        }
    }
    conditions.insert(op, value);
}

fn decode_branches(
    raw_value: &FilterValue,
    ctx: &ParseContext<'_>,
) -> Result<Vec<FilterCollection>, FilterError> {
    let branches: Vec<FilterMap> = match raw_value {
        FilterValue::String(payload) => decode_group(&unescape(payload), ctx.options)?,
        other => group_branches(other.clone())?,
    };
    branches
        .into_iter()
        .map(|branch| FilterCollection::branch(branch, ctx))
        .collect()
}
