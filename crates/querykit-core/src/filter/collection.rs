//! Filter collections.
//!
//! A [`FilterCollection`] turns an ordered set of raw parameters into the
//! final filter map:
//!
//! 1. Every parameter is resolved into a [`FilterNode`].
//! 2. If an `$or` node is present and has a single branch, the branch's
//!    filters are lifted to the top level and the `$or` disappears.
//! 3. Otherwise, filters whose attribute and array operator also appear in
//!    some `$or` branch are moved into every branch.
//! 4. Remaining nodes are merged per attribute, in encounter order.
//! 5. The merged filters are rendered over the defaults, which they override.

use indexmap::IndexMap;
use tracing::debug;

use super::error::FilterError;
use super::json::DecodeOptions;
use super::node::FilterNode;
use super::rename::AttributeRenames;
use crate::params::RawParams;
use crate::types::FilterMap;

/// Shared inputs while resolving nodes.
///
/// Only needed during construction. Resolved collections render without it.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    /// Rename rules, applied at every level including `$or` branches.
    pub renames: &'a AttributeRenames,
    /// Request parameters handed to value transforms.
    pub params: &'a RawParams,
    /// `or` payload decoding options.
    pub options: DecodeOptions,
}

impl<'a> ParseContext<'a> {
    /// Create a context.
    pub fn new(renames: &'a AttributeRenames, params: &'a RawParams, options: DecodeOptions) -> Self {
        Self {
            renames,
            params,
            options,
        }
    }
}

/// An ordered set of resolved filters plus default filters.
#[derive(Debug, Clone, Default)]
pub struct FilterCollection {
    nodes: Vec<FilterNode>,
    defaults: FilterMap,
}

impl FilterCollection {
    /// Resolve `params` into nodes.
    ///
    /// Defaults are renamed and transformed, but their values are taken as
    /// given (no coercion) and their keys are not split on operators.
    pub fn new(
        params: &RawParams,
        defaults: &FilterMap,
        ctx: &ParseContext<'_>,
    ) -> Result<Self, FilterError> {
        let nodes = params
            .iter()
            .map(|(key, value)| FilterNode::resolve(key.clone(), value.clone(), ctx))
            .collect::<Result<Vec<_>, _>>()?;

        let defaults = defaults
            .iter()
            .map(|(attribute, value)| {
                (
                    ctx.renames.resolve_name(attribute).to_string(),
                    ctx.renames
                        .resolve_value(attribute, value.clone(), ctx.params),
                )
            })
            .collect();

        Ok(FilterCollection { nodes, defaults })
    }

    /// An `$or` branch: same rules, no defaults.
    pub(crate) fn branch(raw: FilterMap, ctx: &ParseContext<'_>) -> Result<Self, FilterError> {
        Self::new(&RawParams::from(raw), &FilterMap::new(), ctx)
    }

    /// Resolved nodes, in encounter order.
    pub fn nodes(&self) -> &[FilterNode] {
        &self.nodes
    }

    pub(crate) fn push(&mut self, node: FilterNode) {
        self.nodes.push(node);
    }

    /// Merge and render the collection.
    pub fn parse(&self) -> Result<FilterMap, FilterError> {
        let mut merged: IndexMap<String, FilterNode> = IndexMap::new();
        for node in self.optimized_nodes()? {
            match merged.get_mut(node.attribute()) {
                Some(existing) => existing.merge(node)?,
                None => {
                    merged.insert(node.attribute().to_string(), node);
                }
            }
        }

        let mut result = self.defaults.clone();
        for (attribute, node) in merged {
            result.insert(attribute, node.render()?);
        }
        Ok(result)
    }

    /// Apply `$or` collapsing and distribution to a copy of the nodes.
    ///
    /// Only the first `$or` node is considered.
    fn optimized_nodes(&self) -> Result<Vec<FilterNode>, FilterError> {
        let mut nodes = self.nodes.clone();
        let Some(index) = nodes.iter().position(FilterNode::is_group) else {
            return Ok(nodes);
        };

        if let Some(branch) = nodes[index].single_branch() {
            let lifted = branch.nodes.clone();
            debug!(
                "collapsing single-branch $or into {} top-level filters",
                lifted.len()
            );
            nodes.remove(index);
            nodes.extend(lifted);
            return Ok(nodes);
        }

        let mut group = nodes.remove(index);
        let mut standing = Vec::with_capacity(nodes.len() + 1);
        let mut distributed = Vec::new();
        let mut group_position = 0;
        for (position, node) in nodes.into_iter().enumerate() {
            if group.includes(&node) {
                distributed.push(node);
            } else {
                if position < index {
                    group_position += 1;
                }
                standing.push(node);
            }
        }

        for node in distributed {
            debug!("distributing `{}` into every $or branch", node.raw_attribute());
            group.merge(node)?;
        }
        standing.insert(group_position, group);
        Ok(standing)
    }
}
