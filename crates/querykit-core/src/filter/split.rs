//! Attribute/operator splitting.
//!
//! A parameter key such as `count.gte` names an attribute (`count`) and an
//! operator (`gte`). Only the last dot-separated segment is considered, and
//! only when it names a known operator: `program.title` is a nested attribute
//! path, not an operator.

use crate::types::{AttributeKey, Operator};

/// Split `key` on a trailing `.<operator>` suffix.
///
/// Every known operator is recognised here, including `asc`, `desc` and `or`.
/// Keys without a recognised suffix are returned whole.
pub fn split_key(key: &str) -> (&str, Option<Operator>) {
    if let Some((attribute, suffix)) = key.rsplit_once('.') {
        if let Some(op) = Operator::parse(suffix) {
            return (attribute, Some(op));
        }
    }
    (key, None)
}

/// Split an attribute key into its base attribute and operator.
///
/// The literal key `or` always maps to the `$or` grouping operator. Pre-split
/// keys are returned as given.
pub fn split_attribute(key: &AttributeKey) -> (String, Option<Operator>) {
    match key {
        AttributeKey::PreSplit(attr) => (attr.name.clone(), Some(attr.operator)),
        AttributeKey::Raw(_) if key.is_grouping() => {
            (Operator::Or.tag().to_string(), Some(Operator::Or))
        }
        AttributeKey::Raw(raw) => {
            let (attribute, op) = split_key(raw);
            (attribute.to_string(), op)
        }
    }
}
