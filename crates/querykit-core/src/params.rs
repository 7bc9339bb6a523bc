//! Raw request parameters.
//!
//! [`RawParams`] is the flat, encounter-ordered mapping a request handler hands
//! to querykit: attribute keys (optionally carrying an operator suffix) to raw
//! values. Values are usually strings straight off the query string, but
//! callers may also supply structured values (lists, maps, numbers), which are
//! taken verbatim.

use indexmap::IndexMap;
use percent_encoding::percent_decode_str;

use crate::types::{AttributeKey, FilterMap, FilterValue};

/// Ordered mapping from attribute keys to raw values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawParams {
    entries: IndexMap<AttributeKey, FilterValue>,
}

impl RawParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<AttributeKey>, value: impl Into<FilterValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a parameter, returning the value it replaced.
    ///
    /// A replaced key keeps its original position.
    pub fn insert(
        &mut self,
        key: impl Into<AttributeKey>,
        value: impl Into<FilterValue>,
    ) -> Option<FilterValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Look up a plain string key.
    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.entries.get(&AttributeKey::from(name))
    }

    /// Returns true if a plain string key is present (whatever its value).
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(&AttributeKey::from(name))
    }

    /// Iterate parameters in encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (&AttributeKey, &FilterValue)> {
        self.entries.iter()
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of these parameters with the given plain keys removed.
    ///
    /// Pre-split keys are never removed.
    pub fn without<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> RawParams {
        let mut entries = self.entries.clone();
        for name in names {
            entries.shift_remove(&AttributeKey::from(name));
        }
        RawParams { entries }
    }

    /// Parse a URL query string (`a=1&b.gte=2`).
    ///
    /// Keys are percent-decoded. Values are kept encoded, since value coercion
    /// unescapes them itself. A leading `?` is ignored, empty pairs are
    /// skipped, and a key without `=` gets an empty value. A repeated key
    /// keeps its first position and its last value.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = RawParams::new();
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = percent_decode_str(key).decode_utf8_lossy().into_owned();
            params.insert(key, value);
        }
        params
    }
}

impl From<FilterMap> for RawParams {
    fn from(map: FilterMap) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Into<AttributeKey>, V: Into<FilterValue>> FromIterator<(K, V)> for RawParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RawParams {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RawParams {
    type Item = (&'a AttributeKey, &'a FilterValue);
    type IntoIter = indexmap::map::Iter<'a, AttributeKey, FilterValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
