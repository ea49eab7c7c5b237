//! Query parameter encoding shared by every outbound request.

use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::error::Result;

/// String parameters kept sorted by key.
///
/// Sorting is byte-wise ascending, which is both the canonical order for
/// request signatures and the order keys appear in the encoded query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    inner: BTreeMap<String, String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.inner.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Form-urlencodes every pair (`application/x-www-form-urlencoded`,
    /// space as `+`), keys in sorted order.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A request variant that contributes its own fields to a parameter map.
pub trait QueryRequest {
    fn append_params(&self, params: &mut QueryParams) -> Result<()>;
}

/// Lists travel as a single JSON-encoded value, not as repeated keys.
pub fn encode_json_array(values: &[String]) -> Result<String> {
    Ok(serde_json::to_string(values)?)
}

/// Appends `params` to `base` as a query string, adding nothing when empty.
pub fn with_query(base: &str, params: &QueryParams) -> String {
    if params.is_empty() {
        base.to_string()
    } else {
        format!("{}?{}", base, params.encode())
    }
}
