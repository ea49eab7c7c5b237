//! Property maps attached to events and profile operations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Arbitrary JSON properties keyed by name.
///
/// ```
/// use mixpanel::Properties;
///
/// let props = Properties::new()
///     .insert("Plan", "Pro")
///     .insert("Seats", 12)
///     .insert("Trial", false);
/// assert_eq!(props.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
    inner: Map<String, Value>,
}

impl Properties {
    pub fn new() -> Self {
        Self { inner: Map::new() }
    }

    /// Adds a property, replacing any previous value under the same key.
    pub fn insert<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.inner.insert(key.into(), value.into());
        self
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.inner.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.inner.iter()
    }
}

impl From<Map<String, Value>> for Properties {
    fn from(inner: Map<String, Value>) -> Self {
        Self { inner }
    }
}

impl From<Properties> for Value {
    fn from(props: Properties) -> Self {
        Value::Object(props.inner)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
