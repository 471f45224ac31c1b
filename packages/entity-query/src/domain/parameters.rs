//! Query parameter sets
//!
//! A named query is bound either by name (`Keyed`) or by order of appearance
//! (`Positional`). Repositories pattern-match on [`QueryParameters`] to issue
//! backend-specific bind calls.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keyed parameter set (name → value)
///
/// # Examples
///
/// ```rust
/// use entity_query::domain::MapParameters;
///
/// let mut params = MapParameters::new();
/// params.add("status", "active").add("min_age", 18);
/// assert_eq!(params.len(), 2);
/// assert_eq!(params.get("min_age"), Some(&serde_json::json!(18)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapParameters {
    values: BTreeMap<String, Value>,
}

impl MapParameters {
    /// Create an empty keyed parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or overwrite) one keyed parameter
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for MapParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Positional parameter set
///
/// Value at index `i` binds to the `i + 1`-th placeholder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArrayParameters {
    values: Vec<Value>,
}

impl ArrayParameters {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }
}

impl<V: Into<Value>> FromIterator<V> for ArrayParameters {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Active parameter set of a named query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum QueryParameters {
    /// Bound by name
    Keyed(MapParameters),
    /// Bound by order of appearance
    Positional(ArrayParameters),
}

impl QueryParameters {
    /// Short label used in log events
    pub fn kind(&self) -> &'static str {
        match self {
            QueryParameters::Keyed(_) => "keyed",
            QueryParameters::Positional(_) => "positional",
        }
    }

    pub fn is_keyed(&self) -> bool {
        matches!(self, QueryParameters::Keyed(_))
    }

    pub fn is_positional(&self) -> bool {
        matches!(self, QueryParameters::Positional(_))
    }

    pub fn as_keyed(&self) -> Option<&MapParameters> {
        match self {
            QueryParameters::Keyed(map) => Some(map),
            QueryParameters::Positional(_) => None,
        }
    }

    pub fn as_positional(&self) -> Option<&ArrayParameters> {
        match self {
            QueryParameters::Positional(array) => Some(array),
            QueryParameters::Keyed(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            QueryParameters::Keyed(map) => map.len(),
            QueryParameters::Positional(array) => array.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a keyed value in place
    ///
    /// A positional set is replaced by a keyed set holding just this pair.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        match self {
            QueryParameters::Keyed(map) => {
                map.add(key, value);
            }
            QueryParameters::Positional(_) => {
                let mut map = MapParameters::new();
                map.add(key, value);
                *self = QueryParameters::Keyed(map);
            }
        }
        self
    }
}

impl Default for QueryParameters {
    fn default() -> Self {
        QueryParameters::Keyed(MapParameters::new())
    }
}

impl From<MapParameters> for QueryParameters {
    fn from(map: MapParameters) -> Self {
        QueryParameters::Keyed(map)
    }
}

impl From<ArrayParameters> for QueryParameters {
    fn from(array: ArrayParameters) -> Self {
        QueryParameters::Positional(array)
    }
}

// Positional: ordered list
impl<V: Into<Value>> From<Vec<V>> for QueryParameters {
    fn from(values: Vec<V>) -> Self {
        QueryParameters::Positional(values.into_iter().collect())
    }
}

// Positional: inline list, e.g. `[1, 2, 3]`
impl<V: Into<Value>, const N: usize> From<[V; N]> for QueryParameters {
    fn from(values: [V; N]) -> Self {
        QueryParameters::Positional(values.into_iter().collect())
    }
}

impl<K: Into<String>, V: Into<Value>> From<HashMap<K, V>> for QueryParameters {
    fn from(values: HashMap<K, V>) -> Self {
        QueryParameters::Keyed(values.into_iter().collect())
    }
}

impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for QueryParameters {
    fn from(values: BTreeMap<K, V>) -> Self {
        QueryParameters::Keyed(values.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ═══════════════════════════════════════════════════════════════════════
    // Parameter Set Tests
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_map_parameters_add_overwrites() {
        let mut params = MapParameters::new();
        params.add("a", 1).add("a", 2);

        assert_eq!(params.len(), 1);
        assert_eq!(params.get("a"), Some(&json!(2)));
    }

    #[test]
    fn test_array_parameters_from_iter() {
        let params: ArrayParameters = vec!["x", "y"].into_iter().collect();

        assert_eq!(params.len(), 2);
        assert_eq!(params.get(0), Some(&json!("x")));
        assert_eq!(params.get(2), None);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // QueryParameters Tests
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_default_is_empty_keyed() {
        let params = QueryParameters::default();

        assert!(params.is_keyed());
        assert!(params.is_empty());
        assert_eq!(params.kind(), "keyed");
    }

    #[test]
    fn test_from_array_is_positional() {
        let params = QueryParameters::from([1, 2, 3]);

        let array = params.as_positional().unwrap();
        assert_eq!(array.as_slice(), &[json!(1), json!(2), json!(3)]);
        assert!(params.as_keyed().is_none());
    }

    #[test]
    fn test_from_hash_map_is_keyed() {
        let map: HashMap<&str, i64> = [("a", 1), ("b", 2)].into_iter().collect();
        let params = QueryParameters::from(map);

        let keyed = params.as_keyed().unwrap();
        assert_eq!(keyed.get("a"), Some(&json!(1)));
        assert_eq!(keyed.get("b"), Some(&json!(2)));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_query_parameters_add_in_place() {
        let mut params = QueryParameters::default();
        for i in 0..500 {
            params.add(format!("k{}", i), i);
        }
        params.add("k7", "replaced");

        let keyed = params.as_keyed().unwrap();
        assert_eq!(keyed.len(), 500);
        assert_eq!(keyed.get("k499"), Some(&json!(499)));
        assert_eq!(keyed.get("k7"), Some(&json!("replaced")));
    }

    #[test]
    fn test_query_parameters_add_replaces_positional() {
        let mut params = QueryParameters::from([1, 2]);
        params.add("x", true);

        assert!(params.is_keyed());
        assert_eq!(params.len(), 1);
        assert_eq!(params.as_keyed().unwrap().get("x"), Some(&json!(true)));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Serialization Tests
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_serde_tagged_shape() {
        let params = QueryParameters::from(vec![json!("abc"), json!(null)]);

        let encoded = serde_json::to_value(&params).unwrap();
        assert_eq!(encoded, json!({"kind": "positional", "values": ["abc", null]}));

        let decoded: QueryParameters = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, params);
    }
}
