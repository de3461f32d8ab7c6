//! Nested value to query string encoding.
//!
//! [`QueryParams`] accumulates parameters with *set* semantics: setting a
//! name that already exists replaces its value (the first occurrence keeps its
//! position). Multipart forms are additive instead, see [`crate::form`].
//!
//! Nested objects and arrays flatten with bracket notation: `{"a": {"b": 1}}`
//! becomes `a[b]=1` and `{"ids": [4, 5]}` becomes `ids[0]=4&ids[1]=5`.
//!
//! # Example
//!
//! ```
//! use courier_core::{QueryParams, Value};
//! use serde_json::json;
//!
//! let mut params = QueryParams::new();
//! params.encode(&Value::from(json!({"q": "rust", "page": 1})), None);
//! params.encode(&Value::from(json!({"page": 2})), None);
//! assert_eq!(params.to_string(), "q=rust&page=2");
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use url::form_urlencoded;

use crate::Value;

/// Ordered query parameters with last-write-wins semantics per name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
    /// Position of the first pair for each name.
    index: HashMap<String, usize>,
    /// Names that occur more than once, only possible after [`parse`](Self::parse).
    repeated: HashSet<String>,
}

impl QueryParams {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an existing `application/x-www-form-urlencoded` query string.
    ///
    /// Duplicated names are kept as they are until one of them is [`set`](Self::set).
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let mut params = Self::new();
        for (name, value) in form_urlencoded::parse(query.as_bytes()).into_owned() {
            if params.index.contains_key(&name) {
                params.repeated.insert(name.clone());
            } else {
                params.index.insert(name.clone(), params.pairs.len());
            }
            params.pairs.push((name, value));
        }
        params
    }

    /// Set `name` to `value`, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        let Some(&position) = self.index.get(&name) else {
            self.index.insert(name.clone(), self.pairs.len());
            self.pairs.push((name, value));
            return;
        };

        if self.repeated.remove(&name) {
            let mut seen = 0_usize;
            self.pairs.retain(|(n, _)| {
                if *n != name {
                    return true;
                }
                seen += 1;
                seen == 1
            });
            self.reindex();
        }

        if let Some(pair) = self.pairs.get_mut(position) {
            pair.1 = value;
        }
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (position, (name, _)) in self.pairs.iter().enumerate() {
            self.index.entry(name.clone()).or_insert(position);
        }
    }

    /// Flatten `value` into parameters, names prefixed by `prefix`.
    ///
    /// Scalars at the top level have no name and are ignored.
    pub fn encode(&mut self, value: &Value, prefix: Option<&str>) {
        match value {
            Value::Object(map) => {
                for (key, value) in map.iter() {
                    self.encode_entry(prefix, key, value);
                }
            }
            Value::Array(items) => {
                for (index, value) in items.iter().enumerate() {
                    self.encode_entry(prefix, &index.to_string(), value);
                }
            }
            _ => {}
        }
    }

    fn encode_entry(&mut self, prefix: Option<&str>, key: &str, value: &Value) {
        let name = match prefix {
            Some(prefix) => format!("{prefix}[{key}]"),
            None => key.to_string(),
        };
        match value {
            Value::Object(_) | Value::Array(_) => self.encode(value, Some(name.as_str())),
            scalar => self.set(name, scalar.to_field_string()),
        }
    }

    /// First value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.index
            .get(name)
            .and_then(|&position| self.pairs.get(position))
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over parameters in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for QueryParams {
    /// Serialize as `application/x-www-form-urlencoded`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.pairs)
            .finish();
        f.write_str(&encoded)
    }
}

/// Encode a nested value into a query string (without leading `?`).
#[must_use]
pub fn encode_query(value: &Value) -> String {
    let mut params = QueryParams::new();
    params.encode(value, None);
    params.to_string()
}
