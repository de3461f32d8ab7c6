//! Nested payload values.
//!
//! [`Value`] is the data model shared by the form and query encoders and by
//! JSON bodies. It is close to [`serde_json::Value`] with two differences:
//! objects keep their insertion order, and a [`Value::File`] variant carries
//! binary file content for multipart uploads.
//!
//! Any [`serde::Serialize`] type converts into a [`Value`] with
//! [`Value::from_serialize`].

use bytes::Bytes;
use indexmap::IndexMap;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};

use crate::Result;

/// A binary file attached to a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileValue {
    filename: String,
    content_type: Option<String>,
    data: Bytes,
}

impl FileValue {
    /// Create a file from its name and content.
    #[must_use]
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data: data.into(),
        }
    }

    /// Set an explicit content type (otherwise guessed from the filename).
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// File name.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Explicit content type, if set.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// File content.
    #[must_use]
    pub const fn data(&self) -> &Bytes {
        &self.data
    }
}

/// Ordered string-keyed mapping.
///
/// Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map {
    entries: IndexMap<String, Value>,
}

impl Map {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge `other` into `self`, later values win.
    pub fn extend(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Map {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// An arbitrary nested payload value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Absent value (`null`, `None`).
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Number.
    Number(serde_json::Number),
    /// String.
    String(String),
    /// Ordered list.
    Array(Vec<Value>),
    /// Ordered mapping.
    Object(Map),
    /// Binary file.
    File(FileValue),
}

impl Value {
    /// Convert any serializable value, preserving object key order.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (e.g. a map with non-string keys).
    pub fn from_serialize<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self> {
        let json = serde_json::to_value(value)?;
        Ok(Self::from(json))
    }

    /// Build an object from key/value pairs.
    #[must_use]
    pub fn object<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Self>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Object(entries.into_iter().collect())
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The file, if this is a [`Value::File`].
    #[must_use]
    pub const fn as_file(&self) -> Option<&FileValue> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }

    /// The map, if this is a [`Value::Object`].
    #[must_use]
    pub const fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Whether this value, or anything nested in it, is a file.
    #[must_use]
    pub fn contains_file(&self) -> bool {
        match self {
            Self::File(_) => true,
            Self::Array(items) => items.iter().any(Self::contains_file),
            Self::Object(map) => map.iter().any(|(_, v)| v.contains_file()),
            _ => false,
        }
    }

    /// String form used for form fields and query parameters.
    ///
    /// Null is the empty string, numbers are their JSON text (`1.0` stays
    /// `1.0`), files are their filename, arrays and objects are compact JSON
    /// text.
    #[must_use]
    pub fn to_field_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::String(s) => s.clone(),
            Self::File(file) => file.filename.clone(),
            Self::Array(_) | Self::Object(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }
}

impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let mut ser = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map.iter() {
                    ser.serialize_entry(key, value)?;
                }
                ser.end()
            }
            Self::File(file) => Err(S::Error::custom(format!(
                "file '{}' cannot be serialized as JSON, use a form body",
                file.filename
            ))),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Object(map.into_iter().collect()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::Number(serde_json::Number::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for Value {
    /// Non-finite floats become [`Value::Null`], as in JSON.
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<FileValue> for Value {
    fn from(value: FileValue) -> Self {
        Self::File(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Self::Object(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn from_json_preserves_key_order() {
        let value = Value::from(json!({"z": 1, "a": 2, "m": 3}));
        let keys: Vec<_> = value
            .as_object()
            .expect("object")
            .iter()
            .map(|(k, _)| k.to_string())
            .collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn from_serialize_struct() {
        #[derive(serde::Serialize)]
        struct User {
            name: String,
            nickname: Option<String>,
        }

        let value = Value::from_serialize(&User {
            name: "Alice".to_string(),
            nickname: None,
        })
        .expect("serialize");

        let map = value.as_object().expect("object");
        assert_eq!(map.get("name"), Some(&Value::from("Alice")));
        assert_eq!(map.get("nickname"), Some(&Value::Null));
    }

    #[test]
    fn map_insert_replaces_in_place() {
        let mut map = Map::new();
        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("a", 3);

        let entries: Vec<_> = map.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        assert_eq!(
            entries,
            [
                ("a".to_string(), Value::from(3)),
                ("b".to_string(), Value::from(2))
            ]
        );
    }

    #[test]
    fn field_strings() {
        assert_eq!(Value::Null.to_field_string(), "");
        assert_eq!(Value::from(true).to_field_string(), "true");
        assert_eq!(Value::from(42).to_field_string(), "42");
        assert_eq!(Value::from(1.5).to_field_string(), "1.5");
        assert_eq!(Value::from("text").to_field_string(), "text");
        assert_eq!(Value::from(vec![1, 2]).to_field_string(), "[1,2]");
        assert_eq!(
            Value::object([("k", "v")]).to_field_string(),
            r#"{"k":"v"}"#
        );
        assert_eq!(
            Value::from(FileValue::new("a.txt", "data")).to_field_string(),
            "a.txt"
        );
    }

    #[test]
    fn integral_float_keeps_its_fraction() {
        assert_eq!(Value::from(json!(1.0)).to_field_string(), "1.0");
        assert_eq!(Value::from(json!(1)).to_field_string(), "1");
    }

    #[test]
    fn large_object_conversion_keeps_order() {
        let source: serde_json::Map<String, serde_json::Value> =
            (0..50_000).map(|i| (format!("k{i}"), json!(i))).collect();

        let value = Value::from(serde_json::Value::Object(source));

        let map = value.as_object().expect("object");
        assert_eq!(map.len(), 50_000);
        assert_eq!(map.iter().next().map(|(k, _)| k), Some("k0"));
        assert_eq!(map.iter().last().map(|(k, _)| k), Some("k49999"));
        assert_eq!(map.get("k12345"), Some(&Value::from(12_345)));
    }

    #[test]
    fn map_extend_overrides_in_place() {
        let mut map: Map = [("a", 1), ("b", 2)].into_iter().collect();
        map.extend([("a", 9), ("c", 3)].into_iter().collect());

        let keys: Vec<_> = map.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(map.get("a"), Some(&Value::from(9)));
    }

    #[test]
    fn non_finite_float_is_null() {
        assert_eq!(Value::from(f64::NAN), Value::Null);
    }

    #[test]
    fn serialize_to_json() {
        let value = Value::object([
            ("name", Value::from("Alice")),
            ("tags", Value::from(vec!["a", "b"])),
            ("missing", Value::Null),
        ]);
        let text = serde_json::to_string(&value).expect("serialize");
        assert_eq!(text, r#"{"name":"Alice","tags":["a","b"],"missing":null}"#);
    }

    #[test]
    fn serialize_file_fails() {
        let value = Value::object([("avatar", FileValue::new("me.png", vec![1, 2, 3]))]);
        let err = serde_json::to_string(&value).expect_err("file is not JSON");
        assert!(err.to_string().contains("me.png"));
    }

    #[test]
    fn contains_file_nested() {
        let value = Value::object([(
            "user",
            Value::object([("docs", Value::from(vec![FileValue::new("a.pdf", "x")]))]),
        )]);
        assert!(value.contains_file());
        assert!(!Value::from(json!({"a": [1, {"b": 2}]})).contains_file());
    }
}
