//! Nested value to multipart field encoding.
//!
//! [`encode`] flattens a nested [`Value`] into an [`EncodedForm`]: an ordered
//! list of named fields, where bracket notation (`user[address][city]`)
//! records the nesting.
//!
//! Rules, for each `(key, value)` of a mapping:
//! - files are appended under the *enclosing* key (`user`, not `user[avatar]`),
//!   or under `key` at the top level;
//! - an empty array becomes a single empty field, so its presence survives;
//! - array elements are indexed (`tags[0]`), except files which all share the
//!   unindexed name, giving a multi-file field;
//! - objects recurse with the qualified key as prefix;
//! - scalars use their string form, null becomes the empty string.
//!
//! # Example
//!
//! ```
//! use courier_core::{Value, form};
//! use serde_json::json;
//!
//! let encoded = form::encode(&Value::from(json!({"user": {"name": "Ada", "tags": []}})));
//! let names: Vec<_> = encoded.iter().map(|field| field.name()).collect();
//! assert_eq!(names, ["user[name]", "user[tags]"]);
//! ```

use std::borrow::Cow;

use crate::{FileValue, Form, Part, Value};

/// Value of a single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    /// UTF-8 text.
    Text(String),
    /// Binary file.
    File(FileValue),
}

impl FormValue {
    /// The text, if this is a text field.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::File(_) => None,
        }
    }

    /// The file, if this is a file field.
    #[must_use]
    pub const fn as_file(&self) -> Option<&FileValue> {
        match self {
            Self::Text(_) => None,
            Self::File(file) => Some(file),
        }
    }
}

/// A named form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    name: String,
    value: FormValue,
}

impl FormField {
    /// Field name, with nesting in bracket notation.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field value.
    #[must_use]
    pub const fn value(&self) -> &FormValue {
        &self.value
    }
}

/// Flat, ordered multipart field set. Names may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedForm {
    fields: Vec<FormField>,
}

impl EncodedForm {
    /// Create an empty field set.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Append a text field.
    pub fn append_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(FormField {
            name: name.into(),
            value: FormValue::Text(value.into()),
        });
    }

    /// Append a file field.
    pub fn append_file(&mut self, name: impl Into<String>, file: FileValue) {
        self.fields.push(FormField {
            name: name.into(),
            value: FormValue::File(file),
        });
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter()
    }

    /// All values appended under `name`.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FormValue> {
        self.fields
            .iter()
            .filter(move |field| field.name == name)
            .map(|field| &field.value)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert into a multipart [`Form`] with a generated boundary.
    #[must_use]
    pub fn into_multipart(self) -> Form {
        self.into_multipart_with(Form::new())
    }

    /// Append every field, in order, to `form`.
    #[must_use]
    pub fn into_multipart_with(self, form: Form) -> Form {
        self.fields
            .into_iter()
            .fold(form, |form, field| match field.value {
                FormValue::Text(text) => form.part(Part::text(field.name, text)),
                FormValue::File(file) => form.part(Part::from_file(field.name, &file)),
            })
    }
}

/// Encode a nested value into a fresh field set.
#[must_use]
pub fn encode(value: &Value) -> EncodedForm {
    let mut form = EncodedForm::new();
    encode_into(value, &mut form, None);
    form
}

/// Encode a nested value, appending to `form` with an optional key prefix.
///
/// Top-level arrays are walked with their indices as keys; a top-level
/// scalar has no keys and appends nothing.
pub fn encode_into(value: &Value, form: &mut EncodedForm, key_prefix: Option<&str>) {
    for (key, value) in entries(value) {
        let form_key = match key_prefix {
            Some(prefix) => format!("{prefix}[{key}]"),
            None => key.to_string(),
        };

        match value {
            // Files bypass one level of bracket nesting.
            Value::File(file) => form.append_file(key_prefix.unwrap_or(key.as_ref()), file.clone()),
            Value::Array(items) if items.is_empty() => form.append_text(form_key, ""),
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    match item {
                        Value::File(file) => form.append_file(form_key.as_str(), file.clone()),
                        other => {
                            form.append_text(format!("{form_key}[{index}]"), other.to_field_string());
                        }
                    }
                }
            }
            Value::Object(_) => encode_into(value, form, Some(form_key.as_str())),
            scalar => form.append_text(form_key, scalar.to_field_string()),
        }
    }
}

fn entries(value: &Value) -> Vec<(Cow<'_, str>, &Value)> {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (Cow::Borrowed(k), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, v)| (Cow::Owned(index.to_string()), v))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;
    use serde_json::json;

    use super::*;

    fn text_fields(form: &EncodedForm) -> Vec<(String, String)> {
        form.iter()
            .map(|field| {
                let value = field.value().as_text().unwrap_or("<file>").to_string();
                (field.name().to_string(), value)
            })
            .collect()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn empty_array_is_one_empty_field() {
        let form = encode(&Value::from(json!({"a": []})));
        check!(text_fields(&form) == pairs(&[("a", "")]));
    }

    #[test]
    fn files_in_nested_array_share_bracketed_name() {
        let f1 = FileValue::new("a.pdf", "A");
        let f2 = FileValue::new("b.pdf", "B");
        let value = Value::object([(
            "user",
            Value::object([("docs", Value::from(vec![f1.clone(), f2.clone()]))]),
        )]);

        let form = encode(&value);

        let names: Vec<_> = form.iter().map(FormField::name).collect();
        check!(names == ["user[docs]", "user[docs]"]);
        let files: Vec<_> = form.get_all("user[docs]").filter_map(FormValue::as_file).collect();
        check!(files == [&f1, &f2]);
    }

    #[test]
    fn scalars_in_nested_array_are_indexed() {
        let form = encode(&Value::from(json!({"user": {"tags": ["a", null, 3], "none": []}})));
        check!(
            text_fields(&form)
                == pairs(&[
                    ("user[tags][0]", "a"),
                    ("user[tags][1]", ""),
                    ("user[tags][2]", "3"),
                    ("user[none]", ""),
                ])
        );
    }

    #[test]
    fn nested_object_uses_brackets() {
        let form = encode(&Value::from(json!({"a": {"b": 1}})));
        check!(text_fields(&form) == pairs(&[("a[b]", "1")]));
    }

    #[test]
    fn deeply_nested_object() {
        let form = encode(&Value::from(json!({"a": {"b": {"c": true}, "d": "x"}})));
        check!(text_fields(&form) == pairs(&[("a[b][c]", "true"), ("a[d]", "x")]));
    }

    #[test]
    fn files_in_array_share_unindexed_name() {
        let f1 = FileValue::new("one.txt", "1");
        let f2 = FileValue::new("two.txt", "2");
        let value = Value::object([("files", Value::from(vec![f1.clone(), f2.clone()]))]);

        let form = encode(&value);

        check!(form.len() == 2);
        let files: Vec<_> = form.get_all("files").filter_map(FormValue::as_file).collect();
        check!(files == [&f1, &f2]);
    }

    #[test]
    fn mixed_array_indexes_only_non_files() {
        let file = FileValue::new("doc.pdf", "%PDF");
        let value = Value::object([(
            "items",
            Value::Array(vec![Value::from("a"), Value::File(file), Value::Null]),
        )]);

        let form = encode(&value);

        check!(text_fields(&form) == pairs(&[("items[0]", "a"), ("items", "<file>"), ("items[2]", "")]));
    }

    #[test]
    fn null_is_empty_string() {
        let form = encode(&Value::from(json!({"a": null})));
        check!(text_fields(&form) == pairs(&[("a", "")]));

        let absent: Option<u32> = None;
        let form = encode(&Value::object([("a", Value::from(absent))]));
        check!(text_fields(&form) == pairs(&[("a", "")]));
    }

    #[test]
    fn top_level_file_uses_its_key() {
        let avatar = FileValue::new("me.png", vec![0x89]);
        let form = encode(&Value::object([("avatar", avatar.clone())]));

        let field = form.iter().next().expect("one field");
        check!(field.name() == "avatar");
        check!(field.value().as_file() == Some(&avatar));
    }

    #[test]
    fn nested_file_uses_enclosing_key() {
        let avatar = FileValue::new("me.png", vec![0x89]);
        let value = Value::object([(
            "user",
            Value::object([("name", Value::from("Ada")), ("avatar", Value::File(avatar))]),
        )]);

        let form = encode(&value);

        let names: Vec<_> = form.iter().map(FormField::name).collect();
        check!(names == ["user[name]", "user"]);
    }

    #[test]
    fn doubly_nested_file_uses_qualified_parent_key() {
        let value = Value::object([(
            "a",
            Value::object([("b", Value::object([("f", FileValue::new("x.bin", "x"))]))]),
        )]);

        let form = encode(&value);

        let names: Vec<_> = form.iter().map(FormField::name).collect();
        check!(names == ["a[b]"]);
    }

    #[test]
    fn array_of_objects_renders_json_text() {
        let form = encode(&Value::from(json!({"rows": [{"id": 1}, [2, 3]]})));
        check!(text_fields(&form) == pairs(&[("rows[0]", r#"{"id":1}"#), ("rows[1]", "[2,3]")]));
    }

    #[test]
    fn top_level_scalar_appends_nothing() {
        check!(encode(&Value::from(42)).is_empty());
        check!(encode(&Value::Null).is_empty());
    }

    #[test]
    fn top_level_array_uses_indices() {
        let form = encode(&Value::from(json!(["x", "y"])));
        check!(text_fields(&form) == pairs(&[("0", "x"), ("1", "y")]));
    }

    #[test]
    fn encode_into_appends_with_prefix() {
        let mut form = EncodedForm::new();
        form.append_text("existing", "1");

        encode_into(&Value::from(json!({"b": 2})), &mut form, Some("a"));

        check!(text_fields(&form) == pairs(&[("existing", "1"), ("a[b]", "2")]));
    }

    #[test]
    fn encoding_is_deterministic() {
        let value = Value::object([
            ("name", Value::from("Ada")),
            ("tags", Value::from(vec!["x", "y"])),
            ("doc", Value::from(FileValue::new("a.txt", "a"))),
            ("meta", Value::from(json!({"k": {"v": 1}}))),
        ]);
        check!(encode(&value) == encode(&value));
    }

    #[test]
    fn into_multipart_keeps_order_and_files() {
        let value = Value::object([
            ("title", Value::from("report")),
            ("attachment", Value::from(FileValue::new("r.pdf", "%PDF"))),
        ]);

        let multipart = encode(&value).into_multipart_with(Form::with_boundary("b"));

        let parts = multipart.parts();
        check!(parts.len() == 2);
        check!(parts.first().map(Part::name) == Some("title"));
        check!(parts.get(1).and_then(Part::filename) == Some("r.pdf"));
        check!(parts.get(1).and_then(Part::content_type) == Some("application/pdf"));
    }
}
