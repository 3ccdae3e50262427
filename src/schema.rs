//! The field schema handed from inference to synthesis to the fill engine.
//!
//! On the wire a schema is a JSON object keyed by the field's `name`
//! attribute:
//!
//! ```json
//! {
//!   "email": { "tag": "input", "type": "email", "value": "a@b.com" },
//!   "area[data][]": { "tag": "input", "type": "checkbox", "value": "true" },
//!   "plan": { "tag": "select", "value": "gold" }
//! }
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, Result};

/// Element category a field lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldTag {
    Input,
    Textarea,
    Select,
    /// Anything a service reported that is not one of the three form tags.
    Other(String),
}

impl FieldTag {
    pub fn as_str(&self) -> &str {
        match self {
            FieldTag::Input => "input",
            FieldTag::Textarea => "textarea",
            FieldTag::Select => "select",
            FieldTag::Other(tag) => tag,
        }
    }
}

impl From<&str> for FieldTag {
    fn from(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "input" => FieldTag::Input,
            "textarea" => FieldTag::Textarea,
            "select" => FieldTag::Select,
            other => FieldTag::Other(other.to_string()),
        }
    }
}

impl fmt::Display for FieldTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(FieldTag::from(tag.as_str()))
    }
}

/// One form field: what element it is and what to put in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub tag: FieldTag,
    /// Input type (`text`, `email`, `checkbox`, ...). Only meaningful for `input`.
    #[serde(rename = "type", default)]
    pub r#type: String,
    #[serde(
        default,
        deserialize_with = "scalar_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<String>,
}

impl FieldSchema {
    pub fn new(tag: FieldTag, r#type: impl Into<String>) -> Self {
        Self {
            tag,
            r#type: r#type.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Case-insensitive comparison against the input type.
    pub fn is_type(&self, r#type: &str) -> bool {
        self.r#type.trim().eq_ignore_ascii_case(r#type)
    }

    pub fn is_hidden(&self) -> bool {
        self.is_type("hidden")
    }
}

/// Services sometimes answer `true` or `1` instead of `"true"` / `"1"`.
fn scalar_as_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "field value must be a string, number or boolean, got {other}"
        ))),
    }
}

/// Ordered mapping of field name to [`FieldSchema`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSchema {
    fields: IndexMap<String, FieldSchema>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a service response. Tolerates a surrounding markdown code fence;
    /// anything else that is not a JSON object of field entries is a
    /// [`Error::SchemaParseError`].
    pub fn from_json(text: &str) -> Result<Self> {
        let body = strip_code_fence(text);
        if body.is_empty() {
            return Err(Error::SchemaParseError("empty response".into()));
        }
        serde_json::from_str(body).map_err(|e| Error::SchemaParseError(format!("{e}: {body}")))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Insert or replace a field. A replaced field keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, field: FieldSchema) -> Option<FieldSchema> {
        self.fields.insert(name.into(), field)
    }

    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldSchema> {
        self.fields.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldSchema)> {
        self.fields.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Drop every `type = hidden` field, returning how many were removed.
    pub fn remove_hidden(&mut self) -> usize {
        let before = self.fields.len();
        self.fields.retain(|_, field| !field.is_hidden());
        before - self.fields.len()
    }
}

impl FromIterator<(String, FieldSchema)> for FormSchema {
    fn from_iter<I: IntoIterator<Item = (String, FieldSchema)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FormSchema {
    type Item = (String, FieldSchema);
    type IntoIter = indexmap::map::IntoIter<String, FieldSchema>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a FormSchema {
    type Item = (&'a String, &'a FieldSchema);
    type IntoIter = indexmap::map::Iter<'a, String, FieldSchema>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // skip an info string such as `json`
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
