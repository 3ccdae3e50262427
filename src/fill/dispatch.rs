//! Choosing an interaction strategy per field and building its selectors.

use crate::schema::{FieldSchema, FieldTag};

/// How a field gets filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `input[type=checkbox]`: direct check with label and unnamed fallbacks.
    Checkbox,
    /// `input[type=radio]`: check the option whose value matches exactly.
    Radio,
    /// Any `select`: pick the option whose value matches exactly.
    Select,
    /// Remaining `input` types and `textarea`: replace the text.
    Text,
    /// Tags outside the form-control set.
    Unsupported,
}

pub fn strategy_for(field: &FieldSchema) -> Strategy {
    match field.tag {
        FieldTag::Input if field.is_type("checkbox") => Strategy::Checkbox,
        FieldTag::Input if field.is_type("radio") => Strategy::Radio,
        FieldTag::Select => Strategy::Select,
        FieldTag::Input | FieldTag::Textarea => Strategy::Text,
        FieldTag::Other(_) => Strategy::Unsupported,
    }
}

/// Quote `raw` as a CSS string. `None` when it holds control characters a
/// selector cannot carry (NUL and friends).
pub fn css_string(raw: &str) -> Option<String> {
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('"');
    for c in raw.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\a "),
            '\r' => quoted.push_str("\\d "),
            '\t' => quoted.push('\t'),
            c if c.is_control() => return None,
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    Some(quoted)
}

/// `<tag>[name="<name>"]`, or `None` for a key that cannot be a name.
pub fn name_selector(tag: &str, name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    Some(format!("{tag}[name={}]", css_string(name)?))
}

/// `input[name="<name>"][value="<value>"]`. `None` if either part is unusable.
pub fn radio_selector(name: &str, value: &str) -> Option<String> {
    let base = name_selector("input", name)?;
    Some(format!("{base}[value={}]", css_string(value)?))
}

pub const UNNAMED_CHECKBOX_SELECTOR: &str = r#"input[type="checkbox"]:not([name])"#;

pub fn label_for_selector(id: &str) -> Option<String> {
    Some(format!("label[for={}]", css_string(id)?))
}
