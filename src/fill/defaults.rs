//! Values used when synthesis left a field without one.

use crate::schema::{FieldSchema, FieldTag};

/// Placeholder typed into text-like fields.
pub const TEXT_PLACEHOLDER: &str = "default text";

/// Option value assumed for selects: usually the first real option. Not
/// guaranteed to exist, in which case the select fails with `OptionNotFound`.
pub const SELECT_PLACEHOLDER: &str = "1";

pub fn default_value(tag: &FieldTag) -> &'static str {
    match tag {
        FieldTag::Input | FieldTag::Textarea => TEXT_PLACEHOLDER,
        FieldTag::Select => SELECT_PLACEHOLDER,
        FieldTag::Other(_) => "",
    }
}

/// The field's own value, or the default for its tag when the value is
/// absent or empty.
pub fn resolve_value(field: &FieldSchema) -> &str {
    match field.value.as_deref() {
        Some(value) if !value.is_empty() => value,
        _ => default_value(&field.tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_tag() {
        assert_eq!(default_value(&FieldTag::Input), "default text");
        assert_eq!(default_value(&FieldTag::Textarea), "default text");
        assert_eq!(default_value(&FieldTag::Select), "1");
        assert_eq!(default_value(&FieldTag::Other("button".into())), "");
    }

    #[test]
    fn empty_values_fall_back_to_the_tag_default() {
        let field = FieldSchema::new(FieldTag::Input, "text").with_value("");
        assert_eq!(resolve_value(&field), "default text");
        let field = FieldSchema::new(FieldTag::Select, "").with_value("");
        assert_eq!(resolve_value(&field), "1");
        let field = FieldSchema::new(FieldTag::Select, "");
        assert_eq!(resolve_value(&field), "1");
    }

    #[test]
    fn present_values_are_kept() {
        let field = FieldSchema::new(FieldTag::Textarea, "text").with_value(" ");
        assert_eq!(resolve_value(&field), " ");
        let field = FieldSchema::new(FieldTag::Input, "email").with_value("a@b.com");
        assert_eq!(resolve_value(&field), "a@b.com");
    }
}
