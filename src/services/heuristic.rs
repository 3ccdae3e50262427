//! Offline inference and synthesis: reads the markup directly and fills
//! values from field-name keywords.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use crate::config::Hints;
use crate::error::{Error, Result};
use crate::schema::{FieldSchema, FieldTag, FormSchema};

use super::{reconcile, SchemaInference, ValueSynthesis};

/// Input types that carry no user data.
const SKIPPED_INPUT_TYPES: &[&str] = &["submit", "button", "reset", "image", "file"];

/// Builds a schema from the form controls in the markup. One entry per
/// distinct `name`; the first control with a name decides its shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicInference;

#[async_trait]
impl SchemaInference for HeuristicInference {
    async fn infer_schema(&self, markup: &str) -> Result<FormSchema> {
        infer(markup)
    }
}

fn infer(markup: &str) -> Result<FormSchema> {
    let fragment = Html::parse_fragment(markup);
    let controls = Selector::parse("input, textarea, select")
        .map_err(|e| Error::SchemaParseError(format!("{e:?}")))?;

    let mut schema = FormSchema::new();
    for control in fragment.select(&controls) {
        let Some(name) = control.value().attr("name").filter(|n| !n.is_empty()) else {
            continue;
        };
        if schema.contains(name) {
            continue;
        }
        if let Some(field) = describe_control(&control) {
            schema.insert(name, field);
        }
    }
    Ok(schema)
}

fn describe_control(control: &ElementRef<'_>) -> Option<FieldSchema> {
    let el = control.value();
    let field = match el.name() {
        "textarea" => {
            let text = control.text().collect::<String>();
            with_optional_value(FieldSchema::new(FieldTag::Textarea, "text"), text.trim())
        }
        "select" => {
            let first_real = control
                .descendants()
                .filter_map(ElementRef::wrap)
                .filter(|o| o.value().name() == "option")
                .map(|o| match o.value().attr("value") {
                    Some(v) => v.to_string(),
                    None => o.text().collect::<String>().trim().to_string(),
                })
                .find(|v| !v.is_empty());
            let field = FieldSchema::new(FieldTag::Select, "");
            match first_real {
                Some(value) => field.with_value(value),
                None => field,
            }
        }
        _ => {
            let r#type = el.attr("type").unwrap_or("text").trim().to_ascii_lowercase();
            if SKIPPED_INPUT_TYPES.contains(&r#type.as_str()) {
                return None;
            }
            let field = FieldSchema::new(FieldTag::Input, r#type.as_str());
            match r#type.as_str() {
                "checkbox" => field.with_value("true"),
                "radio" => field.with_value(el.attr("value").unwrap_or("on")),
                _ => with_optional_value(field, el.attr("value").unwrap_or("")),
            }
        }
    };
    Some(field)
}

fn with_optional_value(field: FieldSchema, value: &str) -> FieldSchema {
    if value.is_empty() {
        field
    } else {
        field.with_value(value)
    }
}

/// Fills missing values from hints and from keywords in the field name.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicSynthesis;

#[async_trait]
impl ValueSynthesis for HeuristicSynthesis {
    async fn synthesize_values(&self, schema: &FormSchema, hints: &Hints) -> Result<FormSchema> {
        let guessed = schema
            .iter()
            .map(|(name, field)| {
                let mut field = field.clone();
                if field.value.is_none() {
                    field.value = guess_value(name, &field).map(str::to_string);
                }
                (name.clone(), field)
            })
            .collect();
        Ok(reconcile(schema, &guessed, hints))
    }
}

fn guess_value(name: &str, field: &FieldSchema) -> Option<&'static str> {
    let key = name.to_ascii_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| key.contains(w));

    let value = match field.tag {
        FieldTag::Select | FieldTag::Other(_) => return None,
        FieldTag::Textarea => "This is a test message. I would like to inquire about your services.",
        FieldTag::Input if field.is_type("checkbox") => "true",
        FieldTag::Input if field.is_type("radio") => return None,
        FieldTag::Input if field.is_type("email") || has(&["mail"]) => "john.doe@example.com",
        FieldTag::Input if field.is_type("tel") || has(&["tel", "phone", "mobile"]) => "123-456-7890",
        FieldTag::Input if field.is_type("url") || has(&["url", "website", "homepage"]) => {
            "https://example.com"
        }
        FieldTag::Input if field.is_type("number") || field.is_type("range") => "1",
        FieldTag::Input if field.is_type("date") => "2024-01-01",
        FieldTag::Input if has(&["zip", "postal", "postcode"]) => "12345",
        FieldTag::Input if has(&["company", "organization", "organisation", "corp"]) => {
            "Example Inc."
        }
        FieldTag::Input if has(&["name"]) => "John Doe",
        FieldTag::Input if has(&["subject", "title"]) => "Inquiry",
        FieldTag::Input if has(&["message", "comment", "inquiry", "body"]) => {
            "This is a test message. I would like to inquire about your services."
        }
        FieldTag::Input => "Sample text",
    };
    Some(value)
}
