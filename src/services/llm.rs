use async_trait::async_trait;
use serde::Deserialize;

use crate::config::{Hints, LlmConfig};
use crate::error::{Error, Result};
use crate::schema::FormSchema;

use super::{reconcile, SchemaInference, ValueSynthesis};

const INFERENCE_PROMPT: &str = r#"Analyse the HTML form markup below and identify the name attribute and type of every form control. Answer with a single JSON object shaped like the sample.

Rules:
- Use the name attribute verbatim as the key, e.g. name="area[data][]" becomes the key "area[data][]".
- "tag" is the element name: input, textarea or select.
- For tag input with type radio, put the value attribute of the first option in "value".
- For tag select, put the value of a non-empty option in "value".
- For tag input with type checkbox, put "true" in "value".

Sample:
{
  "name": { "tag": "input", "type": "text" },
  "email": { "tag": "input", "type": "email" },
  "body": { "tag": "textarea", "type": "text" },
  "agree": { "tag": "input", "type": "checkbox", "value": "true" },
  "reason": { "tag": "input", "type": "radio", "value": "youtube" },
  "type": { "tag": "select", "value": "1" }
}

HTML:
"#;

const SYNTHESIS_PROMPT: &str = r#"Generate form data for the form fields below. Answer with a single JSON object shaped like the sample.

Apply these steps in order:
- Leave out fields whose type is hidden.
- Leave out anything that is not one of the given fields.
- Keep every key exactly as given.
- Keep each field's tag and type exactly as given.
- If a field already has a value, keep that value.
- If a known value is listed for a field, use it.
- Otherwise invent a plausible value from the key name.

Sample:
{
  "company": { "tag": "input", "type": "text", "value": "Example Inc." },
  "name": { "tag": "input", "type": "text", "value": "John Doe" },
  "email": { "tag": "input", "type": "email", "value": "john.doe@example.com" },
  "tel": { "tag": "input", "type": "tel", "value": "123-456-7890" },
  "area[data][]": { "tag": "input", "type": "checkbox", "value": "true" },
  "message": { "tag": "textarea", "type": "text", "value": "This is a test message. I would like to inquire about your services." }
}
"#;

/// Chat-completions client usable for both inference and synthesis.
pub struct LlmClient {
    config: LlmConfig,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Send one user message and return the JSON text of the reply.
    async fn complete_json(&self, prompt: String) -> Result<String> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "response_format": { "type": "json_object" },
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        });

        tracing::debug!(model = %self.config.model, endpoint = %self.config.api_base, "sending completion request");

        let response = self
            .client
            .post(&self.config.api_base)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let err_body = response.text().await.unwrap_or_default();
            return Err(Error::ServiceError(format!("{status}: {err_body}")));
        }

        let reply: ChatResponse = response.json().await?;
        reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::SchemaParseError("completion had no content".into()))
    }
}

#[async_trait]
impl SchemaInference for LlmClient {
    async fn infer_schema(&self, markup: &str) -> Result<FormSchema> {
        let content = self.complete_json(format!("{INFERENCE_PROMPT}{markup}")).await?;
        let schema = FormSchema::from_json(&content)?;
        tracing::debug!(fields = schema.len(), "schema inferred");
        Ok(schema)
    }
}

#[async_trait]
impl ValueSynthesis for LlmClient {
    async fn synthesize_values(&self, schema: &FormSchema, hints: &Hints) -> Result<FormSchema> {
        let prompt = format!(
            "{SYNTHESIS_PROMPT}\nForm fields:\n{}\n\nKnown values:\n{}\n",
            serde_json::to_string(schema)?,
            serde_json::to_string(hints)?,
        );
        let content = self.complete_json(prompt).await?;
        let synthesized = FormSchema::from_json(&content)?;
        Ok(reconcile(schema, &synthesized, hints))
    }
}
