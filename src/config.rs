use std::time::Duration;

use indexmap::IndexMap;

use crate::browser::Browser;
use crate::error::{Error, Result};

/// Known values keyed by field name, applied on top of synthesized ones.
pub type Hints = IndexMap<String, String>;

/// How long the filled page stays open before submission.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub chrome_path: Option<String>,
    /// Timeout for each CDP request (default: 30s).
    pub default_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            chrome_path: None,
            default_timeout: Duration::from_secs(30),
        }
    }
}

pub struct BrowserBuilder {
    config: BrowserConfig,
}

impl BrowserBuilder {
    pub fn new() -> Self {
        Self {
            config: BrowserConfig::default(),
        }
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<String>) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.default_timeout = timeout;
        self
    }

    pub fn build_config(self) -> BrowserConfig {
        self.config
    }

    pub async fn build(self) -> Result<Browser> {
        Browser::launch(self.build_config()).await
    }
}

impl Default for BrowserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Full URL of the chat-completions endpoint.
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl LlmConfig {
    pub const DEFAULT_API_BASE: &'static str = "https://api.openai.com/v1/chat/completions";
    pub const DEFAULT_MODEL: &'static str = "gpt-4o";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base: Self::DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.to_string(),
            max_tokens: 2000,
            temperature: 0.0,
        }
    }

    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Everything one form-fill run needs. Passed to the
/// [`Orchestrator`](crate::Orchestrator) at construction.
#[derive(Debug, Clone)]
pub struct AutofillConfig {
    pub target_url: String,
    pub hints: Hints,
    /// Pause after filling so a person can look at the page. Only honoured
    /// when the browser is headed.
    pub grace_period: Duration,
    /// Submit the first form on the page once the grace period is over.
    pub submit: bool,
    pub browser: BrowserConfig,
}

impl AutofillConfig {
    pub fn builder(target_url: impl Into<String>) -> AutofillBuilder {
        AutofillBuilder::new(target_url)
    }
}

pub struct AutofillBuilder {
    config: AutofillConfig,
}

impl AutofillBuilder {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            config: AutofillConfig {
                target_url: target_url.into(),
                hints: Hints::new(),
                grace_period: DEFAULT_GRACE_PERIOD,
                submit: false,
                browser: BrowserConfig::default(),
            },
        }
    }

    /// Add one known value. Later hints for the same field replace earlier ones.
    pub fn hint(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.hints.insert(field.into(), value.into());
        self
    }

    pub fn hints(mut self, hints: Hints) -> Self {
        self.config.hints.extend(hints);
        self
    }

    pub fn grace_period(mut self, grace_period: Duration) -> Self {
        self.config.grace_period = grace_period;
        self
    }

    pub fn submit(mut self, submit: bool) -> Self {
        self.config.submit = submit;
        self
    }

    pub fn browser(mut self, browser: BrowserConfig) -> Self {
        self.config.browser = browser;
        self
    }

    pub fn build(self) -> Result<AutofillConfig> {
        let url = self.config.target_url.trim();
        if url.is_empty() {
            return Err(Error::ConfigError("target URL is empty".into()));
        }
        if !(url.starts_with("http://")
            || url.starts_with("https://")
            || url.starts_with("file://")
            || url.starts_with("data:"))
        {
            return Err(Error::ConfigError(format!(
                "unsupported target URL scheme: {url}"
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_hints_in_order() {
        let config = AutofillConfig::builder("https://example.com/contact")
            .hint("email", "a@b.com")
            .hint("name", "Ada")
            .hint("email", "c@d.com")
            .grace_period(Duration::ZERO)
            .build()
            .unwrap();

        let hints: Vec<_> = config.hints.iter().collect();
        assert_eq!(hints[0], (&"email".to_string(), &"c@d.com".to_string()));
        assert_eq!(hints[1].0, "name");
        assert_eq!(config.grace_period, Duration::ZERO);
        assert!(!config.submit);
    }

    #[test]
    fn builder_rejects_bad_urls() {
        assert!(matches!(
            AutofillConfig::builder("  ").build(),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(
            AutofillConfig::builder("ftp://example.com").build(),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn default_grace_period_is_thirty_seconds() {
        let config = AutofillConfig::builder("https://example.com").build().unwrap();
        assert_eq!(config.grace_period, Duration::from_secs(30));
        assert!(config.browser.headless);
    }
}
