//! Discovery → inference → synthesis → fill, for one target URL.

use serde_json::Value;

use crate::automation::PageAutomation;
use crate::browser::Browser;
use crate::config::AutofillConfig;
use crate::discovery::extract_form_markup;
use crate::error::{Error, Result};
use crate::fill::{FillEngine, FillReport};
use crate::services::{SchemaInference, ValueSynthesis};

/// Submits the first form on the page. Returns false when there is none.
const SUBMIT_FIRST_FORM: &str = r#"() => {
    const form = document.querySelector('form');
    if (!form) return false;
    if (typeof form.requestSubmit === 'function') form.requestSubmit();
    else form.submit();
    return true;
}"#;

pub struct Orchestrator {
    config: AutofillConfig,
    inference: Box<dyn SchemaInference>,
    synthesis: Box<dyn ValueSynthesis>,
}

impl Orchestrator {
    pub fn new(
        config: AutofillConfig,
        inference: impl SchemaInference + 'static,
        synthesis: impl ValueSynthesis + 'static,
    ) -> Self {
        Self {
            config,
            inference: Box::new(inference),
            synthesis: Box::new(synthesis),
        }
    }

    pub fn config(&self) -> &AutofillConfig {
        &self.config
    }

    /// Launch Chrome, run against a fresh tab, and shut Chrome down again.
    pub async fn run(&self) -> Result<FillReport> {
        let browser = Browser::launch(self.config.browser.clone()).await?;
        let result = match browser.new_page().await {
            Ok(page) => self.run_on_page(&page).await,
            Err(e) => Err(e),
        };
        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "browser did not shut down cleanly");
        }
        result
    }

    /// Run the whole pipeline on a page this call has exclusive use of.
    ///
    /// Fails before touching any field when navigation fails, when the page
    /// has no form, when inference output cannot be parsed, or when no
    /// fillable field is left. Per-field failures end up in the report.
    pub async fn run_on_page<P: PageAutomation>(&self, page: &P) -> Result<FillReport> {
        let url = self.config.target_url.as_str();

        tracing::info!(%url, "navigating");
        page.navigate(url).await?;

        let content = page.content().await?;
        let markup = extract_form_markup(&content);
        if markup.trim().is_empty() {
            return Err(Error::NoFormFound(url.to_string()));
        }
        tracing::info!(bytes = markup.len(), "form markup extracted");

        let inferred = self.inference.infer_schema(&markup).await?;
        tracing::info!(fields = inferred.len(), "schema inferred");
        if inferred.is_empty() {
            return Err(Error::EmptySchema);
        }

        let mut resolved = self
            .synthesis
            .synthesize_values(&inferred, &self.config.hints)
            .await?;
        let hidden = resolved.remove_hidden();
        if hidden > 0 {
            tracing::debug!(hidden, "hidden fields removed");
        }
        for name in inferred.iter().filter(|(_, f)| !f.is_hidden()).map(|(n, _)| n) {
            if !resolved.contains(name) {
                tracing::warn!(field = %name, "synthesis dropped a field");
            }
        }
        if resolved.is_empty() {
            return Err(Error::EmptySchema);
        }
        if let Ok(json) = resolved.to_json_pretty() {
            tracing::debug!(schema = %json, "resolved schema");
        }

        let report = FillEngine::new(page).fill(&resolved).await;

        let grace = self.config.grace_period;
        if !grace.is_zero() {
            if self.config.browser.headless {
                tracing::debug!("headless run, skipping grace period");
            } else {
                tracing::info!(seconds = grace.as_secs_f64(), "holding page open");
                tokio::time::sleep(grace).await;
            }
        }

        if self.config.submit {
            self.submit(page).await;
        }

        Ok(report)
    }

    async fn submit<P: PageAutomation>(&self, page: &P) {
        match page.evaluate_in_page(SUBMIT_FIRST_FORM, Value::Null).await {
            Ok(Value::Bool(true)) => tracing::info!("form submitted"),
            Ok(_) => tracing::warn!("no form left to submit"),
            Err(e) => tracing::warn!(error = %e, "form submission failed"),
        }
    }
}
