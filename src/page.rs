use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chromiumoxide::page::Page as CrPage;
use serde_json::Value;

use crate::automation::PageAutomation;
use crate::element::Element;
use crate::error::{Error, Result};

/// Wrapper around a chromiumoxide Page implementing [`PageAutomation`].
pub struct Page {
    inner: CrPage,
    next_marker: AtomicU64,
}

impl Page {
    pub(crate) fn new(inner: CrPage) -> Self {
        Self {
            inner,
            next_marker: AtomicU64::new(0),
        }
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Navigate to the given URL and wait for the page to load.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.inner
            .goto(url)
            .await
            .map_err(|e| Error::NavigationError(format!("{url}: {e}")))?;
        Ok(())
    }

    /// Get the full HTML content of the page.
    pub async fn html(&self) -> Result<String> {
        self.inner
            .content()
            .await
            .map_err(|e| Error::JsError(e.to_string()))
    }

    // ── Element Queries ─────────────────────────────────────────────

    /// All elements matching the selector; an empty match is not an error.
    pub async fn find_elements(&self, selector: &str) -> Result<Vec<Element>> {
        let els = self
            .inner
            .find_elements(selector)
            .await
            .map_err(|e| Error::InteractionError(format!("query {selector}: {e}")))?;
        Ok(els.into_iter().map(Element::new).collect())
    }

    async fn first(&self, selector: &str) -> Result<Option<Element>> {
        Ok(self.find_elements(selector).await?.into_iter().next())
    }

    async fn require(&self, selector: &str) -> Result<Element> {
        self.first(selector)
            .await?
            .ok_or_else(|| Error::ElementNotFound(selector.to_string()))
    }
}

#[async_trait]
impl PageAutomation for Page {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.goto(url).await
    }

    async fn content(&self) -> Result<String> {
        self.html().await
    }

    async fn query_selector(&self, selector: &str) -> Result<Option<Element>> {
        self.first(selector).await
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<Element>> {
        self.find_elements(selector).await
    }

    async fn get_attribute(&self, element: &Element, name: &str) -> Result<Option<String>> {
        element.get_attribute(name).await
    }

    async fn set_checked(&self, element: &Element, checked: bool) -> Result<()> {
        element.set_checked(checked).await
    }

    async fn click(&self, element: &Element) -> Result<()> {
        element.click().await
    }

    async fn closest_ancestor(&self, element: &Element, tag: &str) -> Result<Option<Element>> {
        let marker = format!("m{}", self.next_marker.fetch_add(1, Ordering::Relaxed));
        if !element.mark_closest(tag, &marker).await? {
            return Ok(None);
        }
        let ancestor = self.first(&format!(r#"[data-autofill-ref="{marker}"]"#)).await?;
        if let Some(ancestor) = &ancestor {
            ancestor.unmark().await?;
        }
        Ok(ancestor)
    }

    async fn fill_text(&self, selector: &str, value: &str) -> Result<()> {
        self.require(selector).await?.fill(value).await
    }

    async fn select_option(&self, selector: &str, value: &str) -> Result<()> {
        let selector_js = serde_json::to_string(selector)?;
        let value_js = serde_json::to_string(value)?;
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector_js});
                if (!el) return 'missing';
                if (!Array.from(el.options || []).some(o => o.value === {value_js})) return 'no-option';
                if (el.disabled) throw new Error('select is disabled');
                el.value = {value_js};
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return 'ok';
            }})()
            "#,
        );
        let status: String = self
            .inner
            .evaluate(js)
            .await
            .map_err(|e| Error::InteractionError(e.to_string()))?
            .into_value()
            .map_err(|e| Error::JsError(e.to_string()))?;
        match status.as_str() {
            "ok" => Ok(()),
            "missing" => Err(Error::ElementNotFound(selector.to_string())),
            _ => Err(Error::OptionNotFound {
                selector: selector.to_string(),
                value: value.to_string(),
            }),
        }
    }

    async fn evaluate_in_page(&self, function: &str, arg: Value) -> Result<Value> {
        let arg_js = serde_json::to_string(&arg)?;
        let js = format!("({function})({arg_js})");
        let result = self
            .inner
            .evaluate(js)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }
}
