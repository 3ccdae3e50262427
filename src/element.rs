use chromiumoxide::cdp::js_protocol::runtime::CallFunctionOnReturns;
use chromiumoxide::element::Element as CrElement;
use serde_json::Value;

use crate::error::{Error, Result};

/// Wrapper around a chromiumoxide Element, exposing the handful of
/// operations form filling needs.
pub struct Element {
    inner: CrElement,
}

impl Element {
    pub(crate) fn new(inner: CrElement) -> Self {
        Self { inner }
    }

    /// Click this element (scrolls into view first). Fails for elements
    /// without a layout box, e.g. `display: none`.
    pub async fn click(&self) -> Result<()> {
        self.inner
            .click()
            .await
            .map_err(|e| Error::InteractionError(format!("click failed: {e}")))?;
        Ok(())
    }

    /// Get the value of an attribute on this element.
    pub async fn get_attribute(&self, name: &str) -> Result<Option<String>> {
        self.inner.attribute(name).await.map_err(Error::CdpError)
    }

    /// Run `function` with `this` bound to the element. A thrown exception is
    /// reported as an [`Error::InteractionError`].
    pub async fn call_fn(&self, function: &str) -> Result<Value> {
        let returns: CallFunctionOnReturns = self
            .inner
            .call_js_fn(function, false)
            .await
            .map_err(Error::CdpError)?;
        if let Some(details) = returns.exception_details {
            let message = details
                .exception
                .and_then(|e| e.description)
                .unwrap_or(details.text);
            return Err(Error::InteractionError(message));
        }
        Ok(returns.result.value.unwrap_or(Value::Null))
    }

    /// Force the checked state without any visibility checks, then verify the
    /// element kept it.
    pub async fn set_checked(&self, checked: bool) -> Result<()> {
        let js = format!(
            r#"
            function() {{
                if (typeof this.checked !== 'boolean') throw new Error('element is not checkable');
                if (this.disabled) throw new Error('element is disabled');
                if (this.checked !== {checked}) {{
                    this.checked = {checked};
                    this.dispatchEvent(new Event('input', {{ bubbles: true }}));
                    this.dispatchEvent(new Event('change', {{ bubbles: true }}));
                }}
                if (this.checked !== {checked}) throw new Error('element reverted its checked state');
                return true;
            }}
            "#,
        );
        self.call_fn(&js).await.map(|_| ())
    }

    /// Replace the element's value and fire the events frameworks listen to.
    pub async fn fill(&self, value: &str) -> Result<()> {
        let value_js = serde_json::to_string(value)?;
        let js = format!(
            r#"
            function() {{
                if (this.disabled || this.readOnly) throw new Error('element is not editable');
                if (this.isContentEditable) {{
                    this.textContent = {value_js};
                }} else if ('value' in this) {{
                    this.focus();
                    this.value = {value_js};
                }} else {{
                    throw new Error('element does not accept text');
                }}
                this.dispatchEvent(new Event('input', {{ bubbles: true }}));
                this.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }}
            "#,
        );
        self.call_fn(&js).await.map(|_| ())
    }

    /// Tag the nearest ancestor called `tag` with `data-autofill-ref="<marker>"`.
    /// Returns false when there is no such ancestor.
    pub(crate) async fn mark_closest(&self, tag: &str, marker: &str) -> Result<bool> {
        let tag_js = serde_json::to_string(tag)?;
        let marker_js = serde_json::to_string(marker)?;
        let js = format!(
            r#"
            function() {{
                const parent = this.parentElement;
                const found = parent ? parent.closest({tag_js}) : null;
                if (!found) return false;
                found.setAttribute('data-autofill-ref', {marker_js});
                return true;
            }}
            "#,
        );
        Ok(self.call_fn(&js).await?.as_bool().unwrap_or(false))
    }

    /// Drop the marker left by [`Element::mark_closest`].
    pub(crate) async fn unmark(&self) -> Result<()> {
        self.call_fn("function() { this.removeAttribute('data-autofill-ref'); }")
            .await?;
        Ok(())
    }
}
