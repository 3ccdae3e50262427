//! The page operations the fill engine and orchestrator are written against.
//!
//! [`crate::Page`] implements this over a live Chrome tab; `testing::MockPage`
//! (behind the `testing` feature) implements it over an in-memory document.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

#[async_trait]
pub trait PageAutomation: Send + Sync {
    /// Handle to an element inside the page.
    type Element: Send + Sync;

    /// Navigate to `url` and wait for the load to settle.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Full HTML of the current document.
    async fn content(&self) -> Result<String>;

    /// First element matching `selector`, or `None` when nothing matches.
    async fn query_selector(&self, selector: &str) -> Result<Option<Self::Element>>;

    /// All elements matching `selector`, in document order.
    async fn query_selector_all(&self, selector: &str) -> Result<Vec<Self::Element>>;

    async fn get_attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    /// Force the checked state of a checkbox or radio, skipping visibility and
    /// actionability checks. Fails when the element refuses the new state.
    async fn set_checked(&self, element: &Self::Element, checked: bool) -> Result<()>;

    async fn click(&self, element: &Self::Element) -> Result<()>;

    /// Nearest ancestor (excluding the element itself) with the given tag name.
    async fn closest_ancestor(
        &self,
        element: &Self::Element,
        tag: &str,
    ) -> Result<Option<Self::Element>>;

    /// Replace the text content of the first element matching `selector`.
    /// Fails with [`crate::Error::ElementNotFound`] when nothing matches.
    async fn fill_text(&self, selector: &str, value: &str) -> Result<()>;

    /// Select the option whose value equals `value` exactly. Fails with
    /// [`crate::Error::ElementNotFound`] when there is no such select and with
    /// [`crate::Error::OptionNotFound`] when it has no such option.
    async fn select_option(&self, selector: &str, value: &str) -> Result<()>;

    /// Call `function` (a JS function expression) in the page with `arg` and
    /// return its JSON-serializable result.
    async fn evaluate_in_page(&self, function: &str, arg: Value) -> Result<Value>;
}
