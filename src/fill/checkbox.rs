//! Checkbox fallback chain.
//!
//! 1. `input[name=<field>]`; no match at all goes straight to step 4.
//! 2. Force-check the first match.
//! 3. On failure click `label[for=<id>]`, then the wrapping `<label>`.
//! 4. Check the first `input[type=checkbox]` that has no name.
//!
//! When several elements match, the first one is always used.

use crate::automation::PageAutomation;

use super::dispatch;
use super::{FailureReason, FillMethod, FillOutcome};

pub(crate) async fn check<P: PageAutomation>(page: &P, name: &str) -> FillOutcome {
    let Some(selector) = dispatch::name_selector("input", name) else {
        return FillOutcome::Failed(FailureReason::InvalidFieldKey);
    };

    let matches = match page.query_selector_all(&selector).await {
        Ok(matches) => matches,
        Err(e) => return FillOutcome::interaction(e),
    };

    let Some(first) = matches.first() else {
        tracing::debug!(field = %name, "no named checkbox, trying unnamed ones");
        return check_unnamed(page).await;
    };
    if matches.len() > 1 {
        tracing::debug!(field = %name, matches = matches.len(), "several checkboxes share the name, using the first");
    }

    match page.set_checked(first, true).await {
        Ok(()) => FillOutcome::Filled(FillMethod::DirectCheck),
        Err(e) => {
            tracing::warn!(field = %name, error = %e, "direct check failed, trying labels");
            click_label(page, name, first).await
        }
    }
}

async fn click_label<P: PageAutomation>(page: &P, name: &str, input: &P::Element) -> FillOutcome {
    match page.get_attribute(input, "id").await {
        Ok(Some(id)) if !id.is_empty() => {
            if click_label_for(page, &id).await {
                return FillOutcome::Filled(FillMethod::LabelFor);
            }
            tracing::debug!(field = %name, %id, "no usable label[for], trying ancestor label");
        }
        Ok(_) => {}
        Err(e) => tracing::debug!(field = %name, error = %e, "could not read id"),
    }

    match page.closest_ancestor(input, "label").await {
        Ok(Some(label)) => match page.click(&label).await {
            Ok(()) => return FillOutcome::Filled(FillMethod::AncestorLabel),
            Err(e) => tracing::debug!(field = %name, error = %e, "ancestor label click failed"),
        },
        Ok(None) => tracing::debug!(field = %name, "no ancestor label"),
        Err(e) => tracing::debug!(field = %name, error = %e, "ancestor lookup failed"),
    }

    FillOutcome::Failed(FailureReason::NoInteractiveTarget)
}

async fn click_label_for<P: PageAutomation>(page: &P, id: &str) -> bool {
    let Some(selector) = dispatch::label_for_selector(id) else {
        return false;
    };
    match page.query_selector(&selector).await {
        Ok(Some(label)) => page.click(&label).await.is_ok(),
        _ => false,
    }
}

async fn check_unnamed<P: PageAutomation>(page: &P) -> FillOutcome {
    match page.query_selector(dispatch::UNNAMED_CHECKBOX_SELECTOR).await {
        Ok(Some(checkbox)) => match page.set_checked(&checkbox, true).await {
            Ok(()) => FillOutcome::Filled(FillMethod::UnnamedCheckbox),
            Err(e) => FillOutcome::interaction(e),
        },
        Ok(None) => FillOutcome::Failed(FailureReason::ElementNotFound),
        Err(e) => FillOutcome::interaction(e),
    }
}
