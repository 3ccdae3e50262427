//! Runs against a real Chrome. `cargo test -- --ignored` with Chrome installed.

use std::time::Duration;

use form_autofill::{
    AutofillConfig, Browser, FailureReason, FieldSchema, FieldTag, FillEngine, FillMethod,
    FillOutcome, FormSchema, HeuristicInference, HeuristicSynthesis, Orchestrator, PageAutomation,
};
use serde_json::{json, Value};

const FORM: &str = r#"<!doctype html>
<html><body>
<form onsubmit="return false">
  <input name="email" type="email">
  <input name="company">
  <span><input type="checkbox" name="agree" id="agree" style="display:none" disabled>
  <label for="agree" onclick="document.getElementById('agree').disabled = false">I agree</label></span>
  <label><input type="checkbox"> newsletter</label>
  <input type="radio" name="reason" value="youtube"><input type="radio" name="reason" value="tv">
  <select name="plan"><option value="">-</option><option value="silver">Silver</option></select>
  <textarea name="body"></textarea>
</form>
</body></html>"#;

fn data_url(html: &str) -> String {
    let mut url = String::from("data:text/html,");
    for b in html.bytes() {
        if b.is_ascii_alphanumeric() {
            url.push(b as char);
        } else {
            url.push_str(&format!("%{b:02X}"));
        }
    }
    url
}

async fn read(page: &impl PageAutomation, expr: &str) -> Value {
    page.evaluate_in_page(&format!("() => {expr}"), Value::Null)
        .await
        .expect("Failed to evaluate")
}

#[tokio::test]
#[ignore = "needs a local Chrome"]
async fn test_fill_engine_against_chrome() {
    let browser = Browser::builder()
        .headless(true)
        .build()
        .await
        .expect("Failed to launch browser");
    let page = browser.new_page().await.expect("Failed to open page");
    page.navigate(&data_url(FORM)).await.expect("Failed to navigate");

    let mut schema = FormSchema::new();
    schema.insert("email", FieldSchema::new(FieldTag::Input, "email").with_value("a@b.com"));
    schema.insert("agree", FieldSchema::new(FieldTag::Input, "checkbox").with_value("true"));
    schema.insert("news", FieldSchema::new(FieldTag::Input, "checkbox"));
    schema.insert("reason", FieldSchema::new(FieldTag::Input, "radio").with_value("tv"));
    schema.insert("plan", FieldSchema::new(FieldTag::Select, "").with_value("gold"));
    schema.insert("body", FieldSchema::new(FieldTag::Textarea, "text"));

    let report = FillEngine::new(&page).fill(&schema).await;

    assert_eq!(report.outcome("email"), Some(&FillOutcome::Filled(FillMethod::Text)));
    assert_eq!(
        report.outcome("agree"),
        Some(&FillOutcome::Filled(FillMethod::LabelFor))
    );
    assert_eq!(
        report.outcome("news"),
        Some(&FillOutcome::Filled(FillMethod::UnnamedCheckbox))
    );
    assert_eq!(report.outcome("reason"), Some(&FillOutcome::Filled(FillMethod::Radio)));
    assert_eq!(
        report.outcome("plan"),
        Some(&FillOutcome::Failed(FailureReason::OptionNotFound))
    );

    assert_eq!(
        read(&page, "document.querySelector('[name=email]').value").await,
        json!("a@b.com")
    );
    assert_eq!(
        read(&page, "document.querySelector('[name=body]').value").await,
        json!("default text")
    );
    assert_eq!(
        read(&page, "document.querySelector('[value=tv]').checked").await,
        json!(true)
    );

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "needs a local Chrome"]
async fn test_ancestor_lookup_leaves_the_dom_untouched() {
    let browser = Browser::builder()
        .headless(true)
        .build()
        .await
        .expect("Failed to launch browser");
    let page = browser.new_page().await.expect("Failed to open page");
    page.navigate(&data_url(FORM)).await.expect("Failed to navigate");

    let checkbox = page
        .query_selector(r#"input[type="checkbox"]:not([name])"#)
        .await
        .expect("Failed to query")
        .expect("unnamed checkbox present");
    let label = page
        .closest_ancestor(&checkbox, "label")
        .await
        .expect("Failed to look up ancestor");
    assert!(label.is_some());
    assert_eq!(
        read(&page, "document.querySelectorAll('[data-autofill-ref]').length").await,
        json!(0)
    );

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "needs a local Chrome"]
async fn test_offline_run_against_chrome() {
    let config = AutofillConfig::builder(data_url(FORM))
        .grace_period(Duration::ZERO)
        .submit(true)
        .build()
        .expect("Failed to build config");

    let report = Orchestrator::new(config, HeuristicInference, HeuristicSynthesis)
        .run()
        .await
        .expect("Run failed");

    assert_eq!(report.outcome("email"), Some(&FillOutcome::Filled(FillMethod::Text)));
    assert_eq!(report.outcome("plan"), Some(&FillOutcome::Filled(FillMethod::Select)));
    assert!(report.filled() >= 5, "report: {report:?}");
}
