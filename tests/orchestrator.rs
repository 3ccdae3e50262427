use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use form_autofill::testing::{MockAction, MockPage};
use form_autofill::{
    AutofillConfig, BrowserConfig, Error, FailureReason, FieldSchema, FieldTag, FillMethod, FillOutcome,
    FormSchema, HeuristicInference, HeuristicSynthesis, Hints, Orchestrator, SchemaInference,
    ValueSynthesis,
};

const CONTACT_PAGE: &str = r#"
<html><body>
  <h1>Contact</h1>
  <form action="/send" method="post">
    <input type="hidden" name="_token" value="abc123">
    <input name="company">
    <input name="email" type="email">
    <input type="checkbox" name="agree" id="agree" data-mock-reject-check>
    <label for="agree">I agree to the terms</label>
    <select name="plan"><option value="">Choose</option><option value="silver">Silver</option></select>
    <textarea name="body"></textarea>
    <button type="submit">Send</button>
  </form>
</body></html>
"#;

/// Returns a canned inference answer and records the markup it saw.
struct CannedInference {
    answer: String,
    seen: Arc<Mutex<Vec<String>>>,
}

impl CannedInference {
    fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            seen: Arc::default(),
        }
    }
}

#[async_trait]
impl SchemaInference for CannedInference {
    async fn infer_schema(&self, markup: &str) -> form_autofill::Result<FormSchema> {
        self.seen.lock().unwrap().push(markup.to_string());
        FormSchema::from_json(&self.answer)
    }
}

/// Echoes its input back, including hidden fields, with a value on each.
struct EchoSynthesis;

#[async_trait]
impl ValueSynthesis for EchoSynthesis {
    async fn synthesize_values(
        &self,
        schema: &FormSchema,
        _hints: &Hints,
    ) -> form_autofill::Result<FormSchema> {
        Ok(schema
            .iter()
            .map(|(name, field)| {
                let mut field = field.clone();
                field.value.get_or_insert_with(|| format!("{name}-value"));
                (name.clone(), field)
            })
            .collect())
    }
}

fn config() -> AutofillConfig {
    AutofillConfig::builder("https://example.com/contact")
        .grace_period(Duration::ZERO)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_hidden_fields_never_reach_the_report() {
    let inference = CannedInference::new(
        r#"{
            "_token": { "tag": "input", "type": "hidden", "value": "abc123" },
            "email": { "tag": "input", "type": "email" },
            "agree": { "tag": "input", "type": "checkbox", "value": "true" }
        }"#,
    );
    let page = MockPage::new(CONTACT_PAGE);

    let report = Orchestrator::new(config(), inference, EchoSynthesis)
        .run_on_page(&page)
        .await
        .unwrap();

    assert!(report.outcome("_token").is_none());
    assert_eq!(report.len(), 2);
    assert_eq!(report.outcome("email"), Some(&FillOutcome::Filled(FillMethod::Text)));
    assert_eq!(
        report.outcome("agree"),
        Some(&FillOutcome::Filled(FillMethod::LabelFor))
    );
}

#[tokio::test]
async fn test_inference_sees_only_form_markup() {
    let inference = CannedInference::new(r#"{ "email": { "tag": "input", "type": "email" } }"#);
    let seen = Arc::clone(&inference.seen);
    let page = MockPage::new(CONTACT_PAGE);

    Orchestrator::new(config(), inference, EchoSynthesis)
        .run_on_page(&page)
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains(r#"name="email""#));
    assert!(!seen[0].contains("<h1>"));
    assert_eq!(
        page.actions().first(),
        Some(&MockAction::Navigate("https://example.com/contact".into()))
    );
}

#[tokio::test]
async fn test_malformed_inference_aborts_before_any_field() {
    let page = MockPage::new(CONTACT_PAGE);

    let err = Orchestrator::new(config(), CannedInference::new("Sure! Here is the JSON"), EchoSynthesis)
        .run_on_page(&page)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::SchemaParseError(_)));
    assert!(err.is_upstream());
    assert_eq!(page.actions().len(), 1, "only the navigation happened");
}

#[tokio::test]
async fn test_page_without_form() {
    let page = MockPage::new("<html><body><p>No form here</p></body></html>");

    let err = Orchestrator::new(config(), HeuristicInference, HeuristicSynthesis)
        .run_on_page(&page)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoFormFound(_)));
}

#[tokio::test]
async fn test_only_hidden_fields_is_an_empty_schema() {
    let page = MockPage::new(r#"<form><input type="hidden" name="t" value="1"></form>"#);

    let err = Orchestrator::new(config(), HeuristicInference, HeuristicSynthesis)
        .run_on_page(&page)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::EmptySchema));
}

#[tokio::test]
async fn test_navigation_failure_is_fatal() {
    let page = MockPage::new(CONTACT_PAGE).failing_navigation();

    let err = Orchestrator::new(config(), HeuristicInference, HeuristicSynthesis)
        .run_on_page(&page)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NavigationError(_)));
    assert!(!err.is_upstream());
}

#[tokio::test]
async fn test_offline_pipeline_fills_contact_form() {
    let config = AutofillConfig::builder("https://example.com/contact")
        .grace_period(Duration::ZERO)
        .hint("company", "Acme")
        .build()
        .unwrap();
    let page = MockPage::new(CONTACT_PAGE);

    let report = Orchestrator::new(config, HeuristicInference, HeuristicSynthesis)
        .run_on_page(&page)
        .await
        .unwrap();

    let order: Vec<_> = report.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(order, ["company", "email", "agree", "plan", "body"]);
    assert_eq!(report.failed(), 0);
    assert_eq!(page.value_of(r#"input[name="company"]"#).as_deref(), Some("Acme"));
    assert_eq!(
        page.value_of(r#"input[name="email"]"#).as_deref(),
        Some("john.doe@example.com")
    );
    assert_eq!(page.value_of("select").as_deref(), Some("silver"));
    assert!(page.is_checked("#agree"));
}

#[tokio::test]
async fn test_per_field_failures_do_not_fail_the_run() {
    let inference = CannedInference::new(
        r#"{
            "plan": { "tag": "select", "value": "gold" },
            "ghost": { "tag": "input", "type": "text" },
            "body": { "tag": "textarea", "type": "text" }
        }"#,
    );
    let page = MockPage::new(CONTACT_PAGE);

    let report = Orchestrator::new(config(), inference, EchoSynthesis)
        .run_on_page(&page)
        .await
        .unwrap();

    assert_eq!(
        report.outcome("plan"),
        Some(&FillOutcome::Failed(FailureReason::OptionNotFound))
    );
    assert_eq!(
        report.outcome("ghost"),
        Some(&FillOutcome::Failed(FailureReason::ElementNotFound))
    );
    assert_eq!(report.outcome("body"), Some(&FillOutcome::Filled(FillMethod::Text)));
    assert_eq!(page.value_of("textarea").as_deref(), Some("body-value"));
}

#[tokio::test]
async fn test_synthesis_cannot_retag_fields() {
    struct Retagging;

    #[async_trait]
    impl ValueSynthesis for Retagging {
        async fn synthesize_values(
            &self,
            schema: &FormSchema,
            hints: &Hints,
        ) -> form_autofill::Result<FormSchema> {
            let mut answer = FormSchema::new();
            answer.insert("email", FieldSchema::new(FieldTag::Textarea, "text").with_value("x@y.z"));
            Ok(form_autofill::services::reconcile(schema, &answer, hints))
        }
    }

    let inference = CannedInference::new(r#"{ "email": { "tag": "input", "type": "email" } }"#);
    let page = MockPage::new(CONTACT_PAGE);

    let report = Orchestrator::new(config(), inference, Retagging)
        .run_on_page(&page)
        .await
        .unwrap();

    assert_eq!(report.outcome("email"), Some(&FillOutcome::Filled(FillMethod::Text)));
    assert_eq!(page.value_of(r#"input[name="email"]"#).as_deref(), Some("x@y.z"));
}

#[tokio::test]
async fn test_submit_runs_after_filling() {
    let config = AutofillConfig::builder("https://example.com/contact")
        .grace_period(Duration::from_millis(10))
        .submit(true)
        .build()
        .unwrap();
    let page = MockPage::new(CONTACT_PAGE).with_evaluate_result(serde_json::json!(true));

    Orchestrator::new(config, HeuristicInference, HeuristicSynthesis)
        .run_on_page(&page)
        .await
        .unwrap();

    let actions = page.actions();
    let Some(MockAction::Evaluate { function, .. }) = actions.last() else {
        panic!("expected submission last, got {actions:?}");
    };
    assert!(function.contains("requestSubmit"));
}

#[tokio::test]
async fn test_no_submit_by_default() {
    let page = MockPage::new(CONTACT_PAGE);

    Orchestrator::new(config(), HeuristicInference, HeuristicSynthesis)
        .run_on_page(&page)
        .await
        .unwrap();

    assert!(!page
        .actions()
        .iter()
        .any(|a| matches!(a, MockAction::Evaluate { .. })));
}

#[tokio::test]
async fn test_headless_runs_skip_the_grace_period() {
    let config = AutofillConfig::builder("https://example.com/contact")
        .grace_period(Duration::from_secs(3600))
        .build()
        .unwrap();
    assert!(config.browser.headless);
    let page = MockPage::new(CONTACT_PAGE);

    let orchestrator = Orchestrator::new(config, HeuristicInference, HeuristicSynthesis);
    let run = orchestrator.run_on_page(&page);
    let report = tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .expect("grace period should be skipped")
        .unwrap();

    assert_eq!(report.failed(), 0);
}

#[tokio::test]
async fn test_headed_runs_hold_the_page_open() {
    let config = AutofillConfig::builder("https://example.com/contact")
        .grace_period(Duration::from_millis(50))
        .browser(BrowserConfig {
            headless: false,
            ..BrowserConfig::default()
        })
        .build()
        .unwrap();
    let page = MockPage::new(CONTACT_PAGE);

    let started = Instant::now();
    Orchestrator::new(config, HeuristicInference, HeuristicSynthesis)
        .run_on_page(&page)
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(50));
}
