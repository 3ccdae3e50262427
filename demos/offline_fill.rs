use std::time::Duration;

use form_autofill::{AutofillConfig, HeuristicInference, HeuristicSynthesis, Orchestrator};

#[tokio::main]
async fn main() -> form_autofill::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("form_autofill=debug")
        .init();

    let config = AutofillConfig::builder("https://httpbin.org/forms/post")
        .hint("custname", "Agent Browser")
        .hint("custemail", "agent@example.com")
        .grace_period(Duration::from_secs(5))
        .build()?;

    let report = Orchestrator::new(config, HeuristicInference, HeuristicSynthesis)
        .run()
        .await?;

    println!("Processed {} form fields:", report.len());
    for (field, outcome) in report.iter() {
        println!("  {field}: {outcome}");
    }

    Ok(())
}
