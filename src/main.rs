use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use form_autofill::{
    AutofillConfig, BrowserConfig, FillReport, HeuristicInference, HeuristicSynthesis, Hints,
    LlmClient, LlmConfig, Orchestrator,
};
use tracing_subscriber::EnvFilter;

/// Fill an unseen web form: discover its fields, guess what they mean,
/// invent plausible values and type them in.
#[derive(Debug, Parser)]
#[command(name = "form-autofill", version)]
struct Args {
    /// Page containing the form.
    url: String,

    /// Known value for a field, as NAME=VALUE. Repeatable.
    #[arg(long = "hint", value_name = "NAME=VALUE", value_parser = parse_hint)]
    hints: Vec<(String, String)>,

    /// JSON object of known values keyed by field name.
    #[arg(long, value_name = "PATH")]
    hints_file: Option<PathBuf>,

    /// Infer and synthesize locally instead of calling the LLM endpoint.
    #[arg(long)]
    offline: bool,

    /// Show the browser window.
    #[arg(long)]
    headed: bool,

    /// Seconds to keep the filled page open before finishing (headed only).
    #[arg(long, default_value_t = 30)]
    grace_secs: u64,

    /// Submit the form after the grace period.
    #[arg(long)]
    submit: bool,

    #[arg(long)]
    chrome_path: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "OPENAI_API_BASE", default_value = LlmConfig::DEFAULT_API_BASE)]
    api_base: String,

    #[arg(long, env = "FORM_AUTOFILL_MODEL", default_value = LlmConfig::DEFAULT_MODEL)]
    model: String,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

fn parse_hint(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got {raw:?}")),
    }
}

fn load_hints(args: &Args) -> form_autofill::Result<Hints> {
    let mut hints = Hints::new();
    if let Some(path) = &args.hints_file {
        let text = std::fs::read_to_string(path)?;
        let from_file: Hints = serde_json::from_str(&text)?;
        hints.extend(from_file);
    }
    hints.extend(args.hints.iter().cloned());
    Ok(hints)
}

fn build_orchestrator(args: &Args) -> form_autofill::Result<Orchestrator> {
    let mut browser = BrowserConfig {
        headless: !args.headed,
        ..BrowserConfig::default()
    };
    browser.chrome_path = args.chrome_path.clone();

    let config = AutofillConfig::builder(&args.url)
        .hints(load_hints(args)?)
        .grace_period(Duration::from_secs(args.grace_secs))
        .submit(args.submit)
        .browser(browser)
        .build()?;

    if args.offline {
        return Ok(Orchestrator::new(config, HeuristicInference, HeuristicSynthesis));
    }

    let api_key = args.api_key.clone().ok_or_else(|| {
        form_autofill::Error::ConfigError(
            "OPENAI_API_KEY is not set (use --offline to skip the LLM)".into(),
        )
    })?;
    let llm = LlmConfig::new(api_key)
        .api_base(&args.api_base)
        .model(&args.model);
    Ok(Orchestrator::new(
        config,
        LlmClient::new(llm.clone()),
        LlmClient::new(llm),
    ))
}

fn print_report(report: &FillReport) {
    println!("{} field(s):", report.len());
    for (field, outcome) in report.iter() {
        println!("  {field:<32} {outcome}");
    }
    println!(
        "filled {}, failed {}, skipped {}",
        report.filled(),
        report.failed(),
        report.skipped()
    );
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("form_autofill=info")),
        )
        .init();

    let args = Args::parse();

    let orchestrator = match build_orchestrator(&args) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    match orchestrator.run().await {
        Ok(report) => {
            if args.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("error: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print_report(&report);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "run aborted");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
