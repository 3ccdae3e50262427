pub mod automation;
pub mod browser;
pub mod config;
pub mod discovery;
pub mod element;
pub mod error;
pub mod fill;
pub mod orchestrator;
pub mod page;
pub mod schema;
pub mod services;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use automation::PageAutomation;
pub use browser::Browser;
pub use config::{AutofillConfig, BrowserConfig, Hints, LlmConfig};
pub use error::{Error, Result};
pub use fill::{FailureReason, FillEngine, FillMethod, FillOutcome, FillReport, SkipReason};
pub use orchestrator::Orchestrator;
pub use page::Page;
pub use schema::{FieldSchema, FieldTag, FormSchema};
pub use services::{HeuristicInference, HeuristicSynthesis, LlmClient, SchemaInference, ValueSynthesis};
