//! Schema inference and value synthesis seams.
//!
//! Both steps are plain request/response contracts so an LLM, a local
//! heuristic or a test double can stand behind them without the fill engine
//! noticing.

mod heuristic;
mod llm;

use async_trait::async_trait;

use crate::config::Hints;
use crate::error::Result;
use crate::schema::FormSchema;

pub use heuristic::{HeuristicInference, HeuristicSynthesis};
pub use llm::LlmClient;

/// Form markup in, field schema out.
#[async_trait]
pub trait SchemaInference: Send + Sync {
    async fn infer_schema(&self, markup: &str) -> Result<FormSchema>;
}

/// Field schema in, the same fields with concrete values out.
#[async_trait]
pub trait ValueSynthesis: Send + Sync {
    async fn synthesize_values(&self, schema: &FormSchema, hints: &Hints) -> Result<FormSchema>;
}

/// Fold a synthesis answer back onto the inferred schema.
///
/// The result has exactly the inferred non-hidden fields, in inferred order,
/// with their inferred `tag` and `type`. Values come from, in priority order:
/// the caller's hints, a value the inferred schema already carried, the
/// synthesized value. Fields the service dropped keep no value, leaving them
/// to the fill engine's defaults.
pub fn reconcile(inferred: &FormSchema, synthesized: &FormSchema, hints: &Hints) -> FormSchema {
    for name in synthesized.names().filter(|n| !inferred.contains(n)) {
        tracing::debug!(field = %name, "dropping field invented by synthesis");
    }

    inferred
        .iter()
        .filter(|(_, field)| !field.is_hidden())
        .map(|(name, field)| {
            let mut resolved = field.clone();
            resolved.value = hints
                .get(name)
                .cloned()
                .or_else(|| field.value.clone())
                .or_else(|| synthesized.get(name).and_then(|s| s.value.clone()));
            if resolved.value.is_none() {
                tracing::debug!(field = %name, "synthesis left field without a value");
            }
            (name.clone(), resolved)
        })
        .collect()
}
