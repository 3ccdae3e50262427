//! The fill engine: drives a resolved [`FormSchema`] into a live page one
//! field at a time and records what happened to each field.
//!
//! Failures of individual fields never stop the loop. Page errors are
//! caught at every strategy boundary and turned into a fallback step or a
//! [`FillOutcome::Failed`] entry in the [`FillReport`].

mod checkbox;
pub mod defaults;
pub mod dispatch;

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::automation::PageAutomation;
use crate::error::Error;
use crate::schema::{FieldSchema, FormSchema};

use self::dispatch::Strategy;

/// Which interaction succeeded for a filled field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMethod {
    Text,
    Select,
    Radio,
    /// Checkbox checked through its own `name`.
    DirectCheck,
    /// Checkbox toggled by clicking `label[for=<id>]`.
    LabelFor,
    /// Checkbox toggled by clicking the label wrapped around it.
    AncestorLabel,
    /// First `input[type=checkbox]` without a name.
    UnnamedCheckbox,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    UnsupportedTag(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Radio value matched zero or several options.
    ValueMismatch,
    OptionNotFound,
    ElementNotFound,
    /// Checkbox could not be checked and no label could stand in for it.
    NoInteractiveTarget,
    /// Field key cannot be expressed as a `name` selector.
    InvalidFieldKey,
    /// The page refused an interaction and no fallback was left.
    Interaction(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FillOutcome {
    Filled(FillMethod),
    Skipped(SkipReason),
    Failed(FailureReason),
}

impl FillOutcome {
    pub fn is_filled(&self) -> bool {
        matches!(self, FillOutcome::Filled(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FillOutcome::Failed(_))
    }

    fn interaction(err: Error) -> Self {
        FillOutcome::Failed(FailureReason::Interaction(err.to_string()))
    }
}

impl fmt::Display for FillOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillOutcome::Filled(method) => write!(f, "filled ({method:?})"),
            FillOutcome::Skipped(SkipReason::UnsupportedTag(tag)) => {
                write!(f, "skipped (unsupported tag <{tag}>)")
            }
            FillOutcome::Failed(FailureReason::Interaction(msg)) => write!(f, "failed ({msg})"),
            FillOutcome::Failed(reason) => write!(f, "failed ({reason:?})"),
        }
    }
}

/// Outcome per field, in the order the fields were processed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FillReport {
    outcomes: IndexMap<String, FillOutcome>,
}

impl FillReport {
    pub fn outcome(&self, field: &str) -> Option<&FillOutcome> {
        self.outcomes.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FillOutcome)> {
        self.outcomes.iter()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn filled(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_filled()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_failed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.len() - self.filled() - self.failed()
    }

    fn record(&mut self, field: &str, outcome: FillOutcome) {
        self.outcomes.insert(field.to_string(), outcome);
    }
}

/// Fills fields against one page. Holds no state between calls, so
/// running it twice over an unchanged page gives the same report.
pub struct FillEngine<'p, P: PageAutomation> {
    page: &'p P,
}

impl<'p, P: PageAutomation> FillEngine<'p, P> {
    pub fn new(page: &'p P) -> Self {
        Self { page }
    }

    /// Process every field in schema order.
    pub async fn fill(&self, schema: &FormSchema) -> FillReport {
        let mut report = FillReport::default();
        for (name, field) in schema {
            let outcome = self.fill_field(name, field).await;
            match &outcome {
                FillOutcome::Failed(_) => {
                    tracing::warn!(field = %name, tag = %field.tag, %outcome, "field not filled")
                }
                _ => tracing::info!(field = %name, tag = %field.tag, %outcome, "field processed"),
            }
            report.record(name, outcome);
        }
        tracing::info!(
            filled = report.filled(),
            failed = report.failed(),
            skipped = report.skipped(),
            "fill pass finished"
        );
        report
    }

    pub async fn fill_field(&self, name: &str, field: &FieldSchema) -> FillOutcome {
        let value = defaults::resolve_value(field);
        if field.value.as_deref().map_or(true, str::is_empty) {
            tracing::debug!(field = %name, value = %value, "no synthesized value, using default");
        }

        match dispatch::strategy_for(field) {
            Strategy::Checkbox => checkbox::check(self.page, name).await,
            Strategy::Radio => self.fill_radio(name, value).await,
            Strategy::Select => self.fill_select(name, value).await,
            Strategy::Text => self.fill_text(name, field, value).await,
            Strategy::Unsupported => {
                FillOutcome::Skipped(SkipReason::UnsupportedTag(field.tag.to_string()))
            }
        }
    }

    async fn fill_radio(&self, name: &str, value: &str) -> FillOutcome {
        if dispatch::name_selector("input", name).is_none() {
            return FillOutcome::Failed(FailureReason::InvalidFieldKey);
        }
        let Some(selector) = dispatch::radio_selector(name, value) else {
            return FillOutcome::Failed(FailureReason::ValueMismatch);
        };

        let options = match self.page.query_selector_all(&selector).await {
            Ok(options) => options,
            Err(e) => return FillOutcome::interaction(e),
        };
        let [option] = options.as_slice() else {
            tracing::debug!(%selector, matches = options.len(), "radio value must match exactly one option");
            return FillOutcome::Failed(FailureReason::ValueMismatch);
        };

        match self.page.set_checked(option, true).await {
            Ok(()) => FillOutcome::Filled(FillMethod::Radio),
            Err(e) => FillOutcome::interaction(e),
        }
    }

    async fn fill_select(&self, name: &str, value: &str) -> FillOutcome {
        let Some(selector) = dispatch::name_selector("select", name) else {
            return FillOutcome::Failed(FailureReason::InvalidFieldKey);
        };

        match self.page.select_option(&selector, value).await {
            Ok(()) => FillOutcome::Filled(FillMethod::Select),
            Err(Error::OptionNotFound { .. }) => FillOutcome::Failed(FailureReason::OptionNotFound),
            Err(Error::ElementNotFound(_)) => FillOutcome::Failed(FailureReason::ElementNotFound),
            Err(e) => FillOutcome::interaction(e),
        }
    }

    async fn fill_text(&self, name: &str, field: &FieldSchema, value: &str) -> FillOutcome {
        let Some(selector) = dispatch::name_selector(field.tag.as_str(), name) else {
            return FillOutcome::Failed(FailureReason::InvalidFieldKey);
        };

        match self.page.fill_text(&selector, value).await {
            Ok(()) => FillOutcome::Filled(FillMethod::Text),
            Err(Error::ElementNotFound(_)) => FillOutcome::Failed(FailureReason::ElementNotFound),
            Err(e) => FillOutcome::interaction(e),
        }
    }
}
