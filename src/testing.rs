//! In-memory [`PageAutomation`] for exercising the fill engine without Chrome.
//!
//! The document is plain HTML queried with `scraper`, so selectors behave like
//! they do in a browser. Interaction state (checked boxes, typed values,
//! clicks) is tracked next to the markup. Failures are injected with
//! attributes:
//!
//! - `data-mock-reject-check`: `set_checked` on this element fails
//! - `data-mock-reject-click`: `click` on this element fails
//! - `disabled` / `readonly`: the usual refusals
//!
//! Clicking a `<label>` toggles the checkbox it points at (`for=`) or wraps.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use crate::automation::PageAutomation;
use crate::error::{Error, Result};

/// Handle to an element of a [`MockPage`]: its position in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockElement(usize);

/// Something the engine did to the page, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum MockAction {
    Navigate(String),
    SetChecked { element: String, checked: bool },
    Click(String),
    Fill { selector: String, value: String },
    Select { selector: String, value: String },
    Evaluate { function: String, arg: Value },
}

#[derive(Default)]
struct MockState {
    checked: BTreeMap<usize, bool>,
    values: BTreeMap<usize, String>,
    actions: Vec<MockAction>,
}

pub struct MockPage {
    html: String,
    fail_navigation: bool,
    evaluate_result: Value,
    state: Mutex<MockState>,
}

impl MockPage {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            fail_navigation: false,
            evaluate_result: Value::Null,
            state: Mutex::new(MockState::default()),
        }
    }

    /// Make every `navigate` call fail.
    pub fn failing_navigation(mut self) -> Self {
        self.fail_navigation = true;
        self
    }

    /// What `evaluate_in_page` returns.
    pub fn with_evaluate_result(mut self, result: Value) -> Self {
        self.evaluate_result = result;
        self
    }

    pub fn actions(&self) -> Vec<MockAction> {
        self.state().actions.clone()
    }

    /// Whether the first element matching `selector` is currently checked.
    pub fn is_checked(&self, selector: &str) -> bool {
        let state = self.state();
        self.with_doc(|doc| {
            let all = all_elements(doc);
            first_match(doc, &all, selector)
                .ok()
                .flatten()
                .is_some_and(|i| checked_state(&state, &all, i))
        })
    }

    /// Value typed or selected into the first element matching `selector`.
    pub fn value_of(&self, selector: &str) -> Option<String> {
        let state = self.state();
        self.with_doc(|doc| {
            let all = all_elements(doc);
            let i = first_match(doc, &all, selector).ok().flatten()?;
            state.values.get(&i).cloned()
        })
    }

    /// Whether the first element matching `selector` was ever clicked.
    pub fn was_clicked(&self, selector: &str) -> bool {
        let target = self.with_doc(|doc| {
            let all = all_elements(doc);
            first_match(doc, &all, selector)
                .ok()
                .flatten()
                .map(|i| describe(&all[i], i))
        });
        let Some(target) = target else {
            return false;
        };
        self.state()
            .actions
            .iter()
            .any(|a| matches!(a, MockAction::Click(el) if *el == target))
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn with_doc<R>(&self, f: impl FnOnce(&Html) -> R) -> R {
        let doc = Html::parse_document(&self.html);
        f(&doc)
    }

    fn query(&self, selector: &str) -> Result<Vec<MockElement>> {
        self.with_doc(|doc| {
            let all = all_elements(doc);
            Ok(matches(doc, &all, selector)?
                .into_iter()
                .map(MockElement)
                .collect())
        })
    }

    fn attribute(&self, element: MockElement, name: &str) -> Result<Option<String>> {
        self.with_doc(|doc| {
            let all = all_elements(doc);
            let el = lookup(&all, element)?;
            Ok(el.value().attr(name).map(str::to_string))
        })
    }

    fn check(&self, element: MockElement, checked: bool) -> Result<()> {
        let mut state = self.state();
        self.with_doc(|doc| {
            let all = all_elements(doc);
            let el = lookup(&all, element)?;
            state.actions.push(MockAction::SetChecked {
                element: describe(el, element.0),
                checked,
            });
            if !is_checkable(el) {
                return Err(Error::InteractionError("element is not checkable".into()));
            }
            let attrs = el.value();
            if attrs.attr("disabled").is_some() {
                return Err(Error::InteractionError("element is disabled".into()));
            }
            if attrs.attr("data-mock-reject-check").is_some() {
                return Err(Error::InteractionError(
                    "element reverted its checked state".into(),
                ));
            }
            if checked && input_type(el) == "radio" {
                // checking a radio clears the rest of its group
                if let Some(group) = attrs.attr("name") {
                    for (i, other) in all.iter().enumerate() {
                        if input_type(other) == "radio" && other.value().attr("name") == Some(group) {
                            state.checked.insert(i, false);
                        }
                    }
                }
            }
            state.checked.insert(element.0, checked);
            Ok(())
        })
    }

    fn press(&self, element: MockElement) -> Result<()> {
        let mut state = self.state();
        self.with_doc(|doc| {
            let all = all_elements(doc);
            let el = lookup(&all, element)?;
            state.actions.push(MockAction::Click(describe(el, element.0)));
            if el.value().attr("data-mock-reject-click").is_some() {
                return Err(Error::InteractionError("element is not clickable".into()));
            }
            if el.value().name() == "label" {
                if let Some(target) = label_target(&all, el) {
                    let now = checked_state(&state, &all, target);
                    state.checked.insert(target, !now);
                }
            } else if is_checkable(el) {
                let now = checked_state(&state, &all, element.0);
                state.checked.insert(element.0, !now);
            }
            Ok(())
        })
    }

    fn ancestor(&self, element: MockElement, tag: &str) -> Result<Option<MockElement>> {
        self.with_doc(|doc| {
            let all = all_elements(doc);
            let el = lookup(&all, element)?;
            let found = el
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|a| a.value().name().eq_ignore_ascii_case(tag));
            Ok(found.and_then(|a| index_of(&all, a)).map(MockElement))
        })
    }

    fn type_into(&self, selector: &str, value: &str) -> Result<()> {
        let mut state = self.state();
        self.with_doc(|doc| {
            let all = all_elements(doc);
            state.actions.push(MockAction::Fill {
                selector: selector.to_string(),
                value: value.to_string(),
            });
            let i = first_match(doc, &all, selector)?
                .ok_or_else(|| Error::ElementNotFound(selector.to_string()))?;
            let el = &all[i];
            let attrs = el.value();
            if attrs.attr("disabled").is_some() || attrs.attr("readonly").is_some() {
                return Err(Error::InteractionError("element is not editable".into()));
            }
            let fillable = match attrs.name() {
                "textarea" => true,
                "input" => !matches!(
                    input_type(el).as_str(),
                    "checkbox" | "radio" | "submit" | "button" | "reset" | "image" | "file"
                ),
                _ => attrs.attr("contenteditable").is_some(),
            };
            if !fillable {
                return Err(Error::InteractionError(format!(
                    "{} cannot be filled",
                    describe(el, i)
                )));
            }
            state.values.insert(i, value.to_string());
            Ok(())
        })
    }

    fn choose(&self, selector: &str, value: &str) -> Result<()> {
        let mut state = self.state();
        self.with_doc(|doc| {
            let all = all_elements(doc);
            state.actions.push(MockAction::Select {
                selector: selector.to_string(),
                value: value.to_string(),
            });
            let i = first_match(doc, &all, selector)?
                .ok_or_else(|| Error::ElementNotFound(selector.to_string()))?;
            let el = &all[i];
            if el.value().name() != "select" {
                return Err(Error::InteractionError(format!(
                    "{} is not a select",
                    describe(el, i)
                )));
            }
            let has_option = el
                .descendants()
                .filter_map(ElementRef::wrap)
                .filter(|o| o.value().name() == "option")
                .any(|o| option_value(&o) == value);
            if !has_option {
                return Err(Error::OptionNotFound {
                    selector: selector.to_string(),
                    value: value.to_string(),
                });
            }
            if el.value().attr("disabled").is_some() {
                return Err(Error::InteractionError("select is disabled".into()));
            }
            state.values.insert(i, value.to_string());
            Ok(())
        })
    }
}

#[async_trait]
impl PageAutomation for MockPage {
    type Element = MockElement;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.state().actions.push(MockAction::Navigate(url.to_string()));
        if self.fail_navigation {
            return Err(Error::NavigationError(format!("{url}: unreachable")));
        }
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        Ok(self.html.clone())
    }

    async fn query_selector(&self, selector: &str) -> Result<Option<MockElement>> {
        Ok(self.query(selector)?.into_iter().next())
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<MockElement>> {
        self.query(selector)
    }

    async fn get_attribute(&self, element: &MockElement, name: &str) -> Result<Option<String>> {
        self.attribute(*element, name)
    }

    async fn set_checked(&self, element: &MockElement, checked: bool) -> Result<()> {
        self.check(*element, checked)
    }

    async fn click(&self, element: &MockElement) -> Result<()> {
        self.press(*element)
    }

    async fn closest_ancestor(&self, element: &MockElement, tag: &str) -> Result<Option<MockElement>> {
        self.ancestor(*element, tag)
    }

    async fn fill_text(&self, selector: &str, value: &str) -> Result<()> {
        self.type_into(selector, value)
    }

    async fn select_option(&self, selector: &str, value: &str) -> Result<()> {
        self.choose(selector, value)
    }

    async fn evaluate_in_page(&self, function: &str, arg: Value) -> Result<Value> {
        self.state().actions.push(MockAction::Evaluate {
            function: function.to_string(),
            arg,
        });
        Ok(self.evaluate_result.clone())
    }
}

fn all_elements(doc: &Html) -> Vec<ElementRef<'_>> {
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .collect()
}

fn index_of(all: &[ElementRef<'_>], el: ElementRef<'_>) -> Option<usize> {
    all.iter().position(|e| std::ptr::eq(e.value(), el.value()))
}

fn lookup<'a, 'b>(all: &'b [ElementRef<'a>], element: MockElement) -> Result<&'b ElementRef<'a>> {
    all.get(element.0)
        .ok_or_else(|| Error::InteractionError(format!("stale element handle {}", element.0)))
}

fn matches(doc: &Html, all: &[ElementRef<'_>], selector: &str) -> Result<Vec<usize>> {
    let parsed = Selector::parse(selector)
        .map_err(|e| Error::InteractionError(format!("invalid selector {selector}: {e:?}")))?;
    Ok(doc
        .select(&parsed)
        .filter_map(|el| index_of(all, el))
        .collect())
}

fn first_match(doc: &Html, all: &[ElementRef<'_>], selector: &str) -> Result<Option<usize>> {
    Ok(matches(doc, all, selector)?.into_iter().next())
}

fn input_type(el: &ElementRef<'_>) -> String {
    if el.value().name() != "input" {
        return String::new();
    }
    el.value()
        .attr("type")
        .unwrap_or("text")
        .trim()
        .to_ascii_lowercase()
}

fn is_checkable(el: &ElementRef<'_>) -> bool {
    matches!(input_type(el).as_str(), "checkbox" | "radio")
}

fn checked_state(state: &MockState, all: &[ElementRef<'_>], i: usize) -> bool {
    state
        .checked
        .get(&i)
        .copied()
        .unwrap_or_else(|| all[i].value().attr("checked").is_some())
}

fn option_value(option: &ElementRef<'_>) -> String {
    match option.value().attr("value") {
        Some(value) => value.to_string(),
        None => option.text().collect::<String>().trim().to_string(),
    }
}

/// The control a label activates: its `for` target, else the first
/// checkable input inside it.
fn label_target(all: &[ElementRef<'_>], label: &ElementRef<'_>) -> Option<usize> {
    if let Some(id) = label.value().attr("for") {
        return all
            .iter()
            .position(|e| e.value().attr("id") == Some(id))
            .filter(|&i| is_checkable(&all[i]));
    }
    label
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| is_checkable(el))
        .and_then(|el| index_of(all, el))
}

fn describe(el: &ElementRef<'_>, index: usize) -> String {
    let attrs = el.value();
    let mut out = attrs.name().to_string();
    if let Some(id) = attrs.attr("id") {
        out.push('#');
        out.push_str(id);
    }
    if let Some(name) = attrs.attr("name") {
        out.push_str(&format!("[name={name}]"));
    }
    if let Some(target) = attrs.attr("for") {
        out.push_str(&format!("[for={target}]"));
    }
    out.push_str(&format!("@{index}"));
    out
}
