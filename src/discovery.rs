use scraper::{Html, Selector};

/// Concatenated inner markup of every `<form>` in `page_content`, in document
/// order. Empty when the page has no form.
pub fn extract_form_markup(page_content: &str) -> String {
    let document = Html::parse_document(page_content);
    let Ok(forms) = Selector::parse("form") else {
        return String::new();
    };
    document
        .select(&forms)
        .map(|form| form.inner_html())
        .collect()
}
