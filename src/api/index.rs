//! Index page built from the README

use axum::{extract::State, response::Html};
use pulldown_cmark::{html, Parser};

use super::state::AppState;

/// Body of the `## About` section, without its heading
///
/// Empty when the document has no such section.
pub fn about_section(readme: &str) -> &str {
    readme
        .split("\n## ")
        .find_map(|section| section.strip_prefix("About"))
        .map(str::trim)
        .unwrap_or_default()
}

pub fn render_markdown(markdown: &str) -> String {
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, Parser::new(markdown));
    output
}

/// Rendered About section of `readme`
pub fn render_about(readme: &str) -> String {
    render_markdown(about_section(readme))
}

/// GET /
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<section class=\"about\">\n{}</section>\n",
        state.about_html
    ))
}
