use crate::assemble::RunDirectory;
use crate::error::Result;
use regex::{NoExpand, Regex, RegexBuilder};
use std::sync::LazyLock;

/// Returned when a run has no `generated.html`
pub const NO_HTML_PLACEHOLDER: &str = "<!doctype html><html><body><h3>No HTML generated.</h3></body></html>";

static STYLESHEET_LINK: LazyLock<Regex> = LazyLock::new(|| case_insensitive(r#"<link[^>]*href=["']?style\.css["']?[^>]*/?>"#));
static HEAD_CLOSE: LazyLock<Regex> = LazyLock::new(|| case_insensitive(r"</head>"));
static HTML_OPEN: LazyLock<Regex> = LazyLock::new(|| case_insensitive(r"<html[^>]*>"));

fn case_insensitive(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("built-in pattern is valid")
}

/// Run's generated HTML with its stylesheet inlined
pub fn preview_html(run: &RunDirectory) -> Result<String> {
    let Some(html) = run.read_optional(RunDirectory::GENERATED_HTML)? else {
        return Ok(NO_HTML_PLACEHOLDER.to_string());
    };
    let css = run.read_optional(RunDirectory::STYLE_CSS)?.unwrap_or_default();
    Ok(inline_css(&html, &css))
}

/// Inline `css` into `html`
///
/// A `<link href="style.css">` is replaced first. Failing that the style goes
/// before `</head>`, then into a new head after `<html>`, and finally the whole
/// document is wrapped.
pub fn inline_css(html: &str, css: &str) -> String {
    if css.trim().is_empty() {
        return html.to_string();
    }
    let style = format!("<style>{}</style>", css);

    if STYLESHEET_LINK.is_match(html) {
        return STYLESHEET_LINK.replace_all(html, NoExpand(&style)).into_owned();
    }
    if HEAD_CLOSE.is_match(html) {
        return HEAD_CLOSE
            .replace_all(html, NoExpand(&format!("{}</head>", style)))
            .into_owned();
    }
    if let Some(open) = HTML_OPEN.find(html) {
        let mut out = String::with_capacity(html.len() + style.len() + 16);
        out.push_str(&html[..open.end()]);
        out.push_str("\n<head>");
        out.push_str(&style);
        out.push_str("</head>");
        out.push_str(&html[open.end()..]);
        return out;
    }
    format!("<html><head>{}</head>{}</html>", style, html)
}
