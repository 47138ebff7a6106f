//! Splitting generated text into markup, style and script fragments.
//!
//! The model is asked for a single page, but usually answers with a
//! markdown code block mixing all three languages. Extraction works on the
//! raw text with regular expressions and never fails: a missing block simply
//! yields an empty fragment.
//!
//! Only the first `<style>` and the first `<script>` block are kept as the
//! css/js fragments, while *every* such block is removed from the residual
//! markup. Any additional blocks are therefore dropped from the output.

use crate::models::ExtractedFragments;
use once_cell::sync::Lazy;
use regex::Regex;

const HTML_FENCE: &str = "```html";
const FENCE: &str = "```";

static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<style>(.*?)</style>").expect("valid style regex"));

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<script>(.*?)</script>").expect("valid script regex"));

/// Remove every markdown fence marker (`` ```html `` first, then bare `` ``` ``).
pub fn strip_fences(raw: &str) -> String {
    raw.replace(HTML_FENCE, "").replace(FENCE, "")
}

/// Extract the fragments from raw generated text.
pub fn extract(raw: &str) -> ExtractedFragments {
    let text = strip_fences(raw);

    let css = first_capture(&STYLE_BLOCK, &text);
    let js = first_capture(&SCRIPT_BLOCK, &text);

    let without_styles = STYLE_BLOCK.replace_all(&text, "");
    let html = SCRIPT_BLOCK.replace_all(&without_styles, "");

    ExtractedFragments {
        html: html.trim().to_string(),
        css,
        js,
    }
}

fn first_capture(pattern: &Regex, text: &str) -> String {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Assemble the fixed page skeleton around the fragments.
pub fn compose(fragments: &ExtractedFragments) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         \x20 <style>\n\
         {css}\n\
         \x20 </style>\n\
         </head>\n\
         <body>\n\
         {html}\n\
         \x20 <script>\n\
         {js}\n\
         \x20 </script>\n\
         </body>\n\
         </html>\n",
        css = fragments.css,
        html = fragments.html,
        js = fragments.js,
    )
}

/// Escape a document so it can be embedded as text. Quotes are escaped too.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Inverse of [`escape_html`].
pub fn unescape_html(s: &str) -> String {
    // `&amp;` goes last so that an escaped entity like `&amp;lt;` stays `&lt;`.
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
