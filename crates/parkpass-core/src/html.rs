//! Plain-text extraction from the site's HTML replies.
//!
//! This is regex tag stripping, not HTML parsing. Malformed markup (an
//! unclosed `<` or a `>` inside an attribute) can leak attribute text into the
//! output.

use std::sync::OnceLock;

use regex::Regex;

/// Upper bound on the extracted text, sized for a single chat message.
pub const MAX_TEXT_CHARS: usize = 2000;
pub const ELLIPSIS: &str = "...";

static SCRIPT_RE: OnceLock<Regex> = OnceLock::new();
static STYLE_RE: OnceLock<Regex> = OnceLock::new();
static TAG_RE: OnceLock<Regex> = OnceLock::new();
static SPACE_RE: OnceLock<Regex> = OnceLock::new();

fn script_re() -> &'static Regex {
    SCRIPT_RE.get_or_init(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap())
}

fn style_re() -> &'static Regex {
    STYLE_RE.get_or_init(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap())
}

fn tag_re() -> &'static Regex {
    TAG_RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

fn space_re() -> &'static Regex {
    SPACE_RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Drop `<script>`/`<style>` blocks, replace every other tag with a space and
/// collapse whitespace.
pub fn extract_text(html: &str) -> String {
    let html = script_re().replace_all(html, "");
    let html = style_re().replace_all(&html, "");
    let text = tag_re().replace_all(&html, " ");
    space_re().replace_all(&text, " ").trim().to_string()
}

/// Cut `text` to at most `max` characters, appending [`ELLIPSIS`] when
/// anything was removed.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}
