//! Inline rendering: one paragraph, list item, or caption → one Markdown string.
//!
//! Google Docs exports every run of text as a `<span>` carrying its styling in
//! a `style` attribute, with links as `<a>` children. Rendering walks the
//! child nodes in order; text nodes (the element's leading text and each
//! child's tail) are copied verbatim, and element children are rendered by
//! tag:
//!
//! | Child | Output |
//! |-------|--------|
//! | `<a href="#cmnt…">` | nothing (comment anchor) |
//! | `<a>` with text `12` or `[12]` | citation: tooltip `<a>` or plain link |
//! | other `<a>` | `[text](href)`, redirect URLs unwrapped |
//! | `<span style=…>` | children rendered recursively, then bold/italic |
//! | anything else | its text content |

use crate::pipeline::citations::CitationTable;
use crate::pipeline::input::text_content;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::node::Node;
use scraper::ElementRef;

const REDIRECT_PREFIX: &str = "https://www.google.com/url?";
const COMMENT_ANCHOR_PREFIX: &str = "#cmnt";

static RE_REDIRECT_Q: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&]q=([^&]+)").unwrap());
static RE_CITATION_TEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[?\d+\]?$").unwrap());
static RE_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"font-weight:\s*700").unwrap());
static RE_ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"font-style:\s*italic").unwrap());

/// Emphasis derived from an element's inline CSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InlineStyle {
    pub bold: bool,
    pub italic: bool,
}

impl InlineStyle {
    pub fn from_css(style: &str) -> Self {
        Self {
            bold: RE_BOLD.is_match(style),
            italic: RE_ITALIC.is_match(style),
        }
    }

    pub fn is_plain(&self) -> bool {
        !self.bold && !self.italic
    }

    fn marker(&self) -> &'static str {
        match (self.bold, self.italic) {
            (true, true) => "***",
            (true, false) => "**",
            (false, true) => "*",
            (false, false) => "",
        }
    }
}

/// Render a paragraph-like element to a trimmed Markdown string.
pub fn render_inline(el: &ElementRef<'_>, citations: &CitationTable) -> String {
    let mut out = String::new();
    render_children(el, citations, &mut out);
    out.trim().to_string()
}

/// Render a `<li>` as a Markdown bullet line.
pub fn render_list_item(li: &ElementRef<'_>, citations: &CitationTable) -> String {
    format!("- {}", render_inline(li, citations))
}

fn render_children(el: &ElementRef<'_>, citations: &CitationTable, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    render_element(&child_el, citations, out);
                }
            }
            _ => {}
        }
    }
}

fn render_element(el: &ElementRef<'_>, citations: &CitationTable, out: &mut String) {
    match el.value().name() {
        "a" => render_link(el, citations, out),
        "span" => {
            let mut inner = String::new();
            render_children(el, citations, &mut inner);
            let style = InlineStyle::from_css(el.value().attr("style").unwrap_or(""));
            out.push_str(&wrap_emphasis(&inner, style));
        }
        _ => out.push_str(&text_content(el)),
    }
}

fn render_link(el: &ElementRef<'_>, citations: &CitationTable, out: &mut String) {
    let href = unwrap_redirect(el.value().attr("href").unwrap_or(""));
    if href.starts_with(COMMENT_ANCHOR_PREFIX) {
        return;
    }
    let text = text_content(el);
    if RE_CITATION_TEXT.is_match(text.trim()) {
        out.push_str(&format_citation_link(&text, &href, citations));
    } else {
        out.push_str(&format!("[{text}]({href})"));
    }
}

/// Unwrap a Google redirect URL to its destination.
///
/// `https://www.google.com/url?q=<encoded>&sa=D…` becomes the percent-decoded
/// `q` value. Anything else, including redirects without `q`, is returned as is.
pub fn unwrap_redirect(url: &str) -> String {
    if url.starts_with(REDIRECT_PREFIX) {
        if let Some(caps) = RE_REDIRECT_Q.captures(url) {
            return percent_encoding::percent_decode_str(&caps[1])
                .decode_utf8_lossy()
                .into_owned();
        }
    }
    url.to_string()
}

/// Format a numbered citation link, with a hover tooltip when one is known.
pub fn format_citation_link(text: &str, href: &str, citations: &CitationTable) -> String {
    let display = text.trim();
    let number = display.trim_matches(|c| c == '[' || c == ']');
    match citations.tooltip(number) {
        Some(tooltip) => format!(
            r#"<a href="{href}" class="cite-tip" data-tooltip="{}">{display}</a>"#,
            tooltip.replace('"', "&quot;")
        ),
        None => format!("[{display}]({href})"),
    }
}

/// Wrap `inner` in emphasis markers, keeping surrounding whitespace outside.
///
/// Markdown emphasis does not render when a marker touches whitespace, and
/// Docs routinely puts the space between words inside the styled span.
/// A span that is only whitespace yields just that whitespace.
pub fn wrap_emphasis(inner: &str, style: InlineStyle) -> String {
    if style.is_plain() {
        return inner.to_string();
    }

    let core = inner.trim_start();
    let leading = &inner[..inner.len() - core.len()];
    let word = core.trim_end();
    let trailing = &core[word.len()..];

    if word.is_empty() {
        return format!("{leading}{trailing}");
    }

    let m = style.marker();
    format!("{leading}{m}{word}{m}{trailing}")
}
