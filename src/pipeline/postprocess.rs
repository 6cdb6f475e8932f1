//! Post-processing: deterministic cleanup of the emitted Markdown lines.
//!
//! ## Why is post-processing necessary?
//!
//! The Docs export splits styled text at arbitrary points, so rendering span
//! by span leaves artefacts that are correct HTML but broken Markdown:
//!
//! - Comment markers like `[a]` left behind by resolved comments
//! - `**X****Y**` where two bold spans touch
//! - `text **` where a bold span ended in a space
//! - `word ,` where a span boundary fell before punctuation
//!
//! This module applies seven line-level regex rules, then collapses blank
//! lines across the whole buffer. Each rule is a pure `&str → String`
//! function and is tested on its own.
//!
//! ## Rule Order
//!
//! The comma repair (rule 2) must see `**,**` before rule 3 collapses long
//! marker runs, and whitespace before closing markers (rule 4) must be gone
//! before empty pairs (rule 5) are detected.

use crate::pipeline::blocks::LineBuffer;
use once_cell::sync::Lazy;
use regex::Regex;

/// Apply every rule to every line, then collapse and trim blank lines.
///
/// Rules (applied in order, per line):
/// 1. Strip `[a]`-style comment markers
/// 2. Split bold runs glued across `,`/`;` (`**X**,** Y**` → `**X**, **Y**`)
/// 3. Collapse four or more `*` to `**`
/// 4. Drop whitespace before a closing marker (`text **` → `text**`)
/// 5. Replace empty marker pairs (`** **`) with a space
/// 6. Drop whitespace before `,` and `;`
/// 7. Subscript IC50, EC50, log10, log2
pub fn normalize_lines(buffer: &mut LineBuffer) {
    for line in buffer.lines_mut().iter_mut() {
        *line = normalize_line(line);
    }
    let lines = std::mem::take(buffer.lines_mut());
    *buffer.lines_mut() = collapse_blank_lines(lines);
}

/// The seven per-line rules, in order.
pub fn normalize_line(line: &str) -> String {
    let s = strip_comment_markers(line);
    let s = split_glued_bold(&s);
    let s = collapse_marker_runs(&s);
    let s = tighten_closing_markers(&s);
    let s = remove_empty_pairs(&s);
    let s = remove_space_before_punctuation(&s);
    apply_subscripts(&s)
}

// ── Rule 1: Comment markers ──────────────────────────────────────────────────

static RE_COMMENT_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[a-z]\]").unwrap());

fn strip_comment_markers(input: &str) -> String {
    RE_COMMENT_MARKER.replace_all(input, "").into_owned()
}

// ── Rule 2: Bold glued across punctuation ────────────────────────────────────

static RE_GLUED_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([,;])\s*\*\*").unwrap());

fn split_glued_bold(input: &str) -> String {
    RE_GLUED_BOLD.replace_all(input, "**${1} **").into_owned()
}

// ── Rule 3: Long marker runs ─────────────────────────────────────────────────

static RE_MARKER_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*{4,}").unwrap());

fn collapse_marker_runs(input: &str) -> String {
    RE_MARKER_RUN.replace_all(input, "**").into_owned()
}

// ── Rule 4: Whitespace before closing markers ────────────────────────────────
//
// Needs a look-ahead so the whitespace after the marker is left for the next
// match; the `regex` crate has none, so this one rule uses fancy-regex.

static RE_SPACE_BEFORE_CLOSE: Lazy<fancy_regex::Regex> =
    Lazy::new(|| fancy_regex::Regex::new(r"\s+(\*{1,3})(?=\s|$)").unwrap());

fn tighten_closing_markers(input: &str) -> String {
    RE_SPACE_BEFORE_CLOSE.replace_all(input, "$1").into_owned()
}

// ── Rule 5: Empty marker pairs ───────────────────────────────────────────────

static RE_EMPTY_PAIR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*{2,3}\s+\*{2,3}").unwrap());

fn remove_empty_pairs(input: &str) -> String {
    RE_EMPTY_PAIR.replace_all(input, " ").into_owned()
}

// ── Rule 6: Whitespace before punctuation ────────────────────────────────────

static RE_SPACE_BEFORE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\u{a0}]+([,;])").unwrap());

fn remove_space_before_punctuation(input: &str) -> String {
    RE_SPACE_BEFORE_PUNCT.replace_all(input, "${1}").into_owned()
}

// ── Rule 7: Scientific subscripts ────────────────────────────────────────────

static RE_IC50: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(p?IC)(50)\b").unwrap());
static RE_EC50: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(EC)(50)\b").unwrap());
static RE_LOG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([Ll]og)(10|2)\b").unwrap());

fn apply_subscripts(input: &str) -> String {
    let s = RE_IC50.replace_all(input, "${1}<sub>${2}</sub>");
    let s = RE_EC50.replace_all(&s, "${1}<sub>${2}</sub>");
    RE_LOG.replace_all(&s, "${1}<sub>${2}</sub>").into_owned()
}

// ── Buffer-wide: blank lines ─────────────────────────────────────────────────

/// Collapse runs of empty lines to one and drop leading/trailing empties.
fn collapse_blank_lines(lines: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        let is_blank = line.is_empty();
        if is_blank && result.last().is_none_or(|prev| prev.is_empty()) {
            continue;
        }
        result.push(line);
    }
    while result.last().is_some_and(|l| l.is_empty()) {
        result.pop();
    }
    result
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_strip_comment_markers() {
        assert_eq!(strip_comment_markers("Text[a] and[b]."), "Text and.");
        assert_eq!(strip_comment_markers("Ref [12] [A]"), "Ref [12] [A]");
    }

    #[test]
    fn test_split_glued_bold() {
        assert_eq!(split_glued_bold("**X**,** Y**"), "**X**, ** Y**");
        assert_eq!(split_glued_bold("**X**;**Y**"), "**X**; **Y**");
    }

    #[test]
    fn test_collapse_marker_runs() {
        assert_eq!(collapse_marker_runs("**A****B**"), "**A**B**");
        assert_eq!(collapse_marker_runs("******"), "**");
        assert_eq!(collapse_marker_runs("***x***"), "***x***");
    }

    #[test]
    fn test_tighten_closing_markers() {
        assert_eq!(tighten_closing_markers("text ** more"), "text** more");
        assert_eq!(tighten_closing_markers("end *"), "end*");
        assert_eq!(tighten_closing_markers("a **b**"), "a **b**");
    }

    #[test]
    fn test_remove_empty_pairs() {
        assert_eq!(remove_empty_pairs("a** **b"), "a b");
        assert_eq!(remove_empty_pairs("**bold**"), "**bold**");
    }

    #[test]
    fn test_space_before_punctuation() {
        assert_eq!(remove_space_before_punctuation("a ,b\u{a0};c"), "a,b;c");
    }

    #[test]
    fn test_subscripts() {
        assert_eq!(apply_subscripts("pIC50 and IC50"), "pIC<sub>50</sub> and IC<sub>50</sub>");
        assert_eq!(apply_subscripts("EC50"), "EC<sub>50</sub>");
        assert_eq!(
            apply_subscripts("Log10 log2 log20"),
            "Log<sub>10</sub> log<sub>2</sub> log20"
        );
        assert_eq!(apply_subscripts("XIC50 IC500"), "XIC50 IC500");
    }

    #[test]
    fn test_nested_span_output() {
        // Bold inside bold collapses; bold inside italic is already valid.
        assert_eq!(normalize_line("Say ****x**** now"), "Say **x** now");
        assert_eq!(normalize_line("***x** y*"), "***x** y*");
    }

    #[test]
    fn test_five_blank_lines_collapse_to_one() {
        let lines = owned(&["a", "", "", "", "", "", "b"]);
        assert_eq!(collapse_blank_lines(lines), owned(&["a", "", "b"]));
    }

    #[test]
    fn test_leading_trailing_blanks_trimmed() {
        let lines = owned(&["", "", "a", "", ""]);
        assert_eq!(collapse_blank_lines(lines), owned(&["a"]));
        assert!(collapse_blank_lines(owned(&["", ""])).is_empty());
    }

    #[test]
    fn test_normalize_lines_full_pipeline() {
        let mut buf = LineBuffer::from(owned(&[
            "",
            "Potency **high ** ,[a] pIC50 of 7.",
            "",
            "",
            "- item",
            "",
        ]));
        normalize_lines(&mut buf);
        assert_eq!(
            buf.into_lines(),
            owned(&["Potency **high**, pIC<sub>50</sub> of 7.", "", "- item"])
        );
    }
}
