//! One sentence per line, so diffs of the generated document stay readable.
//!
//! Inline HTML (citation tooltips, subscripts) is treated as opaque: only the
//! prose between tags is split. A sentence boundary is `.`, `!` or `?`
//! followed by whitespace, unless the text before the punctuation ends in a
//! common abbreviation.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static RE_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.!?])\s+").unwrap());
static RE_ABBREVIATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:e\.g|i\.e|et al|vs|dr|mr|mrs|ms|no|approx|fig|ref)\.$").unwrap()
});

/// Put each sentence of `text` on its own line.
pub fn one_sentence_per_line(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in RE_MARKUP.find_iter(text) {
        out.push_str(&split_sentences(&text[last..m.start()]));
        out.push_str(m.as_str());
        last = m.end();
    }
    out.push_str(&split_sentences(&text[last..]));
    out
}

/// Split one prose span at sentence boundaries.
fn split_sentences(text: &str) -> String {
    if !RE_BOUNDARY.is_match(text) {
        return text.to_string();
    }

    // (sentence body, terminating punctuation) pairs plus the unterminated rest.
    let mut pieces: Vec<(&str, &str)> = Vec::new();
    let mut last = 0;
    for caps in RE_BOUNDARY.captures_iter(text) {
        let (Some(whole), Some(punct)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        pieces.push((&text[last..whole.start()], punct.as_str()));
        last = whole.end();
    }
    let rest = &text[last..];

    let mut lines: Vec<String> = Vec::with_capacity(pieces.len() + 1);
    let mut carry = String::new();
    for (body, punct) in pieces {
        let mut segment = std::mem::take(&mut carry);
        segment.push_str(body);
        segment.push_str(punct);
        if RE_ABBREVIATION.is_match(&segment) {
            carry = segment;
            carry.push(' ');
        } else {
            lines.push(segment);
        }
    }
    carry.push_str(rest);
    lines.push(carry);

    lines.join("\n")
}
