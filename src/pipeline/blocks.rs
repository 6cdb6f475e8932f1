//! Block walker: body-level elements → Markdown lines.
//!
//! Each body element is classified once into a [`Block`] and then emitted by a
//! single forward pass. The only lookahead is for figure markers, which peek
//! past blank paragraphs at the caption that follows to borrow its title.
//!
//! Output goes into a [`LineBuffer`] owned by the caller; the normaliser in
//! [`crate::pipeline::postprocess`] rewrites the same buffer afterwards.

use crate::error::AssembleError;
use crate::pipeline::citations::CitationTable;
use crate::pipeline::inline::{render_inline, render_list_item};
use crate::pipeline::input::text_content;
use crate::pipeline::sentences::one_sentence_per_line;
use crate::profile::FigureRegistry;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;
use tracing::{debug, warn};

static RE_FIGURE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(Draft )?Figure \d+:?\s*$").unwrap());
static RE_FIGURE_CAPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*Figure \d+:").unwrap());
static RE_CAPTION_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(Figure \d+:)").unwrap());
static RE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Ordered, growable sequence of emitted Markdown lines.
///
/// An entry may itself contain newlines (sentence-split paragraphs); it is
/// still one entry for the normaliser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<String>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut Vec<String> {
        &mut self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl From<Vec<String>> for LineBuffer {
    fn from(lines: Vec<String>) -> Self {
        Self { lines }
    }
}

/// What a body-level element is, in classification priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Docs comment container (`<div>`), always skipped.
    Comment,
    /// Paragraph with no visible text.
    Blank,
    /// `Figure N:` on its own: where figure N is placed.
    FigureMarker { number: String },
    /// Paragraph starting with `Figure N:`: the figure's caption text.
    FigureCaption,
    Heading { level: u8 },
    List,
    Paragraph,
    Other,
}

impl Block {
    /// Classify an element. Fails only for a figure marker without digits.
    pub fn classify(el: &ElementRef<'_>) -> Result<Self, AssembleError> {
        let tag = el.value().name();
        let text = text_content(el);
        let text = text.trim();

        let block = match tag {
            "div" => Block::Comment,
            "p" if text.is_empty() => Block::Blank,
            "p" if RE_FIGURE_MARKER.is_match(text) => {
                let number = RE_DIGITS
                    .find(text)
                    .map(|m| m.as_str().to_string())
                    .ok_or_else(|| AssembleError::MalformedFigureMarker {
                        text: text.to_string(),
                    })?;
                Block::FigureMarker { number }
            }
            "p" if RE_FIGURE_CAPTION.is_match(text) => Block::FigureCaption,
            "p" => Block::Paragraph,
            "ul" => Block::List,
            _ => match heading_level(tag) {
                Some(level) => Block::Heading { level },
                None => Block::Other,
            },
        };
        Ok(block)
    }

    /// Whether the underlying element is a `<p>` (preamble skipping keys on this).
    fn is_paragraph_tag(&self) -> bool {
        matches!(
            self,
            Block::Blank | Block::FigureMarker { .. } | Block::FigureCaption | Block::Paragraph
        )
    }
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag.as_bytes() {
        [b'h', d @ b'1'..=b'6'] => Some(d - b'0'),
        _ => None,
    }
}

/// Inputs shared by every block of one walk.
pub struct WalkContext<'a> {
    pub citations: &'a CitationTable,
    pub figures: &'a FigureRegistry,
    /// Heading level of the document title that ends the preamble.
    pub title_level: u8,
}

/// What one walk produced.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub lines: LineBuffer,
    pub figures_included: usize,
    pub figures_omitted: usize,
}

/// Walk the body elements and emit Markdown lines.
pub fn walk(elements: &[ElementRef<'_>], ctx: &WalkContext<'_>) -> Result<WalkOutcome, AssembleError> {
    let blocks = elements
        .iter()
        .map(Block::classify)
        .collect::<Result<Vec<_>, _>>()?;

    let mut outcome = WalkOutcome::default();
    let out = &mut outcome.lines;
    let mut in_preamble = true;
    let mut title_seen = false;

    for (i, (el, block)) in elements.iter().zip(&blocks).enumerate() {
        if *block == Block::Comment {
            continue;
        }

        if in_preamble {
            if !title_seen && block.is_paragraph_tag() {
                continue;
            }
            if !title_seen && *block == (Block::Heading { level: ctx.title_level }) {
                title_seen = true;
                continue;
            }
            if title_seen {
                in_preamble = false;
            }
        }

        match block {
            Block::Comment | Block::Blank | Block::Other => {}
            Block::FigureMarker { number } => {
                if emit_figure_marker(number, &elements[i + 1..], &blocks[i + 1..], ctx, out) {
                    outcome.figures_included += 1;
                } else {
                    outcome.figures_omitted += 1;
                }
            }
            Block::FigureCaption => emit_caption(el, ctx, out),
            Block::Heading { level } => {
                out.blank();
                out.push(format!(
                    "{} {}",
                    "#".repeat(*level as usize),
                    text_content(el).trim()
                ));
                out.blank();
            }
            Block::List => {
                out.blank();
                for li in el
                    .descendants()
                    .filter_map(ElementRef::wrap)
                    .filter(|d| d.value().name() == "li")
                {
                    out.push(render_list_item(&li, ctx.citations));
                }
                out.blank();
            }
            Block::Paragraph => {
                let mut md = render_inline(el, ctx.citations);
                if md.starts_with("Note:") {
                    md = format!("*{md}*");
                }
                out.push(one_sentence_per_line(&md));
                out.blank();
            }
        }
    }

    debug!(
        "Walked {} elements into {} lines",
        elements.len(),
        outcome.lines.len()
    );
    Ok(outcome)
}

fn emit_figure_marker(
    number: &str,
    following: &[ElementRef<'_>],
    following_blocks: &[Block],
    ctx: &WalkContext<'_>,
    out: &mut LineBuffer,
) -> bool {
    let caption = following
        .iter()
        .zip(following_blocks)
        .find(|(_, b)| **b != Block::Blank)
        .map(|(el, _)| text_content(el));

    let caption_title = match caption {
        Some(ref text) => caption_title(text.trim(), number),
        None => {
            warn!("Figure {number} marker is the last element; no caption to read");
            None
        }
    };

    let label = match (ctx.figures.short_title(number), caption_title) {
        (Some(short), _) => format!("Figure {number}: {short}"),
        (None, Some(title)) => format!("Figure {number}: {title}"),
        (None, None) => format!("Figure {number}"),
    };

    match ctx.figures.include(number) {
        Some(include) => {
            out.blank();
            out.push(format!("#### {label} {{.figure-toc}}"));
            out.blank();
            out.push(include);
            out.blank();
            true
        }
        None => {
            debug!("No include registered for '{label}'; figure omitted");
            false
        }
    }
}

/// `Figure N: <title>.` → `<title>`, the text up to the first period.
fn caption_title(text: &str, number: &str) -> Option<String> {
    let re = Regex::new(&format!(r"Figure\s+{}:\s*(.+?)\.", regex::escape(number))).ok()?;
    re.captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|t| !t.is_empty())
}

fn emit_caption(el: &ElementRef<'_>, ctx: &WalkContext<'_>, out: &mut LineBuffer) {
    let mut md = render_inline(el, ctx.citations);
    if !md.starts_with("**Figure") {
        md = RE_CAPTION_PREFIX.replace(&md, "**${1}**").into_owned();
    }
    out.push(":::{.figure-caption}");
    out.push(one_sentence_per_line(&md));
    out.push(":::");
    out.blank();
}
