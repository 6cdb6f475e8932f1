//! Result types returned by the assembly entry points.

use crate::pipeline::blocks::Block;
use crate::pipeline::stamp::StampRecord;
use serde::Serialize;

/// Everything one run produced.
#[derive(Debug, Clone, Serialize)]
pub struct AssemblyOutput {
    /// The complete Quarto document, ending in a newline.
    pub document: String,
    /// Normalised body lines, before framing.
    pub body: Vec<String>,
    /// Stamp to persist for the next run.
    pub stamp: StampRecord,
    /// Stamp found from the previous run, if any.
    pub previous_stamp: Option<StampRecord>,
    pub stats: AssemblyStats,
}

impl AssemblyOutput {
    /// Whether the "Last updated" date moved relative to the previous run.
    pub fn date_changed(&self) -> bool {
        self.previous_stamp
            .as_ref()
            .is_none_or(|prev| prev.date != self.stamp.date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssemblyStats {
    /// Body-level elements in the HTML export.
    pub elements: usize,
    pub citations_loaded: usize,
    pub data_files: usize,
    /// Figure markers that had an include registered.
    pub figures_included: usize,
    /// Figure markers dropped for lack of an include.
    pub figures_omitted: usize,
    pub body_lines: usize,
    pub total_duration_ms: u64,
}

/// Block-level overview of an export, for `--inspect-only`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentOutline {
    pub elements: usize,
    pub headings: usize,
    pub paragraphs: usize,
    pub lists: usize,
    pub captions: usize,
    pub comments: usize,
    pub blanks: usize,
    pub other: usize,
    /// Figure numbers in marker order.
    pub figures: Vec<FigureOutline>,
    /// Links whose text is a bare or bracketed number.
    pub citation_links: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FigureOutline {
    pub number: String,
    pub has_include: bool,
    pub has_short_title: bool,
}

impl DocumentOutline {
    pub(crate) fn count(&mut self, block: &Block) {
        self.elements += 1;
        match block {
            Block::Comment => self.comments += 1,
            Block::Blank => self.blanks += 1,
            Block::FigureMarker { .. } => {}
            Block::FigureCaption => self.captions += 1,
            Block::Heading { .. } => self.headings += 1,
            Block::List => self.lists += 1,
            Block::Paragraph => self.paragraphs += 1,
            Block::Other => self.other += 1,
        }
    }
}
