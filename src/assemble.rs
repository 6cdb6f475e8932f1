//! Assembly entry points.
//!
//! [`assemble`] runs the whole pipeline in memory and returns the document
//! plus the stamp to persist; [`assemble_to_file`] additionally writes both.
//! The document is written before the sidecar so that a failed write never
//! leaves a stamp describing a document that is not on disk.

use crate::config::AssemblyConfig;
use crate::error::AssembleError;
use crate::output::{AssemblyOutput, AssemblyStats, DocumentOutline, FigureOutline};
use crate::pipeline::blocks::{self, Block, WalkContext};
use crate::pipeline::citations::CitationTable;
use crate::pipeline::input::{text_content, SourceDocument};
use crate::pipeline::{postprocess, stamp};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Assemble the Quarto document described by `config`.
///
/// Reads the HTML export, the citation table and the data directory, and the
/// previous stamp; writes nothing.
///
/// # Errors
/// - HTML export missing or unreadable
/// - citation table present but malformed
/// - a figure marker without a number
pub fn assemble(config: &AssemblyConfig) -> Result<AssemblyOutput, AssembleError> {
    let total_start = Instant::now();
    config.check_root()?;

    // ── Step 1: Inputs ───────────────────────────────────────────────────
    let html_path = config.resolve(&config.html_path);
    info!("Assembling from {}", html_path.display());
    let source = SourceDocument::open(&html_path)?;
    let citations = CitationTable::load(&config.resolve(&config.citations_path))?;

    // ── Step 2: Walk body blocks ─────────────────────────────────────────
    let elements = source.body_elements()?;
    let ctx = WalkContext {
        citations: &citations,
        figures: &config.profile.figures,
        title_level: config.profile.title_level,
    };
    let walked = blocks::walk(&elements, &ctx)?;
    debug!(
        "{} figures included, {} omitted",
        walked.figures_included, walked.figures_omitted
    );

    // ── Step 3: Normalise ────────────────────────────────────────────────
    let mut buffer = walked.lines;
    postprocess::normalize_lines(&mut buffer);
    let body = buffer.into_lines();

    // ── Step 4: Content stamp ────────────────────────────────────────────
    let digests = stamp::data_file_digests(
        &config.resolve(&config.data_dir),
        &config.data_extension,
    )?;
    let hash = stamp::content_hash(&body, &digests);
    let previous_stamp = stamp::StampRecord::read(&config.resolve(&config.stamp_path))?;
    let date = stamp::resolve_last_updated(previous_stamp.as_ref(), &hash, config.today());

    // ── Step 5: Frame ────────────────────────────────────────────────────
    let document = config.profile.frame(&body, &date);

    let stats = AssemblyStats {
        elements: elements.len(),
        citations_loaded: citations.len(),
        data_files: digests.len(),
        figures_included: walked.figures_included,
        figures_omitted: walked.figures_omitted,
        body_lines: body.len(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!("Content hash: {hash}");
    info!("Last updated: {date}");

    Ok(AssemblyOutput {
        document,
        body,
        stamp: stamp::StampRecord { hash, date },
        previous_stamp,
        stats,
    })
}

/// Assemble and write the document, then the content-hash sidecar.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub fn assemble_to_file(config: &AssemblyConfig) -> Result<AssemblyOutput, AssembleError> {
    let output = assemble(config)?;

    let out_path = config.resolve(&config.output_path);
    write_atomic(&out_path, &output.document)?;
    info!("Wrote: {}", out_path.display());

    output.stamp.write(&config.resolve(&config.stamp_path))?;
    Ok(output)
}

/// Summarise the export's block structure without rendering anything.
pub fn inspect(config: &AssemblyConfig) -> Result<DocumentOutline, AssembleError> {
    config.check_root()?;
    let source = SourceDocument::open(&config.resolve(&config.html_path))?;
    let figures = &config.profile.figures;

    let mut outline = DocumentOutline::default();
    for el in source.body_elements()? {
        let block = Block::classify(&el)?;
        outline.count(&block);
        if let Block::FigureMarker { number } = &block {
            outline.figures.push(FigureOutline {
                number: number.clone(),
                has_include: figures.include(number).is_some(),
                has_short_title: figures.short_title(number).is_some(),
            });
        }
        outline.citation_links += count_citation_links(&el);
    }
    Ok(outline)
}

static RE_NUMERIC_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[?\d+\]?$").unwrap());

fn count_citation_links(el: &ElementRef<'_>) -> usize {
    el.descendants()
        .filter_map(ElementRef::wrap)
        .filter(|d| d.value().name() == "a")
        .filter(|a| !a.value().attr("href").unwrap_or("").starts_with("#cmnt"))
        .filter(|a| RE_NUMERIC_LINK.is_match(text_content(a).trim()))
        .count()
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), AssembleError> {
    let write_err = |e: std::io::Error| AssembleError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/post.qmd");
        write_atomic(&path, "hello\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn write_atomic_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post.qmd");
        std::fs::write(&path, "old").unwrap();
        write_atomic(&path, "new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn citation_links_counted() {
        let doc = SourceDocument::parse(
            "t.html",
            r##"<body><p><a href="x">1</a><a href="y">[2]</a><a href="#cmnt1">[3]</a><a href="z">text</a></p></body>"##,
        );
        let els = doc.body_elements().unwrap();
        assert_eq!(count_citation_links(&els[0]), 2);
    }
}
