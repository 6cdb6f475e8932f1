//! Input resolution: read the HTML export and expose its body-level elements.
//!
//! The export is parsed once with `scraper` (html5ever underneath), which
//! always synthesises `<html>`/`<body>` for well-formed exports. A document
//! without a body therefore means the input is not an HTML export at all and
//! the run aborts.

use crate::error::AssembleError;
use scraper::{ElementRef, Html};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A parsed HTML export.
pub struct SourceDocument {
    path: PathBuf,
    html: Html,
}

impl SourceDocument {
    /// Read and parse the HTML file at `path`.
    pub fn open(path: &Path) -> Result<Self, AssembleError> {
        let raw = std::fs::read_to_string(path).map_err(|e| AssembleError::from_read(path, e))?;
        debug!("Read {} bytes of HTML from {}", raw.len(), path.display());
        Ok(Self::parse(path, &raw))
    }

    /// Parse HTML that is already in memory. `path` is kept for error messages.
    pub fn parse(path: impl Into<PathBuf>, raw: &str) -> Self {
        Self {
            path: path.into(),
            html: Html::parse_document(raw),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The element children of `<body>`, in document order.
    pub fn body_elements(&self) -> Result<Vec<ElementRef<'_>>, AssembleError> {
        let body = self
            .html
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "body")
            .ok_or_else(|| AssembleError::MissingBody {
                path: self.path.clone(),
            })?;

        Ok(body.children().filter_map(ElementRef::wrap).collect())
    }
}

/// Full text content of an element, like the DOM's `textContent`.
pub fn text_content(el: &ElementRef<'_>) -> String {
    el.text().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_elements_in_order() {
        let doc = SourceDocument::parse(
            "t.html",
            "<html><body><p>a</p>text<h2>b</h2><ul><li>c</li></ul></body></html>",
        );
        let names: Vec<&str> = doc
            .body_elements()
            .unwrap()
            .iter()
            .map(|e| e.value().name())
            .collect();
        assert_eq!(names, vec!["p", "h2", "ul"]);
    }

    #[test]
    fn fragment_gets_a_body() {
        let doc = SourceDocument::parse("t.html", "<p>only</p>");
        let els = doc.body_elements().unwrap();
        assert_eq!(els.len(), 1);
        assert_eq!(text_content(&els[0]), "only");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceDocument::open(&dir.path().join("nope.html"))
            .err()
            .unwrap();
        assert!(matches!(err, AssembleError::FileNotFound { .. }));
    }

    #[test]
    fn text_content_flattens_children() {
        let doc = SourceDocument::parse(
            "t.html",
            "<body><p>One <span>two <a href='#'>three</a></span> four</p></body>",
        );
        let els = doc.body_elements().unwrap();
        assert_eq!(text_content(&els[0]), "One two three four");
    }
}
