//! Error types for the gdoc2qmd library.
//!
//! Assembly is a build-time step over hand-curated input, so every error here
//! is fatal: the run stops at the first one and nothing is half-written.
//! The two inputs that are allowed to be absent (the citation table and the
//! content-hash sidecar) never produce an [`AssembleError`]; their loaders
//! recover locally and return an empty value instead.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the gdoc2qmd library.
#[derive(Debug, Error)]
pub enum AssembleError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// A required input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but could not be read.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The `.here` marker that identifies the repository root is missing.
    #[error("Cannot find .here marker in '{root}'\nRun from the repository root or pass --root.")]
    MissingRootMarker { root: PathBuf },

    // ── Document errors ───────────────────────────────────────────────────
    /// The HTML export has no `<body>` element.
    #[error("HTML document '{path}' has no <body> element")]
    MissingBody { path: PathBuf },

    /// The citation table exists but is not a valid TSV with a `number` column.
    #[error("Citation table '{path}' is malformed: {detail}")]
    CitationTable { path: PathBuf, detail: String },

    /// A paragraph classified as a figure marker carries no figure number.
    #[error("Figure marker '{text}' has no parsable figure number")]
    MalformedFigureMarker { text: String },

    /// A document profile could not be parsed.
    #[error("Invalid document profile '{path}': {detail}")]
    InvalidProfile { path: PathBuf, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the assembled document.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write the content-hash sidecar.
    #[error("Failed to write content-hash record '{path}': {source}")]
    StampWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AssembleError {
    /// Map an I/O error on `path` to the most specific read error.
    pub(crate) fn from_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => AssembleError::FileNotFound { path },
            std::io::ErrorKind::PermissionDenied => AssembleError::PermissionDenied { path },
            _ => AssembleError::ReadFailed { path, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_display() {
        let e = AssembleError::FileNotFound {
            path: PathBuf::from("data/raw/blog_post_text.html"),
        };
        assert!(e.to_string().contains("blog_post_text.html"), "got: {e}");
    }

    #[test]
    fn malformed_marker_display() {
        let e = AssembleError::MalformedFigureMarker {
            text: "Figure X:".into(),
        };
        assert!(e.to_string().contains("Figure X:"));
    }

    #[test]
    fn from_read_maps_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e = AssembleError::from_read("a.html", io);
        assert!(matches!(e, AssembleError::FileNotFound { .. }));
    }

    #[test]
    fn from_read_maps_permission_denied() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let e = AssembleError::from_read("a.html", io);
        assert!(matches!(e, AssembleError::PermissionDenied { .. }));
    }

    #[test]
    fn from_read_keeps_other_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad utf-8");
        let e = AssembleError::from_read("a.html", io);
        assert!(matches!(e, AssembleError::ReadFailed { .. }));
        assert!(e.to_string().contains("bad utf-8"));
    }
}
