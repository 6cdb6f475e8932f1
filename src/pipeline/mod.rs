//! Pipeline stages for HTML-export-to-Quarto assembly.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on a string or a small HTML fragment without touching the disk.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ blocks ──▶ postprocess ──▶ stamp
//! (HTML)    (walk)     (cleanup)       (hash/date)
//!             │
//!             ├─ inline      (per-element Markdown)
//!             │    └─ citations (tooltips)
//!             └─ sentences   (one sentence per line)
//! ```
//!
//! 1. [`input`]: read and parse the export, list body elements
//! 2. [`citations`]: optional TSV of citation tooltips
//! 3. [`inline`]: spans, links and citations inside one element
//! 4. [`sentences`]: split prose at sentence ends, leaving markup intact
//! 5. [`blocks`]: classify each body element and emit lines
//! 6. [`postprocess`]: fixed regex cleanup and blank-line collapsing
//! 7. [`stamp`]: content hash and "Last updated" date

pub mod blocks;
pub mod citations;
pub mod inline;
pub mod input;
pub mod postprocess;
pub mod sentences;
pub mod stamp;
