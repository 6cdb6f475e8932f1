//! # gdoc2qmd
//!
//! Assemble a Quarto (`.qmd`) blog post from a Google Docs HTML export.
//!
//! ## Pipeline Overview
//!
//! ```text
//! HTML export
//!  │
//!  ├─ 1. Input      parse the export, list <body> elements
//!  ├─ 2. Citations  optional TSV: number → tooltip, URL
//!  ├─ 3. Walk       classify each element, render spans/links, split sentences
//!  ├─ 4. Polish     7-rule line cleanup + blank-line collapsing
//!  ├─ 5. Stamp      content hash over body + data files → "Last updated" date
//!  └─ 6. Output     framed .qmd document + two-line .content-hash sidecar
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gdoc2qmd::{assemble_to_file, AssemblyConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AssemblyConfig::builder().root(".").build()?;
//!     let output = assemble_to_file(&config)?;
//!     eprintln!("hash {} / {}", output.stamp.hash, output.stamp.date);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `gdoc2qmd` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assemble;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod profile;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use assemble::{assemble, assemble_to_file, inspect};
pub use config::{AssemblyConfig, AssemblyConfigBuilder};
pub use error::AssembleError;
pub use output::{AssemblyOutput, AssemblyStats, DocumentOutline, FigureOutline};
pub use pipeline::stamp::StampRecord;
pub use profile::{DocumentProfile, FigureRegistry};
