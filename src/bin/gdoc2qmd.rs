//! CLI binary for gdoc2qmd.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `AssemblyConfig` and prints results.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use gdoc2qmd::{assemble, assemble_to_file, inspect, AssemblyConfig, DocumentProfile};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Assemble from the repository root (writes cyp-blog-post.qmd and .content-hash)
  gdoc2qmd

  # Preview on stdout without touching the sidecar
  gdoc2qmd --stdout

  # Different layout and frame
  gdoc2qmd --root ../blog --html export/post.html --profile profile.json -o index.qmd

  # Block outline of the export (nothing written)
  gdoc2qmd --inspect-only --json

INPUTS (relative to --root):
  .here                          repository root marker                  required unless --no-root-marker
  data/raw/blog_post_text.html   Google Docs "Web page (.html)" export   required
  data/citations.tsv             number<TAB>tooltip<TAB>url              optional
  data/*.tsv                     folded into the content hash
  .content-hash                  previous hash + date                    optional

The "Last updated" date only advances when the body text or a data file changes.
"#;

/// Assemble a Quarto blog post from a Google Docs HTML export.
#[derive(Parser, Debug)]
#[command(
    name = "gdoc2qmd",
    version,
    about = "Assemble a Quarto blog post from a Google Docs HTML export",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Repository root; relative paths resolve against it.
    #[arg(long, env = "GDOC2QMD_ROOT", default_value = ".")]
    root: PathBuf,

    /// Skip the check for a `.here` marker file in the root.
    #[arg(long, env = "GDOC2QMD_NO_ROOT_MARKER")]
    no_root_marker: bool,

    /// HTML export of the Google Doc.
    #[arg(long, env = "GDOC2QMD_HTML", default_value = "data/raw/blog_post_text.html")]
    html: PathBuf,

    /// Tab-separated citation table (optional at run time).
    #[arg(long, env = "GDOC2QMD_CITATIONS", default_value = "data/citations.tsv")]
    citations: PathBuf,

    /// Directory whose data files are folded into the content hash.
    #[arg(long, env = "GDOC2QMD_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Extension of the data files to hash.
    #[arg(long, env = "GDOC2QMD_DATA_EXT", default_value = "tsv")]
    data_ext: String,

    /// Content-hash sidecar file.
    #[arg(long, env = "GDOC2QMD_STAMP", default_value = ".content-hash")]
    stamp: PathBuf,

    /// Write the document to this file.
    #[arg(short, long, env = "GDOC2QMD_OUTPUT", default_value = "cyp-blog-post.qmd")]
    output: PathBuf,

    /// JSON document profile replacing the built-in frame and figure tables.
    #[arg(long, env = "GDOC2QMD_PROFILE")]
    profile: Option<PathBuf>,

    /// Use this date (YYYY-MM-DD) instead of today when the content changed.
    #[arg(long, env = "GDOC2QMD_DATE")]
    date: Option<NaiveDate>,

    /// Print the document to stdout; write neither the document nor the sidecar.
    #[arg(long)]
    stdout: bool,

    /// Print the block outline of the export only, no assembly.
    #[arg(long)]
    inspect_only: bool,

    /// Output structured JSON instead of text.
    #[arg(long, env = "GDOC2QMD_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "GDOC2QMD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "GDOC2QMD_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || cli.json {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let outline = inspect(&config).context("Failed to inspect HTML export")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&outline).context("Failed to serialise outline")?
            );
        } else {
            println!("File:         {}", config.resolve(&config.html_path).display());
            println!("Elements:     {}", outline.elements);
            println!("Headings:     {}", outline.headings);
            println!("Paragraphs:   {}", outline.paragraphs);
            println!("Lists:        {}", outline.lists);
            println!("Captions:     {}", outline.captions);
            println!("Comments:     {}", outline.comments);
            println!("Citations:    {}", outline.citation_links);
            for fig in &outline.figures {
                println!(
                    "Figure {:<5} include: {:<3}  short title: {}",
                    fig.number,
                    if fig.has_include { "yes" } else { "no" },
                    if fig.has_short_title { "yes" } else { "no" },
                );
            }
        }
        return Ok(());
    }

    // ── Run assembly ─────────────────────────────────────────────────────
    if cli.stdout {
        let output = assemble(&config).context("Assembly failed")?;
        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(output.document.as_bytes())
                .context("Failed to write to stdout")?;
        }
        return Ok(());
    }

    let output = assemble_to_file(&config).context("Assembly failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        let stats = &output.stats;
        eprintln!(
            "{}  {} lines  {}ms  →  {}",
            green("✔"),
            stats.body_lines,
            stats.total_duration_ms,
            bold(&config.resolve(&config.output_path).display().to_string()),
        );
        eprintln!(
            "   {} figures  /  {} citations  /  {} data files",
            dim(&stats.figures_included.to_string()),
            dim(&stats.citations_loaded.to_string()),
            dim(&stats.data_files.to_string()),
        );
        eprintln!(
            "   hash {}  last updated {}{}",
            cyan(&output.stamp.hash),
            bold(&output.stamp.date),
            if output.date_changed() { "" } else { "  (unchanged)" },
        );
    }

    Ok(())
}

/// Map CLI args to `AssemblyConfig`.
fn build_config(cli: &Cli) -> Result<AssemblyConfig> {
    let profile = match cli.profile {
        Some(ref path) => DocumentProfile::from_json_file(&cli.root.join(path))
            .with_context(|| format!("Failed to load profile from {:?}", path))?,
        None => DocumentProfile::default(),
    };

    let mut builder = AssemblyConfig::builder()
        .root(&cli.root)
        .require_root_marker(!cli.no_root_marker)
        .html_path(&cli.html)
        .citations_path(&cli.citations)
        .data_dir(&cli.data_dir)
        .data_extension(&cli.data_ext)
        .stamp_path(&cli.stamp)
        .output_path(&cli.output)
        .profile(profile);

    if let Some(date) = cli.date {
        builder = builder.today(date);
    }

    builder.build().context("Invalid configuration")
}
