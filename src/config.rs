//! Configuration types for a blog-post assembly run.
//!
//! All assembly behaviour is controlled through [`AssemblyConfig`], built via
//! its [`AssemblyConfigBuilder`]. Paths are stored as given and resolved
//! against [`AssemblyConfig::root`] when the run starts, so the same config
//! works from any working directory.

use crate::error::AssembleError;
use crate::profile::DocumentProfile;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Configuration for one assembly run.
///
/// Built via [`AssemblyConfig::builder()`] or using
/// [`AssemblyConfig::default()`].
///
/// # Example
/// ```rust
/// use gdoc2qmd::AssemblyConfig;
///
/// let config = AssemblyConfig::builder()
///     .root("/srv/blog")
///     .output_path("index.qmd")
///     .build()
///     .unwrap();
/// assert_eq!(config.resolve(&config.output_path), std::path::PathBuf::from("/srv/blog/index.qmd"));
/// ```
#[derive(Debug, Clone)]
pub struct AssemblyConfig {
    /// Repository root. Relative paths below resolve against it. Default: `.`.
    pub root: PathBuf,

    /// Require a `.here` marker file in `root`. Default: true.
    pub require_root_marker: bool,

    /// Google Docs HTML export. Default: `data/raw/blog_post_text.html`.
    pub html_path: PathBuf,

    /// Tab-separated citation table (`number`, `tooltip`, `url`).
    /// Optional at run time. Default: `data/citations.tsv`.
    pub citations_path: PathBuf,

    /// Directory of auxiliary data files folded into the content hash. Default: `data`.
    pub data_dir: PathBuf,

    /// Extension (without the dot) selecting data files in `data_dir`. Default: `tsv`.
    pub data_extension: String,

    /// Two-line content-hash sidecar. Default: `.content-hash`.
    pub stamp_path: PathBuf,

    /// Assembled Quarto document. Default: `cyp-blog-post.qmd`.
    pub output_path: PathBuf,

    /// Editorial frame and figure registry.
    pub profile: DocumentProfile,

    /// Date used when the content hash changes. `None` uses the local date.
    pub today: Option<NaiveDate>,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            require_root_marker: true,
            html_path: PathBuf::from("data/raw/blog_post_text.html"),
            citations_path: PathBuf::from("data/citations.tsv"),
            data_dir: PathBuf::from("data"),
            data_extension: "tsv".to_string(),
            stamp_path: PathBuf::from(".content-hash"),
            output_path: PathBuf::from("cyp-blog-post.qmd"),
            profile: DocumentProfile::default(),
            today: None,
        }
    }
}

impl AssemblyConfig {
    /// Create a new builder for `AssemblyConfig`.
    pub fn builder() -> AssemblyConfigBuilder {
        AssemblyConfigBuilder {
            config: Self::default(),
        }
    }

    /// Resolve `path` against the configured root; absolute paths pass through.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// The date a changed document is stamped with.
    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Check the root marker when required.
    pub(crate) fn check_root(&self) -> Result<(), AssembleError> {
        if self.require_root_marker && !self.root.join(".here").exists() {
            return Err(AssembleError::MissingRootMarker {
                root: self.root.clone(),
            });
        }
        Ok(())
    }
}

/// Builder for [`AssemblyConfig`].
#[derive(Debug)]
pub struct AssemblyConfigBuilder {
    config: AssemblyConfig,
}

impl AssemblyConfigBuilder {
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    pub fn require_root_marker(mut self, v: bool) -> Self {
        self.config.require_root_marker = v;
        self
    }

    pub fn html_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.html_path = path.into();
        self
    }

    pub fn citations_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.citations_path = path.into();
        self
    }

    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    pub fn data_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.data_extension = ext.into().trim_start_matches('.').to_string();
        self
    }

    pub fn stamp_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.stamp_path = path.into();
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    pub fn profile(mut self, profile: DocumentProfile) -> Self {
        self.config.profile = profile;
        self
    }

    pub fn today(mut self, date: NaiveDate) -> Self {
        self.config.today = Some(date);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AssemblyConfig, AssembleError> {
        let c = &self.config;
        if c.data_extension.is_empty() {
            return Err(AssembleError::InvalidConfig(
                "Data file extension must not be empty".into(),
            ));
        }
        if c.output_path == c.stamp_path {
            return Err(AssembleError::InvalidConfig(format!(
                "Output and content-hash paths must differ, both are {:?}",
                c.output_path
            )));
        }
        c.profile.validate().map_err(AssembleError::InvalidConfig)?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_repository_layout() {
        let c = AssemblyConfig::default();
        assert_eq!(c.html_path, PathBuf::from("data/raw/blog_post_text.html"));
        assert_eq!(c.citations_path, PathBuf::from("data/citations.tsv"));
        assert_eq!(c.stamp_path, PathBuf::from(".content-hash"));
        assert_eq!(c.data_extension, "tsv");
    }

    #[test]
    fn resolve_joins_relative_paths() {
        let c = AssemblyConfig::builder().root("/repo").build().unwrap();
        assert_eq!(c.resolve(Path::new("data")), PathBuf::from("/repo/data"));
        assert_eq!(c.resolve(Path::new("/abs/x")), PathBuf::from("/abs/x"));
    }

    #[test]
    fn extension_dot_is_stripped() {
        let c = AssemblyConfig::builder().data_extension(".csv").build().unwrap();
        assert_eq!(c.data_extension, "csv");
    }

    #[test]
    fn empty_extension_rejected() {
        let err = AssemblyConfig::builder().data_extension("").build().unwrap_err();
        assert!(matches!(err, AssembleError::InvalidConfig(_)));
    }

    #[test]
    fn same_output_and_stamp_rejected() {
        let err = AssemblyConfig::builder()
            .output_path("x")
            .stamp_path("x")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn fixed_today_is_used() {
        let d = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let c = AssemblyConfig::builder().today(d).build().unwrap();
        assert_eq!(c.today(), d);
    }

    #[test]
    fn missing_root_marker_detected() {
        let dir = tempfile::tempdir().unwrap();
        let c = AssemblyConfig::builder().root(dir.path()).build().unwrap();
        assert!(c.require_root_marker);
        assert!(matches!(c.check_root(), Err(AssembleError::MissingRootMarker { .. })));
        std::fs::write(dir.path().join(".here"), "").unwrap();
        assert!(c.check_root().is_ok());
    }

    #[test]
    fn root_marker_check_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let c = AssemblyConfig::builder()
            .root(dir.path())
            .require_root_marker(false)
            .build()
            .unwrap();
        assert!(c.check_root().is_ok());
    }
}
