//! Document profile: the fixed text that frames the converted body.
//!
//! Everything that is editorial rather than derived from the HTML export lives
//! here: the YAML header, the setup includes, the author block, the banner,
//! the version footer, and the figure registry. The defaults reproduce the
//! published post; a JSON file with the same shape can replace them via
//! [`DocumentProfile::from_json_file`].

use crate::error::AssembleError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// YAML front-matter for the published post.
pub const DEFAULT_YAML_HEADER: &str = r#"---
title: "Building the OpenADMET Data Engine"
date: "March 2, 2026"
format:
  html:
    output-file: index.html
---"#;

/// Author line with ORCID badges, as a Quarto fenced div.
pub const DEFAULT_AUTHOR_BLOCK: &str = concat!(
    ":::{.doc-authors}\n",
    "Robert Warneford-Thomson [{{< ai orcid color=#a6ce39 >}}](https://orcid.org/0000-0002-4521-0568), ",
    "Steven Edgar, ",
    "Hugo MacDermott-Opeskin [{{< ai orcid color=#a6ce39 >}}](https://orcid.org/0000-0002-7393-7457), ",
    "Naomi Handly [{{< ai orcid color=#a6ce39 >}}](https://orcid.org/0009-0007-1480-6741), ",
    "Pat Walters [{{< ai orcid color=#a6ce39 >}}](https://orcid.org/0000-0003-2860-7958), ",
    "Sri Kosuri [{{< ai orcid color=#a6ce39 >}}](https://orcid.org/0000-0002-4661-0600)",
    "\n:::"
);

pub const DEFAULT_BANNER_INCLUDE: &str = "{{< include post/figures/banner_drc_animation.qmd >}}";

pub const DEFAULT_BUILT_WITH: &str = "Built with ❤️ and [Quarto](https://quarto.org)";

/// Figure number → short title (ToC sidebar) and → include directive.
///
/// Keys are figure numbers exactly as they appear in the document ("2", not 2).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FigureRegistry {
    #[serde(default)]
    pub short_titles: BTreeMap<String, String>,
    #[serde(default)]
    pub includes: BTreeMap<String, String>,
}

impl FigureRegistry {
    pub fn short_title(&self, number: &str) -> Option<&str> {
        self.short_titles
            .get(number)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn include(&self, number: &str) -> Option<&str> {
        self.includes
            .get(number)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// The registry used by the published post.
    pub fn published() -> Self {
        let short_titles = [
            ("1", "CYP screening overview"),
            ("2", "CYP3A4 vs CYP2J2 reactivity"),
            ("3", "CYP3A4 inhibition vs reactivity"),
            ("4", "CYP assay development"),
            ("5", "Built-in quality checks"),
            ("6", "Expanding chemical coverage"),
            ("7", "Clearance & TDI assays"),
        ];
        let includes = [
            ("1", "{{< include post/figures/figure_1.qmd >}}"),
            ("2", "{{< include post/figures/figure_2.qmd >}}"),
            ("3", "{{< include post/figures/figure_3.qmd >}}"),
            ("4", "{{< include post/figures/figure_4.qmd >}}"),
            ("5", "![](post/Figure_5.png)"),
            ("6", "{{< include post/figures/figure_6.qmd >}}"),
            ("7", "{{< include post/figures/figure_7.qmd >}}"),
        ];
        Self {
            short_titles: short_titles
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            includes: includes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// The editorial frame around the converted body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentProfile {
    pub yaml_header: String,
    pub setup_includes: Vec<String>,
    pub author_block: String,
    pub banner_include: String,
    pub built_with: String,
    /// Heading level of the document title that ends the preamble. Default: 2.
    pub title_level: u8,
    pub figures: FigureRegistry,
}

impl Default for DocumentProfile {
    fn default() -> Self {
        Self {
            yaml_header: DEFAULT_YAML_HEADER.to_string(),
            setup_includes: vec![
                "{{< include post/_setup_r.qmd >}}".to_string(),
                String::new(),
                "{{< include post/_setup_python.qmd >}}".to_string(),
            ],
            author_block: DEFAULT_AUTHOR_BLOCK.to_string(),
            banner_include: DEFAULT_BANNER_INCLUDE.to_string(),
            built_with: DEFAULT_BUILT_WITH.to_string(),
            title_level: 2,
            figures: FigureRegistry::published(),
        }
    }
}

impl DocumentProfile {
    /// Load a profile from JSON. Missing fields take their default values.
    pub fn from_json_file(path: &Path) -> Result<Self, AssembleError> {
        let raw = std::fs::read_to_string(path).map_err(|e| AssembleError::from_read(path, e))?;
        let profile: Self =
            serde_json::from_str(&raw).map_err(|e| AssembleError::InvalidProfile {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
        profile.validate().map_err(|detail| AssembleError::InvalidProfile {
            path: path.to_path_buf(),
            detail,
        })?;
        Ok(profile)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if !(1..=6).contains(&self.title_level) {
            return Err(format!("title_level must be 1–6, got {}", self.title_level));
        }
        Ok(())
    }

    /// Frame the normalised body lines into the final document text.
    pub fn frame(&self, body: &[String], last_updated: &str) -> String {
        let mut lines: Vec<String> = Vec::with_capacity(body.len() + 16);
        lines.push(self.yaml_header.clone());
        lines.push(String::new());
        lines.extend(self.setup_includes.iter().cloned());
        lines.push(String::new());
        lines.push(self.author_block.clone());
        lines.push(String::new());
        lines.push(self.banner_include.clone());
        lines.push(String::new());
        lines.extend(body.iter().cloned());
        lines.push(String::new());
        lines.push(String::new());
        lines.push("::::{.doc-version}".to_string());
        lines.push(format!(
            ":::{{.doc-version-left}}\nLast updated: {last_updated}\n:::"
        ));
        lines.push(format!(
            ":::{{.doc-version-right}}\n{}\n:::",
            self.built_with
        ));
        lines.push("::::".to_string());
        lines.push(String::new());

        let mut doc = lines.join("\n");
        doc.push('\n');
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_registry_has_seven_figures() {
        let reg = FigureRegistry::published();
        assert_eq!(reg.includes.len(), 7);
        assert_eq!(reg.short_title("2"), Some("CYP3A4 vs CYP2J2 reactivity"));
        assert_eq!(reg.include("5"), Some("![](post/Figure_5.png)"));
        assert_eq!(reg.include("8"), None);
    }

    #[test]
    fn empty_entries_count_as_absent() {
        let mut reg = FigureRegistry::default();
        reg.short_titles.insert("1".into(), String::new());
        assert_eq!(reg.short_title("1"), None);
    }

    #[test]
    fn frame_wraps_body_and_footer() {
        let profile = DocumentProfile::default();
        let doc = profile.frame(&["Hello.".to_string()], "March 3, 2026");
        assert!(doc.starts_with("---\ntitle: \"Building the OpenADMET Data Engine\""));
        assert!(doc.contains("\nHello.\n\n\n::::{.doc-version}\n"));
        assert!(doc.contains(":::{.doc-version-left}\nLast updated: March 3, 2026\n:::"));
        assert!(doc.ends_with("::::\n\n"));
    }

    #[test]
    fn partial_json_profile_keeps_defaults() {
        let json = r#"{ "built_with": "Built with Quarto", "figures": { "includes": { "1": "![](f1.png)" } } }"#;
        let profile: DocumentProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.built_with, "Built with Quarto");
        assert_eq!(profile.title_level, 2);
        assert_eq!(profile.figures.include("1"), Some("![](f1.png)"));
        assert!(profile.figures.short_titles.is_empty());
    }

    #[test]
    fn invalid_title_level_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, r#"{ "title_level": 9 }"#).unwrap();
        let err = DocumentProfile::from_json_file(&path).unwrap_err();
        assert!(matches!(err, AssembleError::InvalidProfile { .. }));
    }
}
