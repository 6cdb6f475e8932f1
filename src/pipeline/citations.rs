//! Citation table: citation number → hover tooltip and URL.
//!
//! The table is optional. When the file is absent the run continues with an
//! empty table and every citation renders as a plain Markdown link.

use crate::error::AssembleError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// One row of the citation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub number: String,
    #[serde(default)]
    pub tooltip: String,
    #[serde(default)]
    pub url: String,
}

/// All citations, keyed by number as written in the document ("12").
#[derive(Debug, Clone, Default)]
pub struct CitationTable {
    entries: HashMap<String, Citation>,
}

impl CitationTable {
    /// Load a tab-separated table with a header row.
    ///
    /// A missing file yields an empty table; anything else that goes wrong is fatal.
    pub fn load(path: &Path) -> Result<Self, AssembleError> {
        if !path.exists() {
            info!(
                "No citation table at {}; tooltips will be skipped",
                path.display()
            );
            return Ok(Self::default());
        }

        let file = std::fs::File::open(path).map_err(|e| AssembleError::from_read(path, e))?;
        let table = Self::from_reader(file).map_err(|e| AssembleError::CitationTable {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        info!("Loaded {} citations", table.len());
        Ok(table)
    }

    /// Parse a table from any reader. Later rows win on duplicate numbers.
    ///
    /// Fields follow standard `"` quoting with `""` escapes; a quote in the
    /// middle of an unquoted field is literal.
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut entries = HashMap::new();
        for row in rdr.deserialize() {
            let citation: Citation = row?;
            entries.insert(citation.number.clone(), citation);
        }
        Ok(Self { entries })
    }

    pub fn lookup(&self, number: &str) -> Option<&Citation> {
        self.entries.get(number)
    }

    /// The tooltip for `number`, if it has a non-empty one.
    pub fn tooltip(&self, number: &str) -> Option<&str> {
        self.lookup(number)
            .map(|c| c.tooltip.as_str())
            .filter(|t| !t.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Citation> for CitationTable {
    fn from_iter<I: IntoIterator<Item = Citation>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|c| (c.number.clone(), c)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TSV: &str = "number\ttooltip\turl\n\
                       1\tSmith et al. 2020, \"CYP3A4\"\thttps://doi.org/10.1/a\n\
                       2\t\"Quoted\" title, 2019\thttps://doi.org/10.1/q\n\
                       12\tJones 2021\thttps://doi.org/10.1/b\n\
                       13\t\thttps://doi.org/10.1/c\n";

    #[test]
    fn parses_rows() {
        let t = CitationTable::from_reader(TSV.as_bytes()).unwrap();
        assert_eq!(t.len(), 4);
        assert_eq!(t.tooltip("12"), Some("Jones 2021"));
        assert_eq!(t.lookup("1").unwrap().url, "https://doi.org/10.1/a");
    }

    #[test]
    fn quotes_inside_fields_survive() {
        let t = CitationTable::from_reader(TSV.as_bytes()).unwrap();
        assert_eq!(t.tooltip("1"), Some("Smith et al. 2020, \"CYP3A4\""));
    }

    #[test]
    fn leading_quotes_are_field_quoting() {
        let t = CitationTable::from_reader(TSV.as_bytes()).unwrap();
        assert_eq!(t.tooltip("2"), Some("Quoted title, 2019"));
    }

    #[test]
    fn doubled_quotes_unescape() {
        let tsv = "number\ttooltip\turl\n\
                   5\t\"Smith, \"\"CYP3A4\"\" kinetics\"\thttps://doi.org/10.1/s\n";
        let t = CitationTable::from_reader(tsv.as_bytes()).unwrap();
        assert_eq!(t.tooltip("5"), Some("Smith, \"CYP3A4\" kinetics"));
        assert_eq!(t.lookup("5").unwrap().url, "https://doi.org/10.1/s");
    }

    #[test]
    fn empty_tooltip_is_none() {
        let t = CitationTable::from_reader(TSV.as_bytes()).unwrap();
        assert!(t.lookup("13").is_some());
        assert_eq!(t.tooltip("13"), None);
        assert_eq!(t.tooltip("99"), None);
    }

    #[test]
    fn missing_optional_columns_default() {
        let t = CitationTable::from_reader("number\n4\n".as_bytes()).unwrap();
        assert_eq!(t.lookup("4").unwrap().url, "");
    }

    #[test]
    fn absent_file_gives_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let t = CitationTable::load(&dir.path().join("citations.tsv")).unwrap();
        assert!(t.is_empty());
    }

    #[test]
    fn missing_number_column_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("citations.tsv");
        std::fs::write(&path, "id\ttooltip\n1\tx\n").unwrap();
        let err = CitationTable::load(&path).unwrap_err();
        assert!(matches!(err, AssembleError::CitationTable { .. }));
    }
}
