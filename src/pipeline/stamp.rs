//! Content stamp: decide whether the "Last updated" date advances.
//!
//! The hash covers the normalised body lines plus a digest of every auxiliary
//! data file, so a re-run over unchanged inputs reproduces the previous date
//! and a change to either the prose or the data moves it to today.
//!
//! The sidecar is two lines, hash then date:
//!
//! ```text
//! 3f2a9c1
//! March 02, 2026
//! ```

use crate::error::AssembleError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Hex characters of the md5 digest kept as the content hash.
pub const HASH_LEN: usize = 7;

/// Display format of the "Last updated" date, e.g. `March 02, 2026`.
pub const DATE_FORMAT: &str = "%B %d, %Y";

/// The persisted `(hash, date)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampRecord {
    pub hash: String,
    pub date: String,
}

impl StampRecord {
    /// Read the sidecar. `Ok(None)` when it does not exist yet.
    ///
    /// A file with only a hash line yields an empty date, which never carries forward.
    pub fn read(path: &Path) -> Result<Option<Self>, AssembleError> {
        if !path.exists() {
            debug!("No content-hash record at {}", path.display());
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path).map_err(|e| AssembleError::from_read(path, e))?;
        Ok(Some(Self::parse(&raw)))
    }

    pub fn parse(raw: &str) -> Self {
        let mut lines = raw.lines();
        let hash = lines.next().unwrap_or_default().to_string();
        let date = lines.next().unwrap_or_default().to_string();
        Self { hash, date }
    }

    pub fn write(&self, path: &Path) -> Result<(), AssembleError> {
        std::fs::write(path, self.to_string()).map_err(|e| AssembleError::StampWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl std::fmt::Display for StampRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.hash)?;
        writeln!(f, "{}", self.date)
    }
}

/// `"{file name} {md5 hex}"` for every data file with `extension` in `dir`, sorted by name.
///
/// A missing directory contributes nothing.
pub fn data_file_digests(dir: &Path, extension: &str) -> Result<Vec<String>, AssembleError> {
    if !dir.is_dir() {
        debug!("No data directory at {}", dir.display());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| AssembleError::from_read(dir, e))? {
        let path = entry.map_err(|e| AssembleError::from_read(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
    files.sort();

    files
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path).map_err(|e| AssembleError::from_read(path, e))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(format!("{name} {:x}", md5::compute(&bytes)))
        })
        .collect()
}

/// Short md5 over the body lines followed by the data-file digests.
pub fn content_hash(lines: &[String], data_digests: &[String]) -> String {
    let mut input = String::new();
    for line in lines {
        input.push_str(line);
        input.push('\n');
    }
    input.push('\n');
    input.push_str("# data file hashes");
    for digest in data_digests {
        input.push('\n');
        input.push_str(digest);
    }
    input.push('\n');

    let mut hex = format!("{:x}", md5::compute(input.as_bytes()));
    hex.truncate(HASH_LEN);
    hex
}

/// Carry the previous date forward when the hash is unchanged, else use `today`.
pub fn resolve_last_updated(previous: Option<&StampRecord>, hash: &str, today: NaiveDate) -> String {
    match previous {
        Some(prev) if prev.hash == hash && !prev.date.is_empty() => prev.date.clone(),
        _ => today.format(DATE_FORMAT).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn hash_is_short_and_stable() {
        let lines = vec!["# Title".to_string(), String::new(), "Body.".to_string()];
        let a = content_hash(&lines, &[]);
        let b = content_hash(&lines, &[]);
        assert_eq!(a.len(), HASH_LEN);
        assert_eq!(a, b);
    }

    #[test]
    fn hash_input_layout() {
        // "a\n" + "\n" + "# data file hashes" + "\nx.tsv 0" + "\n"
        let expected = format!("{:x}", md5::compute(b"a\n\n# data file hashes\nx.tsv 0\n"));
        let got = content_hash(&["a".to_string()], &["x.tsv 0".to_string()]);
        assert_eq!(got, expected[..HASH_LEN]);
    }

    #[test]
    fn data_changes_move_the_hash() {
        let lines = vec!["Body.".to_string()];
        let a = content_hash(&lines, &["a.tsv 111".to_string()]);
        let b = content_hash(&lines, &["a.tsv 222".to_string()]);
        assert_ne!(a, b);
    }

    #[test]
    fn date_carries_forward_on_match() {
        let prev = StampRecord {
            hash: "abc1234".into(),
            date: "March 02, 2026".into(),
        };
        assert_eq!(
            resolve_last_updated(Some(&prev), "abc1234", day(2026, 4, 1)),
            "March 02, 2026"
        );
    }

    #[test]
    fn date_advances_on_change() {
        let prev = StampRecord {
            hash: "abc1234".into(),
            date: "March 02, 2026".into(),
        };
        assert_eq!(
            resolve_last_updated(Some(&prev), "fff0000", day(2026, 4, 1)),
            "April 01, 2026"
        );
        assert_eq!(resolve_last_updated(None, "x", day(2026, 4, 1)), "April 01, 2026");
    }

    #[test]
    fn empty_previous_date_does_not_carry() {
        let prev = StampRecord::parse("abc1234\n");
        assert_eq!(prev.date, "");
        assert_eq!(
            resolve_last_updated(Some(&prev), "abc1234", day(2026, 4, 1)),
            "April 01, 2026"
        );
    }

    #[test]
    fn record_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".content-hash");
        assert_eq!(StampRecord::read(&path).unwrap(), None);

        let rec = StampRecord {
            hash: "1a2b3c4".into(),
            date: "May 05, 2026".into(),
        };
        rec.write(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1a2b3c4\nMay 05, 2026\n");
        assert_eq!(StampRecord::read(&path).unwrap(), Some(rec));
    }

    #[test]
    fn digests_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.tsv"), "2").unwrap();
        std::fs::write(dir.path().join("a.tsv"), "1").unwrap();
        std::fs::write(dir.path().join("c.csv"), "3").unwrap();
        std::fs::create_dir(dir.path().join("raw.tsv")).unwrap();

        let digests = data_file_digests(dir.path(), "tsv").unwrap();
        assert_eq!(digests.len(), 2);
        assert_eq!(digests[0], format!("a.tsv {:x}", md5::compute(b"1")));
        assert!(digests[1].starts_with("b.tsv "));
    }

    #[test]
    fn missing_data_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(data_file_digests(&dir.path().join("none"), "tsv").unwrap().is_empty());
    }
}
