use crate::error::{PrinterError, PrinterResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Lifetime counters, persisted as `{"feeds": int, "lines": int}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub feeds: u64,
    pub lines: u64,
}

impl Stats {
    /// A missing file counts as all zeros.
    pub fn load(path: &Path) -> PrinterResult<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(PrinterError::Stats(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        serde_json::from_str(&content)
            .map_err(|e| PrinterError::Stats(format!("cannot parse {}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> PrinterResult<()> {
        let content = serde_json::to_string(self)
            .map_err(|e| PrinterError::Stats(format!("cannot serialize stats: {}", e)))?;
        fs::write(path, content)
            .map_err(|e| PrinterError::Stats(format!("cannot write {}: {}", path.display(), e)))
    }

    /// Read-merge-write of the counters of one session.
    pub fn merge(path: &Path, feeds: u64, lines: u64) -> PrinterResult<Self> {
        let mut stats = Self::load(path)?;
        stats.feeds += feeds;
        stats.lines += lines;
        stats.save(path)?;
        debug!(
            "stats in {}: {} feeds, {} lines",
            path.display(),
            stats.feeds,
            stats.lines
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let stats = Stats::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(stats, Stats::default());
    }

    #[test]
    fn test_merge_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        Stats::merge(&path, 3, 10).unwrap();
        let stats = Stats::merge(&path, 2, 5).unwrap();
        assert_eq!(stats, Stats { feeds: 5, lines: 15 });

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({"feeds": 5, "lines": 15}));
    }

    #[test]
    fn test_garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(Stats::load(&path), Err(PrinterError::Stats(_))));
    }
}
