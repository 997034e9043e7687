//! Per-file results and the run summary.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use catir_core::SkipReason;
use catir_scan::WalkWarning;

/// A rename computed for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePlan {
    /// Path before the rename.
    pub old_path: PathBuf,
    /// Path after the rename. Did not exist when it was chosen.
    pub new_path: PathBuf,
    /// New base name, without the deployment prefix.
    pub new_base: String,
    /// Sequence value the file consumed.
    pub sequence: i64,
    /// Whether the rename was only planned.
    pub dry_run: bool,
}

impl RenamePlan {
    /// File name before the rename.
    pub fn old_file_name(&self) -> String {
        self.old_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A file or input path left untouched, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipEntry {
    pub path: PathBuf,
    pub reason: SkipReason,
}

impl SkipEntry {
    pub fn new(path: impl Into<PathBuf>, reason: SkipReason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }
}

impl fmt::Display for SkipEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path.display(), self.reason)
    }
}

/// Totals for a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Directories processed (hidden directories that were skipped excluded).
    pub directories: usize,
    /// Files renamed, or planned in a dry run.
    pub renamed: usize,
    /// Files that are not recognised images.
    pub ignored: usize,
    /// Skip log, in the order the skips happened.
    pub skipped: Vec<SkipEntry>,
    /// Entries below the inputs that could not be read while walking.
    pub walk_warnings: Vec<WalkWarning>,
}

impl RunSummary {
    /// Whether any file was skipped with a reported reason.
    pub fn has_skips(&self) -> bool {
        !self.skipped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_entry_display() {
        let entry = SkipEntry::new("/data/CAM01/IMG_0001.JPG", SkipReason::NoExifData);
        assert_eq!(
            entry.to_string(),
            "/data/CAM01/IMG_0001.JPG (No EXIF data found)"
        );
    }

    #[test]
    fn test_summary_json() {
        let summary = RunSummary {
            directories: 2,
            renamed: 5,
            ignored: 1,
            skipped: vec![SkipEntry::new("/x.jpg", SkipReason::NoTimestamp)],
            walk_warnings: vec![WalkWarning::new("/data/locked", "Permission denied")],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["renamed"], 5);
        assert_eq!(json["skipped"][0]["reason"], "NoTimestamp");
        assert_eq!(json["walk_warnings"][0]["path"], "/data/locked");
        assert!(summary.has_skips());
    }
}
