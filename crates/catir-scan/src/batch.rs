//! Walk results.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Files of one directory, in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryBatch {
    /// Directory holding the files.
    pub dir: PathBuf,
    /// Non-directory entries, sorted by file name.
    pub files: Vec<PathBuf>,
    /// Number of non-directory entries, hidden ones included.
    pub entry_count: usize,
}

impl DirectoryBatch {
    /// Create an empty batch for a directory.
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            files: Vec::new(),
            entry_count: 0,
        }
    }

    /// Add a file entry.
    pub fn push_file(&mut self, path: PathBuf) {
        self.files.push(path);
        self.entry_count += 1;
    }

    /// Sort files by file name.
    pub fn sort_files(&mut self) {
        self.files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    }

    /// Directory basename, empty for filesystem roots.
    pub fn folder_name(&self) -> String {
        self.dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Whether the directory's own name starts with `.`.
    pub fn is_hidden(&self) -> bool {
        self.folder_name().starts_with('.')
    }
}

/// Non-fatal problem met while walking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
}

impl WalkWarning {
    /// Create a new walk warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Everything a walk produced.
#[derive(Debug, Clone, Default)]
pub struct WalkOutcome {
    /// Directory batches, top-down.
    pub batches: Vec<DirectoryBatch>,
    /// Entries that could not be read.
    pub warnings: Vec<WalkWarning>,
}
