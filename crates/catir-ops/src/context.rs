//! Per-directory sequence state.

use std::path::{Path, PathBuf};

use catir_scan::DirectoryBatch;

/// State for one directory: its sequence counter and padding width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryContext {
    dir: PathBuf,
    folder: String,
    next_seq: i64,
    seq_width: usize,
}

impl DirectoryContext {
    /// Create a context for a directory holding `entry_count` non-directory
    /// entries.
    pub fn new(dir: PathBuf, entry_count: usize, sequence_start: i64) -> Self {
        let folder = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            dir,
            folder,
            next_seq: sequence_start,
            seq_width: entry_count.to_string().len(),
        }
    }

    /// Create a context for a walked batch.
    pub fn from_batch(batch: &DirectoryBatch, sequence_start: i64) -> Self {
        Self::new(batch.dir.clone(), batch.entry_count, sequence_start)
    }

    /// The directory path.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Directory basename, used for `{Folder}`.
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Zero-padding width for `{Seq}`.
    pub fn seq_width(&self) -> usize {
        self.seq_width
    }

    /// Sequence value the next renamed file receives.
    pub fn current_seq(&self) -> i64 {
        self.next_seq
    }

    /// Render a sequence value zero-padded to the directory width.
    pub fn format_seq(&self, value: i64) -> String {
        format!("{value:0width$}", width = self.seq_width)
    }

    /// Consume the current sequence value.
    pub fn advance(&mut self) {
        self.next_seq += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_from_entry_count() {
        let ctx = DirectoryContext::new(PathBuf::from("/data/CAM01"), 120, 1);
        assert_eq!(ctx.seq_width(), 3);
        assert_eq!(ctx.format_seq(7), "007");
        assert_eq!(ctx.folder(), "CAM01");

        let ctx = DirectoryContext::new(PathBuf::from("/data/CAM01"), 9, 1);
        assert_eq!(ctx.format_seq(7), "7");
    }

    #[test]
    fn test_width_ignores_start_value() {
        let ctx = DirectoryContext::new(PathBuf::from("/data/CAM01"), 5, 1000);
        assert_eq!(ctx.format_seq(ctx.current_seq()), "1000");
    }

    #[test]
    fn test_negative_values_keep_sign() {
        let ctx = DirectoryContext::new(PathBuf::from("/data/CAM01"), 1000, -3);
        assert_eq!(ctx.format_seq(ctx.current_seq()), "-003");
    }

    #[test]
    fn test_empty_directory_width() {
        let ctx = DirectoryContext::new(PathBuf::from("/data/CAM01"), 0, 1);
        assert_eq!(ctx.seq_width(), 1);
    }

    #[test]
    fn test_advance() {
        let mut ctx = DirectoryContext::new(PathBuf::from("/data/CAM01"), 10, 1);
        ctx.advance();
        ctx.advance();
        assert_eq!(ctx.current_seq(), 3);
        assert_eq!(ctx.format_seq(ctx.current_seq()), "03");
    }
}
