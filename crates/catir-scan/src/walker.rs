//! JWalk-based directory walker producing per-directory batches.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use jwalk::{Parallelism, WalkDir};
use tracing::{debug, warn};

use crate::batch::{DirectoryBatch, WalkOutcome, WalkWarning};
use crate::error::WalkError;

/// Walks input paths into [`DirectoryBatch`]es.
///
/// Traversal is serial and sorted so batches come out top-down in a stable
/// order. Hidden entries are always listed; filtering them is the caller's
/// policy.
#[derive(Debug, Clone, Default)]
pub struct DirectoryWalker {
    recursive: bool,
}

impl DirectoryWalker {
    /// Create a walker that only lists the root directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Descend into subdirectories.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Walk one input path.
    ///
    /// A regular file becomes a one-entry batch of its parent directory.
    pub fn walk(&self, input: &Path) -> Result<WalkOutcome, WalkError> {
        let metadata = std::fs::metadata(input).map_err(|e| WalkError::io(input, e))?;

        if !metadata.is_dir() {
            let dir = input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            let mut batch = DirectoryBatch::new(dir);
            batch.push_file(input.to_path_buf());
            return Ok(WalkOutcome {
                batches: vec![batch],
                warnings: Vec::new(),
            });
        }

        Ok(self.collect_batches(input))
    }

    fn collect_batches(&self, root: &Path) -> WalkOutcome {
        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(root)
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(false)
            .follow_links(false)
            .min_depth(0)
            .max_depth(max_depth);

        // Insertion order is traversal order: the root first, then every
        // directory as it is reached.
        let mut batches: IndexMap<PathBuf, DirectoryBatch> = IndexMap::new();
        batches.insert(root.to_path_buf(), DirectoryBatch::new(root.to_path_buf()));
        let mut warnings = Vec::new();

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    warn!(path = %path.display(), error = %err, "walk error");
                    warnings.push(WalkWarning::new(path, err.to_string()));
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path();
            let file_type = entry.file_type();

            if file_type.is_dir() {
                if self.recursive {
                    batches
                        .entry(path.clone())
                        .or_insert_with(|| DirectoryBatch::new(path));
                }
                continue;
            }

            // Links to directories are neither walked nor renamed.
            if file_type.is_symlink() && path.is_dir() {
                continue;
            }

            if let Some(parent) = path.parent() {
                batches
                    .entry(parent.to_path_buf())
                    .or_insert_with(|| DirectoryBatch::new(parent.to_path_buf()))
                    .push_file(path);
            }
        }

        let batches: Vec<DirectoryBatch> = batches
            .into_values()
            .map(|mut batch| {
                batch.sort_files();
                batch
            })
            .collect();

        debug!(
            root = %root.display(),
            directories = batches.len(),
            warnings = warnings.len(),
            "walk complete"
        );

        WalkOutcome { batches, warnings }
    }
}
