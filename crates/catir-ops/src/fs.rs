//! Filesystem access used by the driver.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Existence checks and the rename commit.
pub trait Filesystem {
    /// Whether any entry (file, directory, link) exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Move `from` to `to`. Must not replace an existing `to`.
    fn commit(&self, from: &Path, to: &Path) -> io::Result<()>;
}

impl<T: Filesystem + ?Sized> Filesystem for &T {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn commit(&self, from: &Path, to: &Path) -> io::Result<()> {
        (**self).commit(from, to)
    }
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl Filesystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok()
    }

    fn commit(&self, from: &Path, to: &Path) -> io::Result<()> {
        // Re-checked right before the rename; a file created after name
        // resolution makes the commit fail instead of being replaced.
        if self.exists(to) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("'{}' already exists", to.display()),
            ));
        }
        fs::rename(from, to)
    }
}

/// Renames planned during a dry run.
///
/// Viewed over the real filesystem, a planned target exists and a planned
/// source no longer does, so later files see the tree a real run would
/// have left behind.
#[derive(Debug, Clone, Default)]
pub struct PlannedMoves {
    vacated: HashSet<PathBuf>,
    claimed: HashSet<PathBuf>,
}

impl PlannedMoves {
    /// Record a planned rename.
    pub fn record(&mut self, from: &Path, to: &Path) {
        self.claimed.remove(from);
        self.vacated.insert(from.to_path_buf());
        self.vacated.remove(to);
        self.claimed.insert(to.to_path_buf());
    }

    /// Number of recorded renames still claiming a target.
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }

    /// Read-only view of `fs` with the planned renames applied.
    pub fn over<'a, F: Filesystem>(&'a self, fs: &'a F) -> PlannedView<'a, F> {
        PlannedView { fs, moves: self }
    }
}

/// A filesystem seen through [`PlannedMoves`]. Commits are no-ops.
#[derive(Debug)]
pub struct PlannedView<'a, F> {
    fs: &'a F,
    moves: &'a PlannedMoves,
}

impl<F: Filesystem> Filesystem for PlannedView<'_, F> {
    fn exists(&self, path: &Path) -> bool {
        self.moves.claimed.contains(path)
            || (!self.moves.vacated.contains(path) && self.fs.exists(path))
    }

    fn commit(&self, _from: &Path, _to: &Path) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_commit_renames() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("IMG_0001.JPG");
        let to = temp.path().join("KLN_2023-04-05_06-07-08.JPEG");
        fs::write(&from, "x").unwrap();

        LocalFs.commit(&from, &to).unwrap();

        assert!(!LocalFs.exists(&from));
        assert!(LocalFs.exists(&to));
    }

    #[test]
    fn test_commit_refuses_overwrite() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("a.jpg");
        let to = temp.path().join("b.jpg");
        fs::write(&from, "new").unwrap();
        fs::write(&to, "old").unwrap();

        let err = LocalFs.commit(&from, &to).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&to).unwrap(), "old");
        assert!(LocalFs.exists(&from));
    }

    #[test]
    fn test_planned_view() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("IMG_0001.JPG");
        let b = temp.path().join("IMG_0002.JPG");
        let target = temp.path().join("KLN_2023-04-05_06-07-08.JPEG");
        fs::write(&a, "x").unwrap();
        fs::write(&b, "x").unwrap();

        let mut moves = PlannedMoves::default();
        moves.record(&a, &target);
        let view = moves.over(&LocalFs);

        assert!(!view.exists(&a));
        assert!(view.exists(&b));
        assert!(view.exists(&target));
        view.commit(&b, &target).unwrap();
        // Nothing touched on disk.
        assert!(a.exists());
        assert!(!target.exists());
        assert_eq!(moves.len(), 1);
    }

    #[test]
    fn test_directories_exist() {
        let temp = TempDir::new().unwrap();
        assert!(LocalFs.exists(temp.path()));
        assert!(!LocalFs.exists(&temp.path().join("missing")));
    }
}
