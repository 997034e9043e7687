//! Error types for walking input paths.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop a single input path from being walked.
#[derive(Debug, Error)]
pub enum WalkError {
    /// Input path does not exist.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Permission denied for the input path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WalkError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_error_io() {
        let err = WalkError::io(
            "/data/CAM01",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, WalkError::NotFound { .. }));
        assert_eq!(err.to_string(), "Path not found: /data/CAM01");
    }
}
