//! Error types shared across the workspace.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors in the run configuration. These abort the run.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A placeholder names no known token.
    #[error("Unknown placeholder '{{{name}}}' in filename template")]
    UnknownToken { name: String },

    /// A `{` was opened but never closed.
    #[error("Unterminated placeholder in filename template: {template}")]
    UnterminatedPlaceholder { template: String },

    /// A lone `}` outside a placeholder.
    #[error("Single '}}' encountered in filename template: {template}")]
    StrayBrace { template: String },

    /// Placeholders with format specs or conversions (`{Seq:03}`).
    #[error("Format specifiers are not supported in placeholder '{{{spec}}}'")]
    FormatSpec { spec: String },

    /// The deployment name cannot be taken from the path.
    #[error(
        "Cannot derive a deployment name from {path}: fewer than five path segments, \
         pass --deployment-name"
    )]
    DeploymentNameUnderivable { path: PathBuf },

    /// A configured deployment name cannot be used as a filename prefix.
    #[error("Invalid deployment name '{name}': {reason}")]
    InvalidDeploymentName { name: String, reason: String },

    /// Config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`FileConfig`](crate::FileConfig).
    #[error("Invalid config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Signals from a metadata extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The file cannot be opened or is not a recognised image container.
    #[error("Not an image file")]
    NotAnImage,
    /// The image opened but has no readable EXIF block.
    #[error("No EXIF data found")]
    NoMetadata,
}

/// Failures deriving a capture timestamp from a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// Neither DateTimeOriginal nor DateTimeDigitized is present.
    #[error("No timestamp found in image EXIF")]
    NoTimestampField,
    /// The field does not contain `YYYY:MM:DD hh:mm:ss`.
    #[error("Timestamp not in correct format: {raw:?}")]
    Malformed { raw: String },
}

/// Why a file was left untouched. Rendered verbatim in the skip report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(strum::Display, strum::AsRefStr)]
pub enum SkipReason {
    #[strum(to_string = "No EXIF data found")]
    NoExifData,
    #[strum(to_string = "No timestamp found in image EXIF")]
    NoTimestamp,
    #[strum(to_string = "Timestamp not in correct format")]
    MalformedTimestamp,
    #[strum(to_string = "Failed to rename file")]
    RenameFailed,
    #[strum(to_string = "Could not resolve filename collision")]
    CollisionUnresolved,
    #[strum(to_string = "Input path not found")]
    InputNotFound,
    #[strum(to_string = "Could not read input path")]
    InputUnreadable,
}

impl From<&TimestampError> for SkipReason {
    fn from(err: &TimestampError) -> Self {
        match err {
            TimestampError::NoTimestampField => Self::NoTimestamp,
            TimestampError::Malformed { .. } => Self::MalformedTimestamp,
        }
    }
}
