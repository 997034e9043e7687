//! Core types for catir.
//!
//! This crate holds the data model shared by the rest of the workspace:
//! metadata records handed over by an extractor, capture timestamps,
//! filename templates and the run configuration.

mod config;
mod error;
mod record;
mod template;
mod timestamp;

pub use config::{
    DEFAULT_TIMESTAMP_FORMAT, FileConfig, RenameConfig, RenameConfigBuilder, Verbosity,
};
pub use error::{ConfigError, ExtractError, SkipReason, TimestampError};
pub use record::{ImageFormat, MetadataExtractor, MetadataRecord, MetadataRecordBuilder};
pub use template::{NameTemplate, Substitutions, Token};
pub use timestamp::Timestamp;
