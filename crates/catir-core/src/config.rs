//! Run configuration types.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::template::NameTemplate;

/// Template used when none is configured.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "{YYYY}-{MM}-{DD}_{hh}-{mm}-{ss}";

/// How much per-file output a run produces.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Verbosity {
    /// Nothing but fatal errors.
    Quiet,
    /// File names only.
    #[default]
    Normal,
    /// Full old and new paths.
    Verbose,
}

/// Configuration for a rename run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct RenameConfig {
    /// First value of the per-directory sequence counter.
    #[builder(default = "1")]
    #[serde(default = "default_sequence_start")]
    pub sequence_start: i64,

    /// Descend into subdirectories.
    #[builder(default = "false")]
    #[serde(default)]
    pub recursive: bool,

    /// Include hidden files and directories (starting with `.`).
    #[builder(default = "false")]
    #[serde(default)]
    pub include_hidden: bool,

    /// Compute and report names without renaming anything.
    #[builder(default = "false")]
    #[serde(default)]
    pub dry_run: bool,

    /// Filename prefix. Derived from the first resolved path when unset.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub deployment_name: Option<String>,

    /// Filename template, without the `.{ext}` suffix.
    #[builder(default = "DEFAULT_TIMESTAMP_FORMAT.to_string()")]
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    /// Output verbosity.
    #[builder(default)]
    #[serde(default)]
    pub verbosity: Verbosity,
}

fn default_sequence_start() -> i64 {
    1
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_string()
}

impl RenameConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref format) = self.timestamp_format {
            NameTemplate::with_extension(format).map_err(|e| e.to_string())?;
        }
        if let Some(Some(ref name)) = self.deployment_name {
            validate_deployment_name(name).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

impl RenameConfig {
    /// Create a new config builder.
    pub fn builder() -> RenameConfigBuilder {
        RenameConfigBuilder::default()
    }

    /// The full filename template, `.{ext}` suffix included.
    pub fn template(&self) -> Result<NameTemplate, ConfigError> {
        NameTemplate::with_extension(&self.timestamp_format)
    }

    /// Check if hidden files should be skipped.
    pub fn should_skip_hidden(&self, name: &str) -> bool {
        !self.include_hidden && name.starts_with('.')
    }
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            sequence_start: 1,
            recursive: false,
            include_hidden: false,
            dry_run: false,
            deployment_name: None,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            verbosity: Verbosity::Normal,
        }
    }
}

/// Reject deployment names that cannot prefix a filename.
pub(crate) fn validate_deployment_name(name: &str) -> Result<(), ConfigError> {
    let reason = if name.is_empty() {
        "name cannot be empty"
    } else if name.contains(['/', '\0']) || name.contains(std::path::MAIN_SEPARATOR) {
        "name cannot contain path separators"
    } else {
        return Ok(());
    };
    Err(ConfigError::InvalidDeploymentName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

/// Defaults read from a TOML file. Command-line flags override them.
///
/// ```toml
/// deployment-name = "KLN-04"
/// timestamp-format = "{YYYY}-{MM}-{DD}_{hh}-{mm}-{ss}_{Seq}"
/// sequence-start = 1
/// recursive = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub sequence_start: Option<i64>,
    pub recursive: Option<bool>,
    pub include_hidden: Option<bool>,
    pub deployment_name: Option<String>,
    pub timestamp_format: Option<String>,
    pub strict_exif: Option<bool>,
}

impl FileConfig {
    /// `<config dir>/catir/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("catir").join("config.toml"))
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load the default config file when it exists.
    pub fn load_default() -> Result<Option<Self>, ConfigError> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path).map(Some),
            _ => Ok(None),
        }
    }

    /// Seed a builder with the values set in this file.
    pub fn apply_to(&self, builder: &mut RenameConfigBuilder) {
        if let Some(start) = self.sequence_start {
            builder.sequence_start(start);
        }
        if let Some(recursive) = self.recursive {
            builder.recursive(recursive);
        }
        if let Some(hidden) = self.include_hidden {
            builder.include_hidden(hidden);
        }
        if let Some(ref name) = self.deployment_name {
            builder.deployment_name(name.clone());
        }
        if let Some(ref format) = self.timestamp_format {
            builder.timestamp_format(format.clone());
        }
    }
}
