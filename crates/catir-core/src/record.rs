//! Metadata records and the extractor seam.

use std::path::Path;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// Image container format, rendered in upper case as the `{ext}` value.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Tiff,
    Webp,
    Gif,
    Bmp,
    Heif,
}

/// Fields extracted from one image.
///
/// Values are kept as found in the file; absent tags are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct MetadataRecord {
    /// Container format of the file.
    pub format: ImageFormat,

    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub artist: Option<String>,

    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub make: Option<String>,

    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub model: Option<String>,

    /// Raw `DateTimeOriginal` string.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub date_time_original: Option<String>,

    /// Raw `DateTimeDigitized` string.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub date_time_digitized: Option<String>,
}

impl MetadataRecord {
    /// Create a new record builder.
    pub fn builder() -> MetadataRecordBuilder {
        MetadataRecordBuilder::default()
    }

    /// Create a record with only a format set.
    pub fn new(format: ImageFormat) -> Self {
        Self {
            format,
            artist: None,
            make: None,
            model: None,
            date_time_original: None,
            date_time_digitized: None,
        }
    }

    /// The timestamp source: DateTimeOriginal, else DateTimeDigitized.
    ///
    /// Empty strings count as absent.
    pub fn timestamp_source(&self) -> Option<&str> {
        self.date_time_original
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.date_time_digitized.as_deref().filter(|s| !s.is_empty()))
    }
}

/// Reads a [`MetadataRecord`] from a file.
pub trait MetadataExtractor {
    /// Extract metadata, or signal that the file is not an image or has none.
    fn extract(&self, path: &Path) -> Result<MetadataRecord, ExtractError>;
}

impl<T: MetadataExtractor + ?Sized> MetadataExtractor for &T {
    fn extract(&self, path: &Path) -> Result<MetadataRecord, ExtractError> {
        (**self).extract(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_display() {
        assert_eq!(ImageFormat::Jpeg.to_string(), "JPEG");
        assert_eq!(ImageFormat::Webp.to_string(), "WEBP");
        assert_eq!("TIFF".parse::<ImageFormat>().unwrap(), ImageFormat::Tiff);
    }

    #[test]
    fn test_timestamp_source_prefers_original() {
        let record = MetadataRecord::builder()
            .format(ImageFormat::Jpeg)
            .date_time_original("2023:04:05 06:07:08")
            .date_time_digitized("2020:01:01 00:00:00")
            .build()
            .unwrap();
        assert_eq!(record.timestamp_source(), Some("2023:04:05 06:07:08"));
    }

    #[test]
    fn test_timestamp_source_falls_back_to_digitized() {
        let record = MetadataRecord::builder()
            .format(ImageFormat::Jpeg)
            .date_time_original("")
            .date_time_digitized("2020:01:01 00:00:00")
            .build()
            .unwrap();
        assert_eq!(record.timestamp_source(), Some("2020:01:01 00:00:00"));

        assert_eq!(MetadataRecord::new(ImageFormat::Png).timestamp_source(), None);
    }
}
