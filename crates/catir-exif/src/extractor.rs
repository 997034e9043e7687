//! `kamadak-exif` backed metadata extractor.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use exif::{Exif, In, Reader, Tag, Value};
use serde::{Deserialize, Serialize};
use tracing::debug;

use catir_core::{ExtractError, ImageFormat, MetadataExtractor, MetadataRecord};

use crate::sniff::{SNIFF_LEN, sniff_format};

/// Options for EXIF reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExifOptions {
    /// Keep the tags that parsed when part of the EXIF block is corrupt.
    ///
    /// Camera-trap firmware often writes broken sub-IFDs (maker notes,
    /// multi-picture indexes); with this off those files report no metadata.
    pub tolerate_corrupt_blocks: bool,
}

impl Default for ExifOptions {
    fn default() -> Self {
        Self {
            tolerate_corrupt_blocks: true,
        }
    }
}

impl ExifOptions {
    /// Options that fail on any EXIF parse error.
    pub fn strict() -> Self {
        Self {
            tolerate_corrupt_blocks: false,
        }
    }
}

/// Reads capture metadata from image files.
#[derive(Debug, Clone, Default)]
pub struct ExifExtractor {
    options: ExifOptions,
}

impl ExifExtractor {
    /// Create an extractor with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with the given options.
    pub fn with_options(options: ExifOptions) -> Self {
        Self { options }
    }

    /// The options in use.
    pub fn options(&self) -> ExifOptions {
        self.options
    }

    fn read_exif(&self, path: &Path, source: &mut BufReader<File>) -> Result<Exif, ExtractError> {
        let mut reader = Reader::new();
        reader.continue_on_error(self.options.tolerate_corrupt_blocks);

        match reader.read_from_container(source) {
            Ok(exif) => Ok(exif),
            Err(exif::Error::PartialResult(partial)) => {
                let (exif, errors) = partial.into_inner();
                debug!(
                    path = %path.display(),
                    ignored = errors.len(),
                    "EXIF block partially corrupt, keeping readable tags"
                );
                Ok(exif)
            }
            Err(err) => {
                debug!(path = %path.display(), error = %err, "no readable EXIF");
                Err(ExtractError::NoMetadata)
            }
        }
    }
}

impl MetadataExtractor for ExifExtractor {
    fn extract(&self, path: &Path) -> Result<MetadataRecord, ExtractError> {
        let file = File::open(path).map_err(|_| ExtractError::NotAnImage)?;
        let mut source = BufReader::new(file);

        let format = read_format(&mut source).ok_or(ExtractError::NotAnImage)?;
        let exif = self.read_exif(path, &mut source)?;

        Ok(record_from_exif(format, &exif))
    }
}

/// Sniff the container and rewind.
fn read_format(source: &mut BufReader<File>) -> Option<ImageFormat> {
    let mut header = Vec::with_capacity(SNIFF_LEN as usize);
    source.by_ref().take(SNIFF_LEN).read_to_end(&mut header).ok()?;
    source.seek(SeekFrom::Start(0)).ok()?;
    sniff_format(&header)
}

fn record_from_exif(format: ImageFormat, exif: &Exif) -> MetadataRecord {
    MetadataRecord {
        format,
        artist: ascii_field(exif, Tag::Artist),
        make: ascii_field(exif, Tag::Make),
        model: ascii_field(exif, Tag::Model),
        date_time_original: ascii_field(exif, Tag::DateTimeOriginal),
        date_time_digitized: ascii_field(exif, Tag::DateTimeDigitized),
    }
}

/// First component of an ASCII tag, trailing NULs removed.
fn ascii_field(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match field.value {
        Value::Ascii(ref parts) => parts
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).trim_end_matches('\0').to_string()),
        _ => None,
    }
}
