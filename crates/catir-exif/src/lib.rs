//! EXIF metadata extraction for catir.
//!
//! [`ExifExtractor`] implements [`MetadataExtractor`] on top of
//! `kamadak-exif`. A file is first sniffed for a known image container; if
//! none matches it is reported as [`ExtractError::NotAnImage`]. Images
//! without a readable EXIF block are reported as
//! [`ExtractError::NoMetadata`].
//!
//! ```rust,no_run
//! use catir_core::MetadataExtractor;
//! use catir_exif::ExifExtractor;
//!
//! let record = ExifExtractor::new().extract("DCIM/IMG_0001.JPG".as_ref()).unwrap();
//! println!("{:?} taken {:?}", record.format, record.date_time_original);
//! ```

mod extractor;
mod sniff;

pub use extractor::{ExifExtractor, ExifOptions};
pub use sniff::sniff_format;

pub use catir_core::{ExtractError, ImageFormat, MetadataExtractor, MetadataRecord};
