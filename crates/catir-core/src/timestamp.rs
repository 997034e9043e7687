//! Capture timestamp parsing.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TimestampError;
use crate::record::MetadataRecord;

static TIMESTAMP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        concat!(
            r"(?P<YYYY>[0-9]{1,4}):(?P<MM>[0-9]{1,2}):(?P<DD>[0-9]{1,2}) ",
            r"(?P<hh>[0-9]{1,2}):(?P<mm>[0-9]{1,2}):(?P<ss>[0-9]{1,2})",
        ),
    )
    .expect("timestamp pattern compiles")
});

/// Capture time as found in the metadata.
///
/// Each component holds the matched digits, so `"2023:4:5 6:7:8"` renders
/// `{MM}` as `4`, not `04`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub year: String,
    pub month: String,
    pub day: String,
    pub hour: String,
    pub minute: String,
    pub second: String,
}

impl Timestamp {
    /// Search a raw metadata string for `YYYY:MM:DD hh:mm:ss`.
    ///
    /// Surrounding whitespace is trimmed first; the first match anywhere in
    /// the remaining text wins.
    pub fn parse(raw: &str) -> Result<Self, TimestampError> {
        let caps = TIMESTAMP_PATTERN
            .captures(raw.trim())
            .ok_or_else(|| TimestampError::Malformed {
                raw: raw.to_string(),
            })?;

        let group = |name: &str| caps[name].to_string();
        Ok(Self {
            year: group("YYYY"),
            month: group("MM"),
            day: group("DD"),
            hour: group("hh"),
            minute: group("mm"),
            second: group("ss"),
        })
    }

    /// Derive the capture timestamp of a record.
    pub fn from_record(record: &MetadataRecord) -> Result<Self, TimestampError> {
        let raw = record
            .timestamp_source()
            .ok_or(TimestampError::NoTimestampField)?;
        Self::parse(raw)
    }

    /// Numeric values as `[year, month, day, hour, minute, second]`.
    pub fn values(&self) -> [u32; 6] {
        // Components only ever hold 1-4 ASCII digits.
        [
            &self.year,
            &self.month,
            &self.day,
            &self.hour,
            &self.minute,
            &self.second,
        ]
        .map(|c| c.parse().unwrap_or(0))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{} {}:{}:{}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}
