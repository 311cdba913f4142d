use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Specificity of an extracted value, least specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Time,
    Date,
    DateTime,
}

/// Normalized value at the granularity the matched text supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemporalValue {
    /// Time of day only (`11:35`).
    Time { time: NaiveTime, with_seconds: bool },
    /// Calendar date only (`2024-03-05`, `tomorrow`).
    Date { date: NaiveDate },
    /// Both (`tomorrow 11:35`, `3月5日下午3点`).
    DateTime {
        datetime: NaiveDateTime,
        with_seconds: bool,
    },
}

impl TemporalValue {
    pub fn granularity(&self) -> Granularity {
        match self {
            Self::Time { .. } => Granularity::Time,
            Self::Date { .. } => Granularity::Date,
            Self::DateTime { .. } => Granularity::DateTime,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Time { .. } => None,
            Self::Date { date } => Some(*date),
            Self::DateTime { datetime, .. } => Some(datetime.date()),
        }
    }

    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            Self::Time { time, .. } => Some(*time),
            Self::Date { .. } => None,
            Self::DateTime { datetime, .. } => Some(datetime.time()),
        }
    }

    /// Anchor to a full date-time: time-only values land on `reference`,
    /// date-only values at midnight.
    pub fn resolve(&self, reference: NaiveDate) -> NaiveDateTime {
        match self {
            Self::Time { time, .. } => reference.and_time(*time),
            Self::Date { date } => date.and_time(NaiveTime::MIN),
            Self::DateTime { datetime, .. } => *datetime,
        }
    }
}

/// Why an extraction produced no value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorReason {
    #[error("No date or time found in input")]
    NoPatternMatched,

    #[error("Date or time value out of range")]
    OutOfRange,

    #[error("Extracted time is outside the validity window")]
    OutsideWindow,
}

/// Outcome of one extraction call.
///
/// Either successful with a value and a non-empty `format`, or failed with
/// an [`ErrorReason`] and no value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    is_successful: bool,
    value: Option<TemporalValue>,
    format: String,
    error_reason: Option<ErrorReason>,
    matched_text: Option<String>,
}

impl ExtractionResult {
    pub(crate) fn success(value: TemporalValue, format: String, matched_text: String) -> Self {
        debug_assert!(!format.is_empty(), "successful extraction must render");
        Self {
            is_successful: true,
            value: Some(value),
            format,
            error_reason: None,
            matched_text: Some(matched_text),
        }
    }

    pub(crate) fn failure(reason: ErrorReason, matched_text: Option<String>) -> Self {
        Self {
            is_successful: false,
            value: None,
            format: String::new(),
            error_reason: Some(reason),
            matched_text,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.is_successful
    }

    pub fn value(&self) -> Option<&TemporalValue> {
        self.value.as_ref()
    }

    /// Display rendering; empty on failure.
    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn error_reason(&self) -> Option<ErrorReason> {
        self.error_reason
    }

    /// Input text covering the recognized fragments. Also set for
    /// out-of-range failures.
    pub fn matched_text(&self) -> Option<&str> {
        self.matched_text.as_deref()
    }

    pub fn granularity(&self) -> Option<Granularity> {
        self.value.map(|v| v.granularity())
    }

    pub fn resolve(&self, reference: NaiveDate) -> Option<NaiveDateTime> {
        self.value.map(|v| v.resolve(reference))
    }

    /// Milliseconds since the Unix epoch, reading the resolved value as
    /// local time. `None` on failure or for a local time skipped by DST.
    pub fn timestamp_millis(&self, reference: NaiveDate) -> Option<i64> {
        let naive = self.resolve(reference)?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.timestamp_millis())
    }
}
