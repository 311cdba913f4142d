//! Extractor configuration: validity window and display style.
//!
//! Loaded from a JSON file (see [`crate::config::default_config_path`]) or
//! built in code. The window can be given as explicit limits or as a day
//! range counted from a start instant (now, when no start is given).

use std::path::Path;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid validity window: {0}")]
    InvalidWindow(String),
}

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// How a successful extraction is rendered into `format`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStyle {
    /// `HH:MM[:SS]`, `YYYY-MM-DD` or `YYYY-MM-DD HH:MM[:SS]`, matching the
    /// granularity of the match.
    #[default]
    Canonical,
    /// `MM月dd日 HH:mm` of the value resolved against the reference date.
    MonthDayClock,
}

/// User-facing extractor settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Earliest accepted instant.
    pub start_limit: Option<NaiveDateTime>,
    /// Latest accepted instant (inclusive).
    pub end_limit: Option<NaiveDateTime>,
    /// Window length in days from `start_limit` (or now). Negative counts
    /// backwards. Mutually exclusive with `end_limit`.
    pub day_range: Option<i64>,
    pub display_style: DisplayStyle,
}

/// Concrete window an extracted instant must fall into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidityWindow {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl ValidityWindow {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Both bounds inclusive.
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        if self.start.is_some_and(|start| instant < start) {
            return false;
        }
        self.end.map_or(true, |end| instant <= end)
    }
}

// ═══════════════════════════════════════════════════════════
// Construction
// ═══════════════════════════════════════════════════════════

impl ExtractorConfig {
    /// Accept instants from `start` (or now) through `days` days later.
    pub fn with_day_range(mut self, days: i64) -> Self {
        self.day_range = Some(days);
        self.end_limit = None;
        self
    }

    pub fn with_limits(mut self, start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        self.start_limit = start;
        self.end_limit = end;
        self
    }

    pub fn with_display_style(mut self, style: DisplayStyle) -> Self {
        self.display_style = style;
        self
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        tracing::debug!(path = %path.display(), "Loaded extractor config");
        Ok(config)
    }

    /// Like [`Self::load`], but a missing file yields the default config.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No extractor config, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.day_range.is_some() && self.end_limit.is_some() {
            return Err(ConfigError::InvalidWindow(
                "day_range and end_limit cannot both be set".into(),
            ));
        }
        if let (Some(start), Some(end)) = (self.start_limit, self.end_limit) {
            if start > end {
                return Err(ConfigError::InvalidWindow(format!(
                    "start_limit {start} is after end_limit {end}"
                )));
            }
        }
        Ok(())
    }

    /// Derive the concrete window, anchoring a day range at `now` when no
    /// start limit is configured.
    pub fn resolve_window(&self, now: NaiveDateTime) -> Result<ValidityWindow, ConfigError> {
        self.validate()?;

        let Some(days) = self.day_range else {
            return Ok(ValidityWindow {
                start: self.start_limit,
                end: self.end_limit,
            });
        };

        let anchor = self.start_limit.unwrap_or(now);
        let other = TimeDelta::try_days(days)
            .and_then(|delta| anchor.checked_add_signed(delta))
            .ok_or_else(|| {
                ConfigError::InvalidWindow(format!("day_range {days} is out of bounds"))
            })?;

        let (start, end) = if days >= 0 { (anchor, other) } else { (other, anchor) };
        Ok(ValidityWindow {
            start: Some(start),
            end: Some(end),
        })
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
