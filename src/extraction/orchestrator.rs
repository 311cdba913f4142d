//! Extraction orchestrator.
//!
//! Flow per call: find the best date fragment and the best time fragment,
//! range-check each against the calendar, combine them at the most specific
//! granularity, check the validity window, render.

use chrono::{Datelike, NaiveDate, NaiveTime, TimeDelta};

use super::numerals::Meridiem;
use super::patterns::{self, ClockFragment, DateFragment, Fragment, Span};
use super::render::render;
use super::types::{ErrorReason, ExtractionResult, TemporalValue};
use crate::clock::{Clock, SystemClock};
use crate::extractor_config::{ConfigError, DisplayStyle, ExtractorConfig, ValidityWindow};

/// Stateless date/time extractor. `start` takes `&self`, so one instance can
/// be shared across threads.
#[derive(Debug, Clone)]
pub struct TimeExtractor<C = SystemClock> {
    clock: C,
    window: ValidityWindow,
    display_style: DisplayStyle,
}

impl Default for TimeExtractor {
    fn default() -> Self {
        Self {
            clock: SystemClock,
            window: ValidityWindow::unbounded(),
            display_style: DisplayStyle::default(),
        }
    }
}

impl TimeExtractor {
    /// Build an extractor on the system clock.
    pub fn new(config: &ExtractorConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> TimeExtractor<C> {
    /// Build an extractor on a custom clock. A day-range window is anchored
    /// at the clock's current time.
    pub fn with_clock(config: &ExtractorConfig, clock: C) -> Result<Self, ConfigError> {
        let window = config.resolve_window(clock.now())?;
        Ok(Self {
            clock,
            window,
            display_style: config.display_style,
        })
    }

    pub fn window(&self) -> &ValidityWindow {
        &self.window
    }

    pub fn display_style(&self) -> DisplayStyle {
        self.display_style
    }

    /// Extract the most specific date/time expression from `input`.
    ///
    /// Never fails: problems are reported through
    /// [`ExtractionResult::error_reason`].
    pub fn start(&self, input: &str) -> ExtractionResult {
        self.extract_at(input, self.clock.today())
    }

    fn extract_at(&self, input: &str, today: NaiveDate) -> ExtractionResult {
        let date = patterns::find_date(input);
        let time = patterns::find_time(input);

        let span = match (&date, &time) {
            (Some(d), Some(t)) => d.span.cover(t.span),
            (Some(d), None) => d.span,
            (None, Some(t)) => t.span,
            (None, None) => {
                tracing::debug!(input_len = input.len(), "No temporal fragment found");
                return ExtractionResult::failure(ErrorReason::NoPatternMatched, None);
            }
        };
        let matched = slice(input, span);

        let value = match build_value(date.as_ref(), time.as_ref(), today) {
            Ok(value) => value,
            Err(reason) => {
                tracing::debug!(%reason, matched = %matched, "Fragment rejected");
                return ExtractionResult::failure(reason, Some(matched));
            }
        };

        let instant = value.resolve(today);
        if !self.window.contains(instant) {
            tracing::debug!(%instant, window = ?self.window, "Outside validity window");
            return ExtractionResult::failure(ErrorReason::OutsideWindow, Some(matched));
        }

        let format = render(&value, self.display_style, today);
        tracing::debug!(
            granularity = ?value.granularity(),
            date_pattern = date.as_ref().map(|f| f.pattern),
            time_pattern = time.as_ref().map(|f| f.pattern),
            format = %format,
            "Extracted temporal value"
        );
        ExtractionResult::success(value, format, matched)
    }
}

fn slice(input: &str, span: Span) -> String {
    input[span.start..span.end].to_string()
}

/// Combine the fragments at the most specific granularity available.
fn build_value(
    date: Option<&Fragment<DateFragment>>,
    time: Option<&Fragment<ClockFragment>>,
    today: NaiveDate,
) -> Result<TemporalValue, ErrorReason> {
    let implied = date.and_then(|f| f.value.implied_meridiem());
    let date = date.map(|f| resolve_date(&f.value, today)).transpose()?;
    let time = time
        .map(|f| resolve_time(&f.value, implied).map(|t| (t, f.value.second.is_some())))
        .transpose()?;

    match (date, time) {
        (Some(date), Some((time, with_seconds))) => Ok(TemporalValue::DateTime {
            datetime: date.and_time(time),
            with_seconds,
        }),
        (Some(date), None) => Ok(TemporalValue::Date { date }),
        (None, Some((time, with_seconds))) => Ok(TemporalValue::Time { time, with_seconds }),
        (None, None) => Err(ErrorReason::NoPatternMatched),
    }
}

/// Fill missing calendar fields from `today` and range-check.
/// A missing day is today's day, clamped to the length of the month.
fn resolve_date(fragment: &DateFragment, today: NaiveDate) -> Result<NaiveDate, ErrorReason> {
    match *fragment {
        DateFragment::Relative { days, .. } => TimeDelta::try_days(days)
            .and_then(|delta| today.checked_add_signed(delta))
            .ok_or(ErrorReason::OutOfRange),
        DateFragment::Calendar { year, month, day } => {
            let year = year.unwrap_or_else(|| today.year());
            let month = month.unwrap_or_else(|| today.month());
            let day = match day {
                Some(day) => day,
                None => today
                    .day()
                    .min(days_in_month(year, month).ok_or(ErrorReason::OutOfRange)?),
            };
            NaiveDate::from_ymd_opt(year, month, day).ok_or(ErrorReason::OutOfRange)
        }
    }
}

/// `implied` applies only when the fragment carries no marker of its own.
fn resolve_time(
    fragment: &ClockFragment,
    implied: Option<Meridiem>,
) -> Result<NaiveTime, ErrorReason> {
    let hour = match fragment.meridiem.or(implied) {
        Some(meridiem) => meridiem.apply(fragment.hour).ok_or(ErrorReason::OutOfRange)?,
        None => fragment.hour,
    };
    NaiveTime::from_hms_opt(hour, fragment.minute, fragment.second.unwrap_or(0))
        .ok_or(ErrorReason::OutOfRange)
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from((next - first).num_days()).ok()
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::extraction::Granularity;

    fn clock_at(y: i32, m: u32, d: u32, h: u32, min: u32) -> FixedClock {
        FixedClock(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, 0)
                .unwrap(),
        )
    }

    /// Friday 2026-02-20 09:30.
    fn extractor() -> TimeExtractor<FixedClock> {
        TimeExtractor::with_clock(&ExtractorConfig::default(), clock_at(2026, 2, 20, 9, 30)).unwrap()
    }

    fn format_of(input: &str) -> String {
        let result = extractor().start(input);
        assert!(result.is_successful(), "{input:?} failed: {:?}", result.error_reason());
        result.format().to_string()
    }

    fn reason_of(input: &str) -> Option<ErrorReason> {
        extractor().start(input).error_reason()
    }

    // ── Core scenarios ────────────────────────────────────────

    #[test]
    fn bare_clock_time() {
        let result = extractor().start("11:35");
        assert!(result.is_successful());
        assert_eq!(result.format(), "11:35");
        assert_eq!(result.granularity(), Some(Granularity::Time));
        assert_eq!(result.matched_text(), Some("11:35"));
    }

    #[test]
    fn empty_input() {
        let result = extractor().start("");
        assert!(!result.is_successful());
        assert_eq!(result.error_reason(), Some(ErrorReason::NoPatternMatched));
        assert!(result.value().is_none());
        assert_eq!(result.matched_text(), None);
    }

    #[test]
    fn out_of_range_clock() {
        let result = extractor().start("25:99");
        assert!(!result.is_successful());
        assert_eq!(result.error_reason(), Some(ErrorReason::OutOfRange));
        assert_eq!(result.matched_text(), Some("25:99"));
    }

    // ── Properties ────────────────────────────────────────────

    #[test]
    fn every_valid_clock_renders_identically() {
        let ex = extractor();
        for hour in 0..24 {
            for minute in 0..60 {
                let input = format!("{hour:02}:{minute:02}");
                let result = ex.start(&input);
                assert!(result.is_successful(), "{input} should parse");
                assert_eq!(result.format(), input);
            }
        }
    }

    #[test]
    fn every_out_of_range_clock_is_rejected() {
        let ex = extractor();
        for (hour, minute) in [(24, 0), (23, 60), (99, 99), (30, 15), (0, 75)] {
            let input = format!("{hour:02}:{minute:02}");
            assert_eq!(
                ex.start(&input).error_reason(),
                Some(ErrorReason::OutOfRange),
                "{input} should be out of range"
            );
        }
    }

    #[test]
    fn text_without_digits_or_keywords() {
        for input in ["hello world", "   ", "no time at all", "没有时间", "a.m. p.m."] {
            assert_eq!(
                reason_of(input),
                Some(ErrorReason::NoPatternMatched),
                "{input:?}"
            );
        }
    }

    #[test]
    fn repeated_calls_agree() {
        let ex = extractor();
        for input in ["11:35", "", "25:99", "明天下午3点", "tomorrow"] {
            assert_eq!(ex.start(input), ex.start(input));
        }
    }

    // ── Pattern coverage ──────────────────────────────────────

    #[test]
    fn clock_in_sentence() {
        assert_eq!(format_of("Meeting moved to 14:05, room B"), "14:05");
        assert_eq!(format_of("9:05"), "09:05");
        assert_eq!(format_of("11:35:20"), "11:35:20");
    }

    #[test]
    fn twelve_hour_clock() {
        assert_eq!(format_of("meet at 3:30 pm"), "15:30");
        assert_eq!(format_of("12:15am"), "00:15");
        assert_eq!(format_of("lunch at 12pm"), "12:00");
        assert_eq!(reason_of("13pm"), Some(ErrorReason::OutOfRange));
    }

    #[test]
    fn malformed_clock_is_not_reread_as_hour() {
        for input in ["3:5pm", "10:7 am", "123:45pm"] {
            let result = extractor().start(input);
            assert_eq!(result.error_reason(), Some(ErrorReason::NoPatternMatched), "{input:?}");
            assert_eq!(result.matched_text(), None);
        }
    }

    #[test]
    fn spaced_chinese_prefix_keeps_half_day() {
        assert_eq!(format_of("下午 3点"), "15:00");
        assert_eq!(format_of("今晚 8点"), "2026-02-20 20:00");
        assert_eq!(format_of("明天晚上 8点"), "2026-02-21 20:00");
    }

    #[test]
    fn moment_phrase_is_not_a_time() {
        assert_eq!(reason_of("一时间不知道"), Some(ErrorReason::NoPatternMatched));
    }

    #[test]
    fn tonight_reads_unmarked_hours_as_evening() {
        assert_eq!(format_of("tonight 8:00"), "2026-02-20 20:00");
        assert_eq!(format_of("今晚 8:00"), "2026-02-20 20:00");
        assert_eq!(format_of("tonight at 9pm"), "2026-02-20 21:00");
        assert_eq!(format_of("tonight 12:30am"), "2026-02-20 00:30");
        assert_eq!(format_of("today 8:00"), "2026-02-20 08:00");
    }

    #[test]
    fn iso_date_only() {
        let result = extractor().start("due 2024-03-05");
        assert_eq!(result.format(), "2024-03-05");
        assert_eq!(result.granularity(), Some(Granularity::Date));
    }

    #[test]
    fn iso_date_time() {
        assert_eq!(format_of("2024-03-05T11:35:20"), "2024-03-05 11:35:20");
        assert_eq!(format_of("2024/3/5 8:00"), "2024-03-05 08:00");
    }

    #[test]
    fn invalid_calendar_dates() {
        assert_eq!(reason_of("2024-13-05"), Some(ErrorReason::OutOfRange));
        assert_eq!(reason_of("2月30日"), Some(ErrorReason::OutOfRange));
        assert_eq!(reason_of("2024-02-30 10:00"), Some(ErrorReason::OutOfRange));
    }

    #[test]
    fn relative_days_combine_with_time() {
        let result = extractor().start("tomorrow at 11:35");
        assert_eq!(result.format(), "2026-02-21 11:35");
        assert_eq!(result.granularity(), Some(Granularity::DateTime));
        assert_eq!(result.matched_text(), Some("tomorrow at 11:35"));
        assert_eq!(format_of("yesterday"), "2026-02-19");
    }

    #[test]
    fn chinese_relative_day_and_hour() {
        assert_eq!(format_of("明天下午3点开会"), "2026-02-21 15:00");
        assert_eq!(format_of("后天早上八点半"), "2026-02-22 08:30");
        assert_eq!(format_of("今晚8点"), "2026-02-20 20:00");
    }

    #[test]
    fn chinese_month_day() {
        assert_eq!(format_of("3月5日下午三点半"), "2026-03-05 15:30");
        assert_eq!(format_of("2025年12月25日"), "2025-12-25");
    }

    #[test]
    fn chinese_day_defaults_to_current_month() {
        assert_eq!(format_of("5号"), "2026-02-05");
    }

    #[test]
    fn chinese_month_defaults_to_current_day() {
        assert_eq!(format_of("十月"), "2026-10-20");
    }

    #[test]
    fn missing_day_clamped_to_month_length() {
        let ex = TimeExtractor::with_clock(&ExtractorConfig::default(), clock_at(2026, 1, 31, 12, 0))
            .unwrap();
        assert_eq!(ex.start("2月 9点").format(), "2026-02-28 09:00");
    }

    #[test]
    fn date_outranks_position() {
        // The date fragment is combined with the time even when it appears later.
        assert_eq!(format_of("11:35 tomorrow"), "2026-02-21 11:35");
    }

    // ── Validity window ───────────────────────────────────────

    fn windowed(days: i64) -> TimeExtractor<FixedClock> {
        let config = ExtractorConfig::default().with_day_range(days);
        TimeExtractor::with_clock(&config, clock_at(2026, 2, 20, 9, 30)).unwrap()
    }

    #[test]
    fn inside_window_accepted() {
        let result = windowed(1).start("明天8点");
        assert!(result.is_successful());
        assert_eq!(result.format(), "2026-02-21 08:00");
    }

    #[test]
    fn past_window_rejected() {
        let result = windowed(1).start("后天");
        assert_eq!(result.error_reason(), Some(ErrorReason::OutsideWindow));
        assert_eq!(result.matched_text(), Some("后天"));
    }

    #[test]
    fn earlier_today_rejected() {
        assert_eq!(
            windowed(1).start("9:00").error_reason(),
            Some(ErrorReason::OutsideWindow)
        );
    }

    #[test]
    fn backwards_window() {
        let ex = windowed(-7);
        assert!(ex.start("yesterday 10:00").is_successful());
        assert_eq!(
            ex.start("tomorrow").error_reason(),
            Some(ErrorReason::OutsideWindow)
        );
    }

    #[test]
    fn out_of_range_reported_before_window() {
        assert_eq!(
            windowed(1).start("25:99").error_reason(),
            Some(ErrorReason::OutOfRange)
        );
    }

    #[test]
    fn invalid_config_rejected() {
        let config = ExtractorConfig {
            day_range: Some(1),
            end_limit: Some(clock_at(2026, 3, 1, 0, 0).0),
            ..ExtractorConfig::default()
        };
        assert!(TimeExtractor::with_clock(&config, clock_at(2026, 2, 20, 9, 30)).is_err());
    }

    // ── Display style ─────────────────────────────────────────

    #[test]
    fn month_day_clock_style() {
        let config = ExtractorConfig::default().with_display_style(DisplayStyle::MonthDayClock);
        let ex = TimeExtractor::with_clock(&config, clock_at(2026, 2, 20, 9, 30)).unwrap();
        assert_eq!(ex.display_style(), DisplayStyle::MonthDayClock);
        assert_eq!(ex.start("11:35").format(), "02月20日 11:35");
        assert_eq!(ex.start("3月5日下午3点").format(), "03月05日 15:00");
    }

    // ── Concurrency ───────────────────────────────────────────

    #[test]
    fn extractor_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TimeExtractor>();
        assert_send_sync::<TimeExtractor<FixedClock>>();
    }

    #[test]
    fn shared_across_threads() {
        let ex = extractor();
        let expected = ex.start("明天 11:35");
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| ex.start("明天 11:35")))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    // ── Helpers ───────────────────────────────────────────────

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2026, 2), Some(28));
        assert_eq!(days_in_month(2026, 12), Some(31));
        assert_eq!(days_in_month(2026, 13), None);
    }
}
