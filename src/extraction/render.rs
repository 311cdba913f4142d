//! Display rendering for extracted values.

use chrono::NaiveDate;

use super::types::TemporalValue;
use crate::extractor_config::DisplayStyle;

const TIME_FMT: &str = "%H:%M";
const TIME_SECONDS_FMT: &str = "%H:%M:%S";
const DATE_FMT: &str = "%Y-%m-%d";
const MONTH_DAY_CLOCK_FMT: &str = "%m月%d日 %H:%M";

/// Render `value` for display. `reference` anchors time-only values for
/// styles that show a date.
pub fn render(value: &TemporalValue, style: DisplayStyle, reference: NaiveDate) -> String {
    match style {
        DisplayStyle::Canonical => render_canonical(value),
        DisplayStyle::MonthDayClock => value
            .resolve(reference)
            .format(MONTH_DAY_CLOCK_FMT)
            .to_string(),
    }
}

fn render_canonical(value: &TemporalValue) -> String {
    match value {
        TemporalValue::Time { time, with_seconds } => {
            time.format(time_fmt(*with_seconds)).to_string()
        }
        TemporalValue::Date { date } => date.format(DATE_FMT).to_string(),
        TemporalValue::DateTime {
            datetime,
            with_seconds,
        } => format!(
            "{} {}",
            datetime.format(DATE_FMT),
            datetime.format(time_fmt(*with_seconds))
        ),
    }
}

fn time_fmt(with_seconds: bool) -> &'static str {
    if with_seconds {
        TIME_SECONDS_FMT
    } else {
        TIME_FMT
    }
}
