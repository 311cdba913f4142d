//! Ordered pattern table for date and time fragments.
//!
//! Scanning only recognizes structure and pulls out the numbers. Range checks
//! happen when the orchestrator turns fragments into chrono values, so a
//! fragment like `25:99` is still reported here.

use std::sync::LazyLock;

use regex::{Captures, Match, Regex};

use super::numerals::{parse_number, Meridiem, CHINESE_DIGITS};

/// Half-day prefixes. Longer keywords first so `早上` wins over `早`.
const MERIDIEM_PREFIX: &str = "(上午|下午|早上|晚上|中午|凌晨|早|晚)";

// ═══════════════════════════════════════════════════════════
// Fragment types
// ═══════════════════════════════════════════════════════════

/// Byte range of a fragment within the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Smallest span covering both.
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment<T> {
    pub value: T,
    pub span: Span,
    /// Name of the pattern that produced this fragment.
    pub pattern: &'static str,
}

/// Date part as written. Missing calendar fields are filled from the
/// reference date later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFragment {
    Calendar {
        year: Option<i32>,
        month: Option<u32>,
        day: Option<u32>,
    },
    Relative {
        days: i64,
        /// `tonight` / `今晚`: an unmarked hour is read as evening.
        evening: bool,
    },
}

impl DateFragment {
    /// Half-day a time without its own marker inherits from this date.
    pub fn implied_meridiem(&self) -> Option<Meridiem> {
        match self {
            Self::Relative { evening: true, .. } => Some(Meridiem::Afternoon),
            _ => None,
        }
    }
}

/// Time part as written, before meridiem adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockFragment {
    pub hour: u32,
    pub minute: u32,
    pub second: Option<u32>,
    pub meridiem: Option<Meridiem>,
}

type Scanner<T> = fn(&str) -> Option<Fragment<T>>;

/// Date patterns in priority order.
const DATE_PATTERNS: &[Scanner<DateFragment>] = &[scan_iso_date, scan_chinese_date, scan_relative_day];

/// Time patterns in priority order.
const TIME_PATTERNS: &[Scanner<ClockFragment>] = &[scan_clock, scan_bare_meridiem, scan_chinese_hour];

// ═══════════════════════════════════════════════════════════
// Regex table
// ═══════════════════════════════════════════════════════════

/// `2024-03-05`, `2024/3/5`, `2024.03.05`
static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)[-/.](\d+)[-/.](\d+)").expect("valid regex"));

/// `2024年3月5日`, `3月5日`, `十二月`, `5号`
static CHINESE_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let num = format!(r"(\d{{1,2}}|[{CHINESE_DIGITS}]{{1,3}})");
    Regex::new(&format!(r"(?:(\d{{4}})年)?(?:{num}月(?:{num}[日号])?|{num}[日号])"))
        .expect("valid regex")
});

static RELATIVE_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(day after tomorrow|day before yesterday|today|tonight|tomorrow|yesterday)\b|(大后天|大前天|后天|前天|明天|明日|今天|今日|今晚|昨天)",
    )
    .expect("valid regex")
});

/// `11:35`, `11:35:20`, `下午3:30`, `3:30 pm`
static CLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?:{MERIDIEM_PREFIX}\s*)?(\d+)[:：](\d+)(?:[:：](\d+))?(?:\s*([ap]\.?m)\b\.?)?"
    ))
    .expect("valid regex")
});

/// `9am`, `9 p.m.`
static BARE_MERIDIEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*([ap]\.?m)\b\.?").expect("valid regex"));

/// `3点`, `下午三点半`, `下午 3点`, `十点十五分`
static CHINESE_HOUR_RE: LazyLock<Regex> = LazyLock::new(|| {
    let num = format!(r"(\d{{1,2}}|[{CHINESE_DIGITS}]{{1,3}})");
    Regex::new(&format!(r"(?:{MERIDIEM_PREFIX}\s*)?{num}[点點](?:(半)|{num}分?)?"))
        .expect("valid regex")
});

// ═══════════════════════════════════════════════════════════
// Scanning
// ═══════════════════════════════════════════════════════════

/// Highest-priority date fragment in `text`.
pub fn find_date(text: &str) -> Option<Fragment<DateFragment>> {
    DATE_PATTERNS.iter().find_map(|scan| scan(text))
}

/// Highest-priority time fragment in `text`.
pub fn find_time(text: &str) -> Option<Fragment<ClockFragment>> {
    TIME_PATTERNS.iter().find_map(|scan| scan(text))
}

/// First match of `re` that `parse` accepts as structurally valid.
fn first_fragment<T>(
    re: &Regex,
    text: &str,
    pattern: &'static str,
    parse: impl Fn(&Captures<'_>) -> Option<T>,
) -> Option<Fragment<T>> {
    re.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let value = parse(&caps)?;
        Some(Fragment {
            value,
            span: Span {
                start: whole.start(),
                end: whole.end(),
            },
            pattern,
        })
    })
}

/// ASCII digit group with a length constraint.
fn digits(m: Option<Match<'_>>, min_len: usize, max_len: usize) -> Option<u32> {
    let m = m?;
    if !(min_len..=max_len).contains(&m.len()) {
        return None;
    }
    m.as_str().parse().ok()
}

/// `Some(None)` for an absent group, `None` for a group that is not a number.
fn optional_number(m: Option<Match<'_>>) -> Option<Option<u32>> {
    match m {
        None => Some(None),
        Some(m) => parse_number(m.as_str()).map(Some),
    }
}

fn meridiem(m: Option<Match<'_>>) -> Option<Meridiem> {
    m.and_then(|m| Meridiem::from_marker(m.as_str()))
}

fn scan_iso_date(text: &str) -> Option<Fragment<DateFragment>> {
    first_fragment(&ISO_DATE_RE, text, "iso_date", |caps| {
        let year = digits(caps.get(1), 4, 4)?;
        let month = digits(caps.get(2), 1, 2)?;
        let day = digits(caps.get(3), 1, 2)?;
        Some(DateFragment::Calendar {
            year: Some(i32::try_from(year).ok()?),
            month: Some(month),
            day: Some(day),
        })
    })
}

fn scan_chinese_date(text: &str) -> Option<Fragment<DateFragment>> {
    first_fragment(&CHINESE_DATE_RE, text, "chinese_date", |caps| {
        let year = match caps.get(1) {
            Some(m) => Some(m.as_str().parse::<i32>().ok()?),
            None => None,
        };
        let month = optional_number(caps.get(2))?;
        let day = optional_number(caps.get(3).or_else(|| caps.get(4)))?;
        Some(DateFragment::Calendar { year, month, day })
    })
}

fn scan_relative_day(text: &str) -> Option<Fragment<DateFragment>> {
    first_fragment(&RELATIVE_DAY_RE, text, "relative_day", |caps| {
        let keyword = caps.get(1).or_else(|| caps.get(2))?.as_str().to_lowercase();
        let evening = matches!(keyword.as_str(), "tonight" | "今晚");
        let days = match keyword.as_str() {
            "today" | "tonight" | "今天" | "今日" | "今晚" => 0,
            "tomorrow" | "明天" | "明日" => 1,
            "yesterday" | "昨天" => -1,
            "day after tomorrow" | "后天" => 2,
            "day before yesterday" | "前天" => -2,
            "大后天" => 3,
            "大前天" => -3,
            _ => return None,
        };
        Some(DateFragment::Relative { days, evening })
    })
}

fn scan_clock(text: &str) -> Option<Fragment<ClockFragment>> {
    first_fragment(&CLOCK_RE, text, "clock", |caps| {
        let hour = digits(caps.get(2), 1, 2)?;
        let minute = digits(caps.get(3), 2, 2)?;
        let second = match caps.get(4) {
            Some(m) => Some(digits(Some(m), 2, 2)?),
            None => None,
        };
        // An explicit am/pm suffix outranks a Chinese prefix.
        let marker = meridiem(caps.get(5)).or_else(|| meridiem(caps.get(1)));
        Some(ClockFragment {
            hour,
            minute,
            second,
            meridiem: marker,
        })
    })
}

fn scan_bare_meridiem(text: &str) -> Option<Fragment<ClockFragment>> {
    first_fragment(&BARE_MERIDIEM_RE, text, "bare_meridiem", |caps| {
        // The tail of a rejected clock like `3:5pm` is not an hour.
        let start = caps.get(0)?.start();
        if text[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_digit() || c == ':' || c == '：')
        {
            return None;
        }
        Some(ClockFragment {
            hour: digits(caps.get(1), 1, 2)?,
            minute: 0,
            second: None,
            meridiem: Some(meridiem(caps.get(2))?),
        })
    })
}

fn scan_chinese_hour(text: &str) -> Option<Fragment<ClockFragment>> {
    first_fragment(&CHINESE_HOUR_RE, text, "chinese_hour", |caps| {
        // "一点点" means "a little", not one o'clock.
        let end = caps.get(0)?.end();
        if text[end..].starts_with('点') {
            return None;
        }
        let hour = parse_number(caps.get(2)?.as_str())?;
        let minute = if caps.get(3).is_some() {
            30
        } else {
            optional_number(caps.get(4))?.unwrap_or(0)
        };
        Some(ClockFragment {
            hour,
            minute,
            second: None,
            meridiem: meridiem(caps.get(1)),
        })
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
