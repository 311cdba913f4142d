//! Number and half-day keyword handling for Chinese and English phrases.
//!
//! Chinese numerals are accepted up to two places (`三`, `十二`, `二十五`,
//! `三十一`), which covers every month, day, hour and minute value.

/// Character class for Chinese numerals, shared with the regex table.
pub(crate) const CHINESE_DIGITS: &str = "零〇一二两三四五六七八九十";

/// Half-day keyword that shifts or pins the hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    /// English `am`: 1-12, with 12 meaning midnight.
    Am,
    /// English `pm`: 1-12, with 12 meaning noon.
    Pm,
    /// 上午, 早上, 早
    Morning,
    /// 凌晨: small hours, 12 means midnight.
    EarlyMorning,
    /// 下午, 晚上, 晚, 中午
    Afternoon,
}

impl Meridiem {
    /// Map a matched keyword (`下午`, `PM`, `p.m.`) to its meridiem.
    pub fn from_marker(marker: &str) -> Option<Self> {
        let normalized: String = marker
            .chars()
            .filter(|c| *c != '.' && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "am" => Some(Self::Am),
            "pm" => Some(Self::Pm),
            "上午" | "早上" | "早" => Some(Self::Morning),
            "凌晨" => Some(Self::EarlyMorning),
            "下午" | "晚上" | "晚" | "中午" => Some(Self::Afternoon),
            _ => None,
        }
    }

    /// Convert a written hour to a 24-hour value.
    /// Returns `None` when the hour is not valid for a 12-hour marker.
    pub fn apply(self, hour: u32) -> Option<u32> {
        match self {
            Self::Am => match hour {
                12 => Some(0),
                1..=11 => Some(hour),
                _ => None,
            },
            Self::Pm => match hour {
                12 => Some(12),
                1..=11 => Some(hour + 12),
                _ => None,
            },
            Self::Morning => Some(hour),
            Self::EarlyMorning => Some(if hour == 12 { 0 } else { hour }),
            Self::Afternoon => Some(if hour < 12 { hour + 12 } else { hour }),
        }
    }
}

fn chinese_digit(c: char) -> Option<u32> {
    let value = match c {
        '零' | '〇' => 0,
        '一' => 1,
        '二' | '两' => 2,
        '三' => 3,
        '四' => 4,
        '五' => 5,
        '六' => 6,
        '七' => 7,
        '八' => 8,
        '九' => 9,
        _ => return None,
    };
    Some(value)
}

/// Parse a Chinese numeral between 0 and 99.
pub fn parse_chinese_numeral(text: &str) -> Option<u32> {
    let chars: Vec<char> = text.chars().collect();
    match chars.as_slice() {
        ['十'] => Some(10),
        [single] => chinese_digit(*single),
        ['十', ones] => Some(10 + chinese_digit(*ones)?),
        [tens, '十'] => Some(chinese_digit(*tens)? * 10),
        [tens, '十', ones] => Some(chinese_digit(*tens)? * 10 + chinese_digit(*ones)?),
        _ => None,
    }
}

/// Parse either ASCII digits or a Chinese numeral.
pub fn parse_number(text: &str) -> Option<u32> {
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse().ok();
    }
    parse_chinese_numeral(text)
}
