use std::sync::LazyLock;

use chrono::{Datelike, Days, Local, NaiveDate};
use regex::Regex;

use super::validation::is_valid_date;

static HHMM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").unwrap());
static MERIDIEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})(?::(\d{2}))?\s*(a\.?m\.?|p\.?m\.?)$").unwrap()
});

const MONTHS: &str = r"january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";

static DAY_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({MONTHS})\b"
    ))
    .unwrap()
});
static MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b({MONTHS})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b"
    ))
    .unwrap()
});
static TODAY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\btoday\b").unwrap());
static TOMORROW_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\btomorrow\b").unwrap());

// Converts a 12-hour reading to 24-hour. `pm` adds 12 to hours 1-11 and
// `12am` becomes 0; without a marker the hour is taken as 24-hour.
pub(crate) fn clock_24h(hour: u32, minute: u32, meridiem: Option<&str>) -> Option<(u32, u32)> {
    if minute > 59 {
        return None;
    }
    let hour = match meridiem.map(|m| m.starts_with('p')) {
        Some(is_pm) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            match (is_pm, hour) {
                (true, 12) => 12,
                (true, h) => h + 12,
                (false, 12) => 0,
                (false, h) => h,
            }
        }
        None if hour <= 23 => hour,
        None => return None,
    };
    Some((hour, minute))
}

pub(crate) fn format_clock(hour: u32, minute: u32) -> String {
    format!("{hour:02}:{minute:02}")
}

pub fn normalize_time(input: &str) -> String {
    let t = input.trim().to_lowercase();

    if let Some(caps) = HHMM_RE.captures(&t) {
        let hour: u32 = caps[1].parse().unwrap_or(99);
        let minute: u32 = caps[2].parse().unwrap_or(99);
        if let Some((h, m)) = clock_24h(hour, minute, None) {
            return format_clock(h, m);
        }
        return input.to_string();
    }

    if let Some(caps) = MERIDIEM_RE.captures(&t) {
        let hour: u32 = caps[1].parse().unwrap_or(99);
        let minute: u32 = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        if let Some((h, m)) = clock_24h(hour, minute, Some(&caps[3])) {
            return format_clock(h, m);
        }
    }

    input.to_string()
}

pub fn resolve_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if TODAY_RE.is_match(text) {
        return Some(today);
    }
    if TOMORROW_RE.is_match(text) {
        return today.checked_add_days(Days::new(1));
    }

    let (day, month) = if let Some(caps) = DAY_MONTH_RE.captures(text) {
        (caps[1].parse::<u32>().ok()?, month_number(&caps[2])?)
    } else if let Some(caps) = MONTH_DAY_RE.captures(text) {
        (caps[2].parse::<u32>().ok()?, month_number(&caps[1])?)
    } else {
        return None;
    };

    let candidate = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if candidate < today {
        return NaiveDate::from_ymd_opt(today.year() + 1, month, day);
    }
    Some(candidate)
}

pub fn normalize_date_at(input: &str, today: NaiveDate) -> String {
    let trimmed = input.trim();
    if is_valid_date(trimmed) {
        return trimmed.to_string();
    }
    match resolve_date(trimmed, today) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => input.to_string(),
    }
}

pub fn normalize_date(input: &str) -> String {
    normalize_date_at(input, Local::now().date_naive())
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let month = match lower.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
