use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use regex::Regex;

use crate::models::{Draft, Field, LocalExtraction};
use crate::services::normalize::{clock_24h, format_clock, resolve_date};
use crate::services::validation::{is_valid_date, is_valid_time};

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(at\s+)?(\d{1,2})(?::(\d{2}))?(?:\s*(a\.?m\.?|p\.?m\.?))?").unwrap()
});
static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").unwrap());
static DOCTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:dr\.?|doctor)\s+([a-z]+)").unwrap());
static SEE_DOCTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:\b(?:want|like|need)\s+to\s+see)\s+([A-Z][a-zA-Z]+)").unwrap()
});
static LEADING_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z][a-zA-Z]+(?:\s+[A-Z][a-zA-Z]+)?)\s*,").unwrap());
static INTRODUCED_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:\bmy\s+name\s+is|\bi'm|\bi\s+am|\bthis\s+is)\s+([A-Z][a-zA-Z]+(?:\s+[A-Z][a-zA-Z]+)?)")
        .unwrap()
});
static REASON_PHRASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:for|because\s+of|reason\s+is|need)\s+(?:(?:a|an|the|my)\s+)?([a-z]+(?:-[a-z]+)?(?:\s+[a-z]+)?)")
        .unwrap()
});
static REASON_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(dentist|dental|checkup|check-up|consultation|examination|exam|headache|pain|injury|follow-up|followup|surgery|treatment|therapy|routine|annual|physical|screening|vaccination)\b")
        .unwrap()
});

const NAME_STOPWORDS: &[&str] = &[
    "doctor", "dr", "want", "see", "book", "appointment", "hi", "hello", "hey", "yes", "no",
    "ok", "okay", "thanks", "thank", "please", "today", "tomorrow", "for", "at", "on", "to",
    "and", "with", "visit", "checkup", "consultation", "dentist", "examination", "can",
    "could", "who", "sure", "great", "perfect", "fine", "good", "alright", "yeah", "yep",
    "well", "cool", "right", "also", "actually", "so", "oh", "in", "is", "a", "an", "the",
    "of", "me", "my", "you", "available", "there", "here", "free",
];

const REASON_STOPWORDS: &[&str] = &[
    "me", "you", "him", "her", "us", "them", "it", "to", "an", "appointment", "doctor", "dr",
    "today", "tomorrow", "at", "on", "with", "in", "by", "and", "please", "noon", "morning",
    "afternoon", "evening", "january", "february", "march", "april", "may", "june", "july",
    "august", "september", "october", "november", "december", "jan", "feb", "mar", "apr",
    "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec", "next", "this", "later", "that",
    "some", "week", "weekend", "month",
];

pub struct ExtractContext<'a> {
    pub message: &'a str,
    pub lower: String,
    pub prior: &'a Draft,
    pub today: NaiveDate,
}

type Recognizer = fn(&ExtractContext) -> Option<String>;

// Recognizers run independently; each yields at most one candidate.
const RECOGNIZERS: [(Field, Recognizer); 5] = [
    (Field::Time, recognize_time),
    (Field::Date, recognize_date),
    (Field::Doctor, recognize_doctor),
    (Field::PatientName, recognize_patient_name),
    (Field::Reason, recognize_reason),
];

pub fn extract_local(message: &str, prior: &Draft) -> LocalExtraction {
    extract_local_at(message, prior, Local::now().date_naive())
}

pub fn extract_local_at(message: &str, prior: &Draft, today: NaiveDate) -> LocalExtraction {
    let ctx = ExtractContext {
        message,
        lower: message.to_lowercase(),
        prior,
        today,
    };

    let mut fields = Draft::default();
    for (field, recognize) in RECOGNIZERS {
        let Some(candidate) = recognize(&ctx) else {
            continue;
        };
        let candidate = candidate.trim();
        let accepted = match field {
            Field::Date => is_valid_date(candidate),
            Field::Time => is_valid_time(candidate),
            _ => !candidate.is_empty(),
        };
        if accepted {
            fields.set(field, candidate.to_string());
        }
    }

    let confident = is_valid_date(&fields.date) && is_valid_time(&fields.time);
    LocalExtraction { fields, confident }
}

fn recognize_time(ctx: &ExtractContext) -> Option<String> {
    for caps in TIME_RE.captures_iter(&ctx.lower) {
        let has_at = caps.get(1).is_some();
        let minutes = caps.get(3);
        let meridiem = caps.get(4).map(|m| m.as_str());

        // "4th", "30th", "2025", "4 amazing" are not times
        let end = caps.get(0).map_or(0, |m| m.end());
        if ctx.lower[end..].chars().next().is_some_and(|c| c.is_alphanumeric()) {
            continue;
        }
        if meridiem.is_none() && minutes.is_none() && !has_at {
            continue;
        }

        let hour: u32 = caps[2].parse().ok()?;
        let minute: u32 = minutes.and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        if let Some((h, m)) = clock_24h(hour, minute, meridiem) {
            return Some(format_clock(h, m));
        }
    }
    None
}

fn recognize_date(ctx: &ExtractContext) -> Option<String> {
    if let Some(date) = resolve_date(&ctx.lower, ctx.today) {
        return Some(date.format("%Y-%m-%d").to_string());
    }
    ISO_DATE_RE
        .captures(&ctx.lower)
        .map(|caps| caps[1].to_string())
}

fn recognize_doctor(ctx: &ExtractContext) -> Option<String> {
    let name = DOCTOR_RE
        .captures_iter(ctx.message)
        .map(|caps| caps[1].to_string())
        .find(|word| !is_stopword(word, NAME_STOPWORDS))
        .or_else(|| {
            SEE_DOCTOR_RE
                .captures(ctx.message)
                .map(|caps| caps[1].to_string())
                .filter(|word| !is_stopword(word, NAME_STOPWORDS))
        })?;

    Some(format!("Dr. {}", title_case(&name)))
}

fn recognize_patient_name(ctx: &ExtractContext) -> Option<String> {
    let message = ctx.message.trim();

    if let Some(caps) = LEADING_NAME_RE.captures(message) {
        let name = &caps[1];
        if !name.split_whitespace().any(|w| is_stopword(w, NAME_STOPWORDS)) {
            return Some(name.to_string());
        }
    }

    if let Some(caps) = INTRODUCED_NAME_RE.captures(message) {
        let name = caps[1]
            .split_whitespace()
            .take_while(|w| !is_stopword(w, NAME_STOPWORDS))
            .collect::<Vec<_>>()
            .join(" ");
        if !name.is_empty() {
            return Some(name);
        }
    }

    // A bare "John Doe" is only read as a name once the doctor is known.
    if !ctx.prior.doctor.is_empty() && ctx.prior.patient_name.is_empty() {
        let words: Vec<&str> = message
            .split_whitespace()
            .map(|w| w.trim_end_matches(|c: char| c == '.' || c == '!'))
            .collect();
        if (2..=3).contains(&words.len()) {
            let (first, second) = (words[0], words[1]);
            if looks_like_name_word(first)
                && looks_like_name_word(second)
                && !is_stopword(first, NAME_STOPWORDS)
                && !is_stopword(second, NAME_STOPWORDS)
            {
                return Some(format!("{first} {second}"));
            }
        }
    }

    None
}

fn recognize_reason(ctx: &ExtractContext) -> Option<String> {
    for caps in REASON_PHRASE_RE.captures_iter(&ctx.lower) {
        let mut words: Vec<&str> = caps[1].split_whitespace().collect();
        if words.first().map_or(true, |w| is_stopword(w, REASON_STOPWORDS)) {
            continue;
        }
        while words.len() > 1 && words.last().is_some_and(|w| is_stopword(w, REASON_STOPWORDS)) {
            words.pop();
        }
        return Some(words.join(" "));
    }

    REASON_KEYWORD_RE
        .captures(&ctx.lower)
        .map(|caps| caps[1].to_string())
}

fn looks_like_name_word(word: &str) -> bool {
    word.len() > 1
        && word.chars().all(|c| c.is_ascii_alphabetic())
        && word.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

fn is_stopword(word: &str, list: &[&str]) -> bool {
    list.iter().any(|s| s.eq_ignore_ascii_case(word))
}

fn title_case(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()
    }

    fn extract(message: &str) -> LocalExtraction {
        extract_local_at(message, &Draft::default(), today())
    }

    #[test]
    fn test_full_booking_sentence() {
        let result = extract("Book me with Dr. Kim tomorrow at 4pm");
        assert_eq!(result.fields.doctor, "Dr. Kim");
        assert_eq!(result.fields.date, "2025-11-04");
        assert_eq!(result.fields.time, "16:00");
        assert_eq!(result.fields.patient_name, "");
        assert_eq!(result.fields.reason, "");
        assert!(result.confident);
    }

    #[test]
    fn test_month_name_and_doctor_word() {
        let result = extract("book me for 11am on 30th october with doctor mercy");
        assert_eq!(result.fields.time, "11:00");
        assert_eq!(result.fields.date, "2026-10-30");
        assert_eq!(result.fields.doctor, "Dr. Mercy");
        assert!(result.confident);
    }

    #[test]
    fn test_24_hour_time() {
        let result = extract("tomorrow at 14:30 with doctor Kim");
        assert_eq!(result.fields.time, "14:30");
        assert_eq!(result.fields.date, "2025-11-04");
    }

    #[test]
    fn test_day_numbers_are_not_times() {
        let result = extract("4 nov with Dr Lee");
        assert_eq!(result.fields.time, "");
        assert_eq!(result.fields.date, "2025-11-04");
        assert!(!result.confident);
    }

    #[test]
    fn test_partial_result_not_confident() {
        let result = extract("I want to see Wangechi");
        assert_eq!(result.fields.doctor, "Dr. Wangechi");
        assert!(!result.confident);
    }

    #[test]
    fn test_name_before_comma() {
        let result = extract("Kevin Leitich, i want to see Dr. Angela");
        assert_eq!(result.fields.patient_name, "Kevin Leitich");
        assert_eq!(result.fields.doctor, "Dr. Angela");
    }

    #[test]
    fn test_greeting_before_comma_is_not_a_name() {
        let result = extract("Hello, I need a checkup");
        assert_eq!(result.fields.patient_name, "");
        assert_eq!(result.fields.reason, "checkup");
    }

    #[test]
    fn test_interjection_before_comma_is_not_a_name() {
        let result = extract("Sure, tomorrow at 4pm works");
        assert_eq!(result.fields.patient_name, "");
        assert_eq!(result.fields.time, "16:00");
        assert_eq!(extract("Great, thanks").fields.patient_name, "");
    }

    #[test]
    fn test_doctor_word_before_function_word() {
        let result = extract("Is the doctor in today?");
        assert_eq!(result.fields.doctor, "");
        assert_eq!(result.fields.date, "2025-11-03");
    }

    #[test]
    fn test_reason_phrase_rejects_relative_time() {
        let result = extract("Book me for next week with Dr. Kim");
        assert_eq!(result.fields.reason, "");
        assert_eq!(result.fields.doctor, "Dr. Kim");
        assert_eq!(extract("for this afternoon please").fields.reason, "");
    }

    #[test]
    fn test_introduced_name() {
        assert_eq!(extract("Hi, my name is John Doe").fields.patient_name, "John Doe");
        assert_eq!(extract("i'm Alex and I need a dentist").fields.patient_name, "Alex");
        assert_eq!(extract("I am here").fields.patient_name, "");
    }

    #[test]
    fn test_bare_name_needs_known_doctor() {
        assert_eq!(extract("John Doe").fields.patient_name, "");

        let prior = Draft {
            doctor: "Dr. Kim".to_string(),
            ..Draft::default()
        };
        let result = extract_local_at("John Doe", &prior, today());
        assert_eq!(result.fields.patient_name, "John Doe");

        let result = extract_local_at("Book Appointment", &prior, today());
        assert_eq!(result.fields.patient_name, "");
    }

    #[test]
    fn test_bare_name_not_taken_when_name_known() {
        let prior = Draft {
            doctor: "Dr. Kim".to_string(),
            patient_name: "Jane Roe".to_string(),
            ..Draft::default()
        };
        let result = extract_local_at("John Doe", &prior, today());
        assert_eq!(result.fields.patient_name, "");
    }

    #[test]
    fn test_reason_phrase() {
        assert_eq!(extract("it's because of headache").fields.reason, "headache");
        assert_eq!(extract("I need a follow-up visit").fields.reason, "follow-up visit");
        assert_eq!(extract("the reason is back pain").fields.reason, "back pain");
    }

    #[test]
    fn test_reason_phrase_skips_dates_and_trailing_words() {
        assert_eq!(extract("for tomorrow please").fields.reason, "");
        assert_eq!(extract("for checkup at 4pm").fields.reason, "checkup");
        assert_eq!(
            extract("need an appointment for my headache").fields.reason,
            "headache"
        );
    }

    #[test]
    fn test_reason_keyword() {
        assert_eq!(extract("checkup").fields.reason, "checkup");
        assert_eq!(extract("Routine stuff").fields.reason, "routine");
    }

    #[test]
    fn test_iso_date_in_text() {
        let result = extract("Dr. Kim 2025-11-20 09:30");
        assert_eq!(result.fields.date, "2025-11-20");
        assert_eq!(result.fields.time, "09:30");
    }

    #[test]
    fn test_invalid_candidates_dropped() {
        let result = extract("feb 30 at 25:00");
        assert_eq!(result.fields.date, "");
        assert_eq!(result.fields.time, "");
    }

    #[test]
    fn test_nothing_found() {
        let result = extract("hello there");
        assert!(result.fields.is_empty());
        assert!(!result.confident);
    }
}
