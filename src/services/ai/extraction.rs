use std::time::Duration;

use chrono::{Local, NaiveDate};

use crate::models::{ConversationState, Draft, ExtractedFields, Field, Intent, ModelExtraction};
use crate::services::ai::{LlmProvider, Message};
use crate::services::normalize::{normalize_date_at, normalize_time};
use crate::services::policy::has_required;
use crate::services::validation::{is_valid_date, is_valid_time};

const SYSTEM_PROMPT: &str = r#"You are a friendly assistant that helps patients book doctor appointments.
Your goal is to collect: doctor, date, time, patient name, and reason for the appointment.

Rules:
1. Extract information from the current message and combine it with the context you ALREADY have.
2. Patient names appear as "Kevin Leitich, i want to see...", "my name is X", "I'm X", or two capitalized words at the start of a message.
3. Doctor names appear as "Dr. Kim", "doctor Kim", "with Dr. Smith", "i want to see Dr. Angela". Always prefix them with "Dr. ".
4. Dates appear as "4 nov", "november 4th", "tomorrow". Convert them to YYYY-MM-DD.
5. Times appear as "11am", "2pm", "14:30". Convert them to 24-hour HH:MM:
   - "4pm" -> "16:00"
   - "11am" -> "11:00"
   - "2:30pm" -> "14:30"
   - "12pm" -> "12:00"
   - "12am" -> "00:00"
6. Reasons appear as "for checkup", "because of headache", "I need a checkup".

Return ONLY valid JSON (no markdown, no explanation) with this exact structure:
{
  "intent": "book|chat",
  "doctor": "Dr. Kim",
  "date": "2025-11-04",
  "time": "11:00",
  "patient_name": "John Doe",
  "reason": "checkup",
  "reply": "Short friendly reply to the patient"
}

Use "book" when the patient is trying to book and you found any of the fields, otherwise "chat".
Use an empty string for any field you could not find.
"#;

pub fn build_prompt(conv: &ConversationState) -> String {
    let mut prompt = SYSTEM_PROMPT.to_string();

    let known: Vec<String> = Field::ALL
        .iter()
        .filter(|f| !conv.draft.get(**f).is_empty())
        .map(|f| format!("- {} = {}", f.label(), conv.draft.get(*f)))
        .collect();

    if !known.is_empty() {
        prompt.push_str("\nYou ALREADY have:\n");
        prompt.push_str(&known.join("\n"));
        prompt.push_str(
            "\nNEVER ask for anything listed above. Only ask for what is still missing.\n",
        );
        if !conv.last_user_message.is_empty() {
            prompt.push_str(&format!(
                "Previous user message: {}\n",
                conv.last_user_message
            ));
        }
    }

    prompt
}

pub async fn extract_with_model(
    llm: &dyn LlmProvider,
    message: &str,
    conv: &ConversationState,
    timeout: Duration,
) -> ModelExtraction {
    let system = build_prompt(conv);
    let messages = [Message {
        role: "user".to_string(),
        content: message.to_string(),
    }];

    match tokio::time::timeout(timeout, llm.chat(&system, &messages)).await {
        Ok(Ok(raw)) => parse_extraction(&raw),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "model extraction failed, falling back to local parsing");
            ModelExtraction::NoResult { reply: None }
        }
        Err(_) => {
            tracing::warn!(
                timeout_secs = timeout.as_secs_f64(),
                "model extraction timed out, falling back to local parsing"
            );
            ModelExtraction::NoResult { reply: None }
        }
    }
}

pub fn parse_extraction(raw: &str) -> ModelExtraction {
    parse_extraction_at(raw, Local::now().date_naive())
}

// Tolerant scan of model output: decodes the span from the first `{` to
// the last `}`. Text without braces is kept as a conversational reply.
pub fn parse_extraction_at(raw: &str, today: NaiveDate) -> ModelExtraction {
    let raw = raw.trim();

    let span = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if end > start => &raw[start..=end],
        (None, None) => {
            let reply = Some(raw.to_string()).filter(|r| !r.is_empty());
            return ModelExtraction::NoResult { reply };
        }
        _ => {
            tracing::warn!("model output has no complete JSON object, ignoring");
            return ModelExtraction::NoResult { reply: None };
        }
    };

    let decoded: ExtractedFields = match serde_json::from_str(span) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::warn!(error = %e, "failed to decode model JSON, ignoring");
            return ModelExtraction::NoResult { reply: None };
        }
    };

    let reply = decoded
        .reply
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string);

    if decoded.intent != Intent::Book {
        return ModelExtraction::NoResult { reply };
    }

    let fields = candidate_fields(&decoded, today);
    if has_required(&fields) {
        ModelExtraction::BookIntent { fields, reply }
    } else {
        ModelExtraction::PartialFields { fields, reply }
    }
}

fn candidate_fields(decoded: &ExtractedFields, today: NaiveDate) -> Draft {
    let text = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or_default().to_string();

    let date = text(&decoded.date);
    let date = if date.is_empty() {
        date
    } else {
        normalize_date_at(&date, today)
    };
    let time = normalize_time(&text(&decoded.time));

    Draft {
        patient_name: text(&decoded.patient_name),
        doctor: text(&decoded.doctor),
        date: if is_valid_date(&date) { date } else { String::new() },
        time: if is_valid_time(&time) { time } else { String::new() },
        reason: text(&decoded.reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()
    }

    #[test]
    fn test_complete_book_intent() {
        let raw = r#"{"intent":"book","doctor":"Dr. Kim","date":"2025-11-04","time":"11:00","patient_name":"John Doe","reason":"checkup","reply":"Booked!"}"#;
        match parse_extraction_at(raw, today()) {
            ModelExtraction::BookIntent { fields, reply } => {
                assert_eq!(fields.doctor, "Dr. Kim");
                assert_eq!(fields.date, "2025-11-04");
                assert_eq!(fields.time, "11:00");
                assert_eq!(fields.patient_name, "John Doe");
                assert_eq!(fields.reason, "checkup");
                assert_eq!(reply.as_deref(), Some("Booked!"));
            }
            other => panic!("expected book intent, got {other:?}"),
        }
    }

    #[test]
    fn test_noisy_wrapper_and_time_renormalized() {
        let raw = "Sure! Here you go:\n```json\n{\"intent\":\"book\",\"doctor\":\" Dr. Kim \",\"date\":\"2025-11-04\",\"time\":\"4pm\",\"patient_name\":\"John Doe\",\"reason\":\"\"}\n```";
        match parse_extraction_at(raw, today()) {
            ModelExtraction::BookIntent { fields, reply } => {
                assert_eq!(fields.doctor, "Dr. Kim");
                assert_eq!(fields.time, "16:00");
                assert_eq!(reply, None);
            }
            other => panic!("expected book intent, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_book_intent() {
        let raw = r#"{"intent":"book","doctor":"Dr. Kim","date":"tomorrow","time":"","patient_name":"","reason":""}"#;
        match parse_extraction_at(raw, today()) {
            ModelExtraction::PartialFields { fields, .. } => {
                assert_eq!(fields.doctor, "Dr. Kim");
                assert_eq!(fields.date, "2025-11-04");
                assert_eq!(fields.time, "");
            }
            other => panic!("expected partial fields, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_values_dropped() {
        let raw = r#"{"intent":"book","doctor":"Dr. Kim","date":"2025-02-30","time":"25:00","patient_name":"John Doe"}"#;
        match parse_extraction_at(raw, today()) {
            ModelExtraction::PartialFields { fields, .. } => {
                assert_eq!(fields.date, "");
                assert_eq!(fields.time, "");
            }
            other => panic!("expected partial fields, got {other:?}"),
        }
    }

    #[test]
    fn test_null_fields_accepted() {
        let raw = r#"{"intent":"book","doctor":null,"date":null,"time":null,"patient_name":"Jane Roe","reason":null}"#;
        match parse_extraction_at(raw, today()) {
            ModelExtraction::PartialFields { fields, .. } => {
                assert_eq!(fields.patient_name, "Jane Roe");
                assert_eq!(fields.doctor, "");
            }
            other => panic!("expected partial fields, got {other:?}"),
        }
    }

    #[test]
    fn test_chat_intent_keeps_reply() {
        let raw = r#"{"intent":"chat","reply":"Hello! Which doctor would you like to see?"}"#;
        assert_eq!(
            parse_extraction_at(raw, today()),
            ModelExtraction::NoResult {
                reply: Some("Hello! Which doctor would you like to see?".to_string())
            }
        );
    }

    #[test]
    fn test_unknown_intent_is_no_result() {
        let raw = r#"{"intent":"cancel","doctor":"Dr. Kim"}"#;
        assert!(matches!(
            parse_extraction_at(raw, today()),
            ModelExtraction::NoResult { .. }
        ));
    }

    #[test]
    fn test_malformed_json_is_no_result() {
        let raw = r#"{"intent":"book","doctor":"Dr. Kim""#;
        assert_eq!(
            parse_extraction_at(raw, today()),
            ModelExtraction::NoResult { reply: None }
        );
        let raw = r#"{"intent": "book", oops}"#;
        assert_eq!(
            parse_extraction_at(raw, today()),
            ModelExtraction::NoResult { reply: None }
        );
    }

    #[test]
    fn test_truncated_json_is_never_a_reply() {
        let raw = r#"{"intent":"chat","doctor":"","date":"","reply":"Hello! Which doc"#;
        assert_eq!(
            parse_extraction_at(raw, today()),
            ModelExtraction::NoResult { reply: None }
        );
        assert_eq!(
            parse_extraction_at("oops } stray", today()),
            ModelExtraction::NoResult { reply: None }
        );
    }

    #[test]
    fn test_plain_text_becomes_reply() {
        let raw = "  Which doctor would you like to see?  ";
        assert_eq!(
            parse_extraction_at(raw, today()),
            ModelExtraction::NoResult {
                reply: Some("Which doctor would you like to see?".to_string())
            }
        );
        assert_eq!(
            parse_extraction_at("", today()),
            ModelExtraction::NoResult { reply: None }
        );
    }

    #[test]
    fn test_prompt_without_context() {
        let prompt = build_prompt(&ConversationState::default());
        assert!(prompt.contains("\"patient_name\""));
        assert!(!prompt.contains("You ALREADY have:"));
    }

    #[test]
    fn test_prompt_lists_known_fields() {
        let mut conv = ConversationState::default();
        conv.draft.doctor = "Dr. Kim".to_string();
        conv.draft.date = "2025-11-04".to_string();
        conv.last_user_message = "Dr. Kim on 4 nov".to_string();
        let prompt = build_prompt(&conv);
        assert!(prompt.contains("You ALREADY have:"));
        assert!(prompt.contains("- doctor = Dr. Kim"));
        assert!(prompt.contains("- date = 2025-11-04"));
        assert!(!prompt.contains("- time ="));
        assert!(prompt.contains("Previous user message: Dr. Kim on 4 nov"));
    }
}
