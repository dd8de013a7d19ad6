use crate::models::{DialogueStage, Draft, Field};
use crate::services::validation::{is_valid_date, is_valid_time};

pub const DEFAULT_REASON: &str = "general consultation";

const ACKNOWLEDGEMENTS: &[&str] = &[
    "yes", "no", "ok", "okay", "sure", "none", "nothing", "skip", "nope", "n/a", "na",
];

const REQUIRED: [Field; 4] = [Field::Doctor, Field::Date, Field::Time, Field::PatientName];

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Ask { field: Field, prompt: String },
    Complete { draft: Draft },
}

impl Decision {
    pub fn stage(&self) -> DialogueStage {
        match self {
            Decision::Ask {
                field: Field::Reason,
                ..
            } => DialogueStage::AwaitingReason,
            Decision::Ask { .. } => DialogueStage::Collecting,
            Decision::Complete { .. } => DialogueStage::Complete,
        }
    }
}

pub fn is_satisfied(draft: &Draft, field: Field) -> bool {
    let value = draft.get(field);
    match field {
        Field::Date => is_valid_date(value),
        Field::Time => is_valid_time(value),
        _ => !value.trim().is_empty(),
    }
}

// First unsatisfied field in Doctor > Date > Time > PatientName > Reason order.
pub fn next_missing(draft: &Draft) -> Option<Field> {
    Field::ALL.into_iter().find(|f| !is_satisfied(draft, *f))
}

pub fn has_required(draft: &Draft) -> bool {
    REQUIRED.iter().all(|f| is_satisfied(draft, *f))
}

pub fn evaluate(draft: &Draft, previous: DialogueStage, message: &str, found: &Draft) -> Decision {
    match next_missing(draft) {
        None => Decision::Complete {
            draft: draft.clone(),
        },
        Some(Field::Reason) if previous == DialogueStage::AwaitingReason => {
            let mut draft = draft.clone();
            draft.reason = if found.is_empty() {
                reason_from_reply(message)
            } else {
                // the reply changed other details instead of naming a reason
                DEFAULT_REASON.to_string()
            };
            Decision::Complete { draft }
        }
        Some(field) => Decision::Ask {
            field,
            prompt: question_for(field, draft),
        },
    }
}

fn reason_from_reply(message: &str) -> String {
    let words: Vec<&str> = message.split_whitespace().collect();
    let first = words
        .first()
        .map(|w| w.trim_matches(|c: char| c.is_ascii_punctuation() && c != '/').to_lowercase())
        .unwrap_or_default();

    if (1..=3).contains(&words.len()) && !ACKNOWLEDGEMENTS.contains(&first.as_str()) {
        message.trim().to_string()
    } else {
        DEFAULT_REASON.to_string()
    }
}

pub fn question_for(field: Field, draft: &Draft) -> String {
    match field {
        Field::Doctor if draft.is_empty() => {
            "Hi! I can help you book an appointment. Which doctor and date work for you?"
                .to_string()
        }
        Field::Doctor => "Which doctor would you like to see?".to_string(),
        Field::Date => format!("What date works for you with {}?", draft.doctor),
        Field::Time => format!("What time works best for you on {}?", draft.date),
        Field::PatientName => "Great! Could I have the patient's full name, please?".to_string(),
        Field::Reason => format!(
            "Perfect! I have all the details. What is the reason for your appointment with {} on {} at {}?",
            draft.doctor, draft.date, draft.time
        ),
    }
}

pub fn confirmation_message(draft: &Draft) -> String {
    format!(
        "Perfect! I've booked your appointment with {} on {} at {} for {}. Thank you, {}!",
        draft.doctor, draft.date, draft.time, draft.reason, draft.patient_name
    )
}
