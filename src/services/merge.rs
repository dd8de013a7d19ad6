use crate::models::{Draft, Field};

pub fn merge(candidate: &Draft, prior: &Draft) -> Draft {
    let mut merged = Draft::default();
    for field in Field::ALL {
        merged.set(field, choose(candidate.get(field), prior.get(field)));
    }
    merged
}

fn choose(candidate: &str, prior: &str) -> String {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        prior.to_string()
    } else {
        trimmed.to_string()
    }
}

// Candidate values that would actually change `prior`.
pub fn changes(candidate: &Draft, prior: &Draft) -> Draft {
    let mut changed = Draft::default();
    for field in Field::ALL {
        let value = candidate.get(field).trim();
        if !value.is_empty() && value != prior.get(field) {
            changed.set(field, value.to_string());
        }
    }
    changed
}
