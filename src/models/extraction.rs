use serde::{Deserialize, Serialize};

use super::Draft;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Book,
    #[default]
    #[serde(other)]
    Chat,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedFields {
    pub intent: Intent,
    pub doctor: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub patient_name: Option<String>,
    pub reason: Option<String>,
    pub reply: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelExtraction {
    NoResult { reply: Option<String> },
    PartialFields { fields: Draft, reply: Option<String> },
    BookIntent { fields: Draft, reply: Option<String> },
}

impl ModelExtraction {
    pub fn fields(&self) -> Option<&Draft> {
        match self {
            ModelExtraction::NoResult { .. } => None,
            ModelExtraction::PartialFields { fields, .. }
            | ModelExtraction::BookIntent { fields, .. } => Some(fields),
        }
    }

    pub fn reply(&self) -> Option<&str> {
        match self {
            ModelExtraction::NoResult { reply }
            | ModelExtraction::PartialFields { reply, .. }
            | ModelExtraction::BookIntent { reply, .. } => reply.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalExtraction {
    pub fields: Draft,
    pub confident: bool,
}
