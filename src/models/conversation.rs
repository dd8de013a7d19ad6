use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Draft;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DialogueStage {
    #[default]
    Collecting,
    AwaitingReason,
    Complete,
}

impl DialogueStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialogueStage::Collecting => "collecting",
            DialogueStage::AwaitingReason => "awaiting_reason",
            DialogueStage::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConversationState {
    pub draft: Draft,
    pub stage: DialogueStage,
    pub last_user_message: String,
    pub last_ai_message: String,
    pub updated_at: Option<DateTime<Utc>>,
}
