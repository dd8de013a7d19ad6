use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::Appointment;
use crate::services::conversation::{self, ChatOutcome};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum ChatResponse {
    Booked {
        session_id: String,
        message: String,
        appointment: Appointment,
    },
    Reply {
        session_id: String,
        reply: String,
    },
}

// POST /chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    let session_id = payload
        .session_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    tracing::info!(session_id = %session_id, message, "incoming chat message");

    let response = match conversation::process_message(&state, &session_id, message).await? {
        ChatOutcome::Booked {
            appointment,
            message,
        } => ChatResponse::Booked {
            session_id,
            message,
            appointment,
        },
        ChatOutcome::Reply(reply) => ChatResponse::Reply { session_id, reply },
    };

    Ok(Json(response))
}
