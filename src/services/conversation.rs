use crate::errors::AppError;
use crate::models::{Appointment, ConversationState, Draft, ModelExtraction};
use crate::services::ai::extraction::extract_with_model;
use crate::services::extractor::extract_local;
use crate::services::merge::{changes, merge};
use crate::services::policy::{self, Decision};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    Booked {
        appointment: Appointment,
        message: String,
    },
    Reply(String),
}

pub async fn process_message(
    state: &AppState,
    session_id: &str,
    message: &str,
) -> Result<ChatOutcome, AppError> {
    // Held until the turn returns so overlapping turns for one session
    // cannot overwrite each other.
    let _turn = state.sessions.begin_turn(session_id).await;

    let mut conv = state.sessions.get(session_id).await;
    let previous_stage = conv.stage;

    let model = extract_with_model(state.llm.as_ref(), message, &conv, state.config.llm_timeout).await;
    let candidates = combine_candidates(&model, message, &conv);

    tracing::info!(
        session_id,
        stage = previous_stage.as_str(),
        model = model_kind(&model),
        found = ?candidates,
        "processing chat message"
    );

    let draft = merge(&candidates, &conv.draft);
    let changed = changes(&candidates, &conv.draft);
    let decision = policy::evaluate(&draft, previous_stage, message, &changed);
    let stage = decision.stage();
    conv.last_user_message = message.to_string();

    match decision {
        Decision::Ask { prompt, .. } => {
            // Nothing usable in this message: let the model's own reply
            // stand in as the clarifying answer when it gave one.
            let reply = if candidates.is_empty() {
                model.reply().map(str::to_string).unwrap_or(prompt)
            } else {
                prompt
            };

            conv.draft = draft;
            conv.stage = stage;
            conv.last_ai_message = reply.clone();
            state.sessions.set(session_id, conv).await;

            Ok(ChatOutcome::Reply(reply))
        }
        Decision::Complete { draft: done } => {
            let confirmation = policy::confirmation_message(&done);

            match state.appointments.create(&Appointment::from_draft(&done)) {
                Ok(appointment) => {
                    tracing::info!(
                        session_id,
                        appointment_id = appointment.id,
                        doctor = %appointment.doctor,
                        date = %appointment.date,
                        time = %appointment.time,
                        "appointment booked"
                    );
                    state
                        .sessions
                        .set(session_id, ConversationState::default())
                        .await;
                    Ok(ChatOutcome::Booked {
                        appointment,
                        message: confirmation,
                    })
                }
                Err(e) => {
                    tracing::error!(session_id, error = %e, "failed to persist appointment");
                    // Keep everything so the next message can retry the commit.
                    conv.draft = done;
                    conv.last_ai_message = String::new();
                    state.sessions.set(session_id, conv).await;
                    Err(AppError::BookingNotSaved(e.to_string()))
                }
            }
        }
    }
}

// Model candidates win over pattern candidates for the same field; pattern
// candidates fill whatever the model left blank.
fn combine_candidates(model: &ModelExtraction, message: &str, conv: &ConversationState) -> Draft {
    let local = extract_local(message, &conv.draft);
    if local.confident {
        tracing::debug!("local parser found both date and time");
    }

    match model.fields() {
        Some(model_fields) => merge(model_fields, &local.fields),
        None => local.fields,
    }
}

fn model_kind(model: &ModelExtraction) -> &'static str {
    match model {
        ModelExtraction::NoResult { .. } => "none",
        ModelExtraction::PartialFields { .. } => "partial",
        ModelExtraction::BookIntent { .. } => "book",
    }
}
