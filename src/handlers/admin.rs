use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{Appointment, AppointmentStatus};
use crate::services::validation::{is_valid_date, is_valid_time};
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() || token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

fn storage_error(e: anyhow::Error) -> AppError {
    tracing::error!(error = %e, "appointment storage failed");
    AppError::Storage(e.to_string())
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct AppointmentInput {
    pub patient_name: Option<String>,
    pub doctor: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub reason: Option<String>,
    pub status: Option<String>,
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

fn validate_date_time(date: &str, time: &str) -> Result<(), AppError> {
    if !date.is_empty() && !is_valid_date(date) {
        return Err(AppError::Validation(format!(
            "invalid date {date:?}: expected a real calendar date as YYYY-MM-DD"
        )));
    }
    if !time.is_empty() && !is_valid_time(time) {
        return Err(AppError::Validation(format!(
            "invalid time {time:?}: expected 24-hour HH:MM"
        )));
    }
    Ok(())
}

// GET /admin/appointments
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Appointment>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let appointments = state.appointments.list().map_err(storage_error)?;
    Ok(Json(appointments))
}

// POST /admin/appointments
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(input): Json<AppointmentInput>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let appointment = Appointment {
        id: 0,
        patient_name: trimmed(&input.patient_name),
        doctor: trimmed(&input.doctor),
        date: trimmed(&input.date),
        time: trimmed(&input.time),
        reason: trimmed(&input.reason),
        status: AppointmentStatus::parse(&trimmed(&input.status)),
        created_at: String::new(),
        updated_at: String::new(),
    };

    validate_date_time(&appointment.date, &appointment.time)?;
    if appointment.patient_name.is_empty()
        || appointment.doctor.is_empty()
        || appointment.date.is_empty()
        || appointment.time.is_empty()
    {
        return Err(AppError::Validation(
            "patient_name, doctor, date and time are required".to_string(),
        ));
    }

    let saved = state
        .appointments
        .create(&appointment)
        .map_err(storage_error)?;
    tracing::info!(appointment_id = saved.id, "appointment created by admin");

    Ok((StatusCode::CREATED, Json(saved)))
}

// PUT /admin/appointments/:id
pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<AppointmentInput>,
) -> Result<Json<Appointment>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let date = trimmed(&input.date);
    let time = trimmed(&input.time);
    validate_date_time(&date, &time)?;

    let mut appointment = state
        .appointments
        .get(id)
        .map_err(storage_error)?
        .ok_or_else(|| AppError::NotFound(format!("appointment {id}")))?;

    let keep = |new: String, old: &mut String| {
        if !new.is_empty() {
            *old = new;
        }
    };
    keep(trimmed(&input.patient_name), &mut appointment.patient_name);
    keep(trimmed(&input.doctor), &mut appointment.doctor);
    keep(date, &mut appointment.date);
    keep(time, &mut appointment.time);
    keep(trimmed(&input.reason), &mut appointment.reason);

    let status = trimmed(&input.status);
    if !status.is_empty() {
        appointment.status = AppointmentStatus::parse(&status);
    }

    if !state
        .appointments
        .update(&appointment)
        .map_err(storage_error)?
    {
        return Err(AppError::NotFound(format!("appointment {id}")));
    }

    // Reload for the refreshed updated_at.
    let updated = state
        .appointments
        .get(id)
        .map_err(storage_error)?
        .unwrap_or(appointment);
    Ok(Json(updated))
}

// DELETE /admin/appointments/:id
pub async fn delete_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    if !state.appointments.delete(id).map_err(storage_error)? {
        return Err(AppError::NotFound(format!("appointment {id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}
