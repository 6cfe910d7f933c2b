use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::TimeZone;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::handlers::check_auth;
use crate::models::{Appointment, AppointmentStatus};
use crate::services;
use crate::services::appointments::{CreateAppointmentRequest, UpdateAppointmentRequest};
use crate::services::notifications;
use crate::state::AppState;

#[derive(Serialize)]
pub struct AppointmentResponse {
    id: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    country: String,
    start_utc: String,
    local_start: String,
    timezone: String,
    duration_minutes: i32,
    consultation_type: String,
    amount_cents: i64,
    currency: String,
    status: String,
    payment_ref: Option<String>,
    admin_notes: Option<String>,
    created_at: String,
}

impl From<Appointment> for AppointmentResponse {
    fn from(a: Appointment) -> Self {
        let local_start = match a.timezone.parse::<Tz>() {
            Ok(tz) => tz
                .from_utc_datetime(&a.start_utc)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            Err(_) => a.start_utc.format("%Y-%m-%d %H:%M").to_string(),
        };
        Self {
            id: a.id,
            first_name: a.first_name,
            last_name: a.last_name,
            email: a.email,
            phone: a.phone,
            country: a.country,
            start_utc: a.start_utc.format("%Y-%m-%d %H:%M:%S").to_string(),
            local_start,
            timezone: a.timezone,
            duration_minutes: a.duration_minutes,
            consultation_type: a.consultation_type,
            amount_cents: a.amount_cents,
            currency: a.currency.as_str().to_string(),
            status: a.status.as_str().to_string(),
            payment_ref: a.payment_ref,
            admin_notes: a.admin_notes,
            created_at: a.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

// POST /api/appointments
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentResponse>), AppError> {
    let appt = {
        let mut db = state.db.lock().unwrap();
        services::appointments::create_appointment(&mut db, &state.config.pricing, &req)?
    };

    let email = notifications::booking_received(&appt, &state.config.company_name);
    notifications::dispatch(&state, appt.email.clone(), email);

    Ok((StatusCode::CREATED, Json(appt.into())))
}

// GET /api/appointments/:id
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AppointmentResponse>, AppError> {
    let db = state.db.lock().unwrap();
    let appt = services::appointments::get_appointment(&db, &id)?;
    Ok(Json(appt.into()))
}

// DELETE /api/appointments/:id
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let appt = {
        let mut db = state.db.lock().unwrap();
        services::appointments::cancel_appointment(&mut db, &id)?
    };

    let email = notifications::cancellation(&appt, &state.config.company_name);
    notifications::dispatch(&state, appt.email.clone(), email);

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/appointments/:id/confirm-payment
#[derive(Deserialize)]
pub struct ConfirmPaymentRequest {
    pub payment_ref: String,
}

pub async fn confirm_payment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<Json<AppointmentResponse>, AppError> {
    let appt = {
        let db = state.db.lock().unwrap();
        services::appointments::confirm_payment(&db, &id, &req.payment_ref)?
    };

    let payment_ref = appt.payment_ref.clone().unwrap_or_default();
    let email =
        notifications::payment_receipt(&appt, &payment_ref, &state.config.company_name);
    notifications::dispatch(&state, appt.email.clone(), email);

    Ok(Json(appt.into()))
}

// GET /api/appointments
#[derive(Deserialize)]
pub struct AppointmentsQuery {
    pub status: Option<String>,
}

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AppointmentsQuery>,
) -> Result<Json<Vec<AppointmentResponse>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let db = state.db.lock().unwrap();
    let found = match query.status.as_deref() {
        Some(raw) => {
            let status = AppointmentStatus::parse(raw)
                .ok_or_else(|| AppError::Validation(format!("unknown status: {raw}")))?;
            services::appointments::list_by_status(&db, status)?
        }
        None => services::appointments::list_all(&db)?,
    };
    Ok(Json(found.into_iter().map(Into::into).collect()))
}

// GET /api/appointments/upcoming
pub async fn upcoming_appointments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<AppointmentResponse>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let db = state.db.lock().unwrap();
    let upcoming = services::appointments::list_upcoming(&db)?;
    Ok(Json(upcoming.into_iter().map(Into::into).collect()))
}

// PATCH /api/appointments/:id
pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateAppointmentRequest>,
) -> Result<Json<AppointmentResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let appt = {
        let mut db = state.db.lock().unwrap();
        services::appointments::update_appointment(&mut db, &id, &req)?
    };
    Ok(Json(appt.into()))
}
