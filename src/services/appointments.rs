//! Appointment lifecycle: create (which claims the time), payment
//! confirmation, cancellation, admin reads and patches.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use rusqlite::Connection;
use serde::Deserialize;
use uuid::Uuid;

use crate::config::PricingConfig;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Appointment, AppointmentStatus, Currency};
use crate::services::availability;
use crate::services::timezone;

pub const VALID_DURATIONS: [i32; 3] = [30, 60, 90];
const MAX_PRESENTATION_CHARS: usize = 1000;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    /// RFC 3339 with offset, e.g. "2030-06-17T14:00:00-04:00".
    pub start: DateTime<FixedOffset>,
    pub duration_minutes: i32,
    pub consultation_type: String,
    pub client_presentation: Option<String>,
    pub currency: Currency,
    /// IANA id used for every client-facing rendering of the time.
    pub timezone: String,
}

/// Books a consultation. Runs as one transaction: the pending row and its
/// blocked period land together or not at all.
pub fn create_appointment(
    conn: &mut Connection,
    pricing: &PricingConfig,
    req: &CreateAppointmentRequest,
) -> Result<Appointment, AppError> {
    create_appointment_at(conn, pricing, req, Utc::now().naive_utc())
}

pub fn create_appointment_at(
    conn: &mut Connection,
    pricing: &PricingConfig,
    req: &CreateAppointmentRequest,
    now: NaiveDateTime,
) -> Result<Appointment, AppError> {
    validate_create(req)?;
    let start_utc = req.start.with_timezone(&Utc).naive_utc();

    let tx = conn.transaction()?;

    if queries::has_pending_appointment_for_email(&tx, &req.email)? {
        return Err(AppError::BusinessRule(
            "You already have a pending appointment. Please complete or cancel it first."
                .to_string(),
        ));
    }

    if !availability::is_available_at(&tx, start_utc, req.duration_minutes, now)? {
        return Err(AppError::BusinessRule(
            "Requested time is not available".to_string(),
        ));
    }

    let amount_cents = pricing
        .amount_cents(req.currency, req.duration_minutes)
        .filter(|cents| *cents > 0)
        .ok_or_else(|| {
            AppError::Config(format!(
                "No price configured for {} minutes in {}",
                req.duration_minutes,
                req.currency.as_str()
            ))
        })?;

    let appt = Appointment {
        id: Uuid::new_v4().to_string(),
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        email: req.email.trim().to_string(),
        phone: req.phone.trim().to_string(),
        country: req.country.trim().to_string(),
        start_utc,
        duration_minutes: req.duration_minutes,
        consultation_type: req.consultation_type.trim().to_string(),
        client_presentation: req.client_presentation.clone(),
        timezone: req.timezone.clone(),
        amount_cents,
        currency: req.currency,
        status: AppointmentStatus::Pending,
        payment_ref: None,
        admin_notes: None,
        reminder_sent: false,
        reminder_sent_at: None,
        created_at: now,
        updated_at: now,
    };
    queries::create_appointment(&tx, &appt)?;
    availability::block_time_for_appointment(&tx, &appt.id, start_utc, req.duration_minutes)?;
    tx.commit()?;

    tracing::info!(
        appointment_id = %appt.id,
        start = %appt.start_utc,
        duration = appt.duration_minutes,
        "appointment created"
    );
    Ok(appt)
}

fn validate_create(req: &CreateAppointmentRequest) -> Result<(), AppError> {
    let required = [
        (req.first_name.as_str(), "First name"),
        (req.last_name.as_str(), "Last name"),
        (req.email.as_str(), "Email"),
        (req.phone.as_str(), "Phone"),
        (req.country.as_str(), "Country"),
        (req.consultation_type.as_str(), "Consultation type"),
        (req.timezone.as_str(), "Timezone"),
    ];
    for (value, label) in required {
        if value.trim().is_empty() {
            return Err(AppError::BusinessRule(format!("{label} is required")));
        }
    }
    if !req.email.contains('@') {
        return Err(AppError::BusinessRule("Valid email is required".to_string()));
    }
    if !VALID_DURATIONS.contains(&req.duration_minutes) {
        return Err(AppError::BusinessRule(format!(
            "Invalid duration: {}",
            req.duration_minutes
        )));
    }
    if let Some(presentation) = &req.client_presentation {
        if presentation.chars().count() > MAX_PRESENTATION_CHARS {
            return Err(AppError::BusinessRule(format!(
                "Client presentation must not exceed {MAX_PRESENTATION_CHARS} characters"
            )));
        }
    }
    timezone::parse_tz(&req.timezone)?;
    Ok(())
}

/// Marks a pending appointment paid. The payment reference is recorded
/// once and never overwritten.
pub fn confirm_payment(
    conn: &Connection,
    id: &str,
    payment_ref: &str,
) -> Result<Appointment, AppError> {
    let appt = get_appointment(conn, id)?;

    if appt.status != AppointmentStatus::Pending {
        return Err(AppError::BusinessRule(
            "Appointment is not in pending status".to_string(),
        ));
    }
    if payment_ref.trim().is_empty() {
        return Err(AppError::BusinessRule(
            "Payment reference is required".to_string(),
        ));
    }

    queries::confirm_appointment_payment(conn, id, payment_ref.trim())?;
    tracing::info!(appointment_id = %id, "payment confirmed");

    Ok(Appointment {
        status: AppointmentStatus::Confirmed,
        payment_ref: Some(payment_ref.trim().to_string()),
        ..appt
    })
}

/// Cancels unless already completed, releasing the appointment's blocked
/// period and any legacy slot link. Cancelling twice is harmless.
pub fn cancel_appointment(conn: &mut Connection, id: &str) -> Result<Appointment, AppError> {
    let tx = conn.transaction()?;

    let appt = queries::get_appointment_by_id(&tx, id)?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;

    if appt.status == AppointmentStatus::Completed {
        return Err(AppError::BusinessRule(
            "Cannot cancel completed appointment".to_string(),
        ));
    }

    queries::set_appointment_status(&tx, id, AppointmentStatus::Cancelled)?;
    availability::free_up_blocked_time_for_appointment(&tx, id)?;
    queries::release_time_slots_for_appointment(&tx, id)?;
    tx.commit()?;

    tracing::info!(appointment_id = %id, "appointment cancelled");
    Ok(Appointment {
        status: AppointmentStatus::Cancelled,
        ..appt
    })
}

pub fn get_appointment(conn: &Connection, id: &str) -> Result<Appointment, AppError> {
    queries::get_appointment_by_id(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("Appointment not found with id: {id}")))
}

pub fn list_upcoming(conn: &Connection) -> Result<Vec<Appointment>, AppError> {
    Ok(queries::get_upcoming_appointments(conn)?)
}

pub fn list_all(conn: &Connection) -> Result<Vec<Appointment>, AppError> {
    Ok(queries::get_all_appointments(conn)?)
}

pub fn list_by_status(
    conn: &Connection,
    status: AppointmentStatus,
) -> Result<Vec<Appointment>, AppError> {
    Ok(queries::get_appointments_by_status(conn, status)?)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub start: Option<DateTime<FixedOffset>>,
    pub duration_minutes: Option<i32>,
    pub status: Option<AppointmentStatus>,
    pub admin_notes: Option<String>,
    pub consultation_type: Option<String>,
}

/// Admin patch. Skips the availability check (the admin overrides the
/// calendar), but keeps the derived blocked period in line with the
/// appointment's time and status.
pub fn update_appointment(
    conn: &mut Connection,
    id: &str,
    req: &UpdateAppointmentRequest,
) -> Result<Appointment, AppError> {
    let tx = conn.transaction()?;

    let mut appt = queries::get_appointment_by_id(&tx, id)?
        .ok_or_else(|| AppError::NotFound(format!("Appointment not found with id: {id}")))?;

    let mut time_changed = false;
    if let Some(start) = req.start {
        let start_utc = start.with_timezone(&Utc).naive_utc();
        time_changed |= start_utc != appt.start_utc;
        appt.start_utc = start_utc;
    }
    if let Some(duration) = req.duration_minutes {
        if !VALID_DURATIONS.contains(&duration) {
            return Err(AppError::BusinessRule(format!(
                "Invalid duration: {duration}"
            )));
        }
        time_changed |= duration != appt.duration_minutes;
        appt.duration_minutes = duration;
    }
    let mut status_changed = false;
    if let Some(status) = req.status {
        if status != appt.status {
            if !appt.status.can_transition_to(status) {
                return Err(AppError::BusinessRule(format!(
                    "Cannot change status from {} to {}",
                    appt.status.as_str(),
                    status.as_str()
                )));
            }
            status_changed = true;
            appt.status = status;
        }
    }
    if let Some(notes) = &req.admin_notes {
        appt.admin_notes = Some(notes.clone());
    }
    if let Some(consultation_type) = &req.consultation_type {
        appt.consultation_type = consultation_type.clone();
    }

    queries::update_appointment(&tx, &appt)?;

    // The derived blocked period follows active appointments only; a row
    // in a terminal status must never hold (or regain) a block.
    if status_changed && appt.status == AppointmentStatus::Cancelled {
        availability::free_up_blocked_time_for_appointment(&tx, id)?;
        queries::release_time_slots_for_appointment(&tx, id)?;
    } else if time_changed
        && matches!(
            appt.status,
            AppointmentStatus::Pending | AppointmentStatus::Confirmed
        )
    {
        availability::free_up_blocked_time_for_appointment(&tx, id)?;
        availability::block_time_for_appointment(&tx, id, appt.start_utc, appt.duration_minutes)?;
    }
    tx.commit()?;

    tracing::info!(appointment_id = %id, "appointment updated");
    Ok(appt)
}
