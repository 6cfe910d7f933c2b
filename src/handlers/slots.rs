use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::handlers::check_auth;
use crate::models::TimeSlot;
use crate::services;
use crate::services::slots::GenerateSlotsRequest;
use crate::state::AppState;

#[derive(Serialize)]
pub struct TimeSlotResponse {
    id: String,
    date: String,
    start_time: String,
    end_time: String,
    available: bool,
    appointment_id: Option<String>,
}

impl From<TimeSlot> for TimeSlotResponse {
    fn from(s: TimeSlot) -> Self {
        Self {
            id: s.id,
            date: s.date.format("%Y-%m-%d").to_string(),
            start_time: s.start_time.format("%H:%M").to_string(),
            end_time: s.end_time.format("%H:%M").to_string(),
            available: s.available,
            appointment_id: s.appointment_id,
        }
    }
}

// GET /api/slots?date=2030-06-17
#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}

pub async fn available_slots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Vec<TimeSlotResponse>>, AppError> {
    let mut db = state.db.lock().unwrap();
    let slots = services::slots::get_available_slots(&mut db, &state.config.hours, query.date)?;
    Ok(Json(slots.into_iter().map(Into::into).collect()))
}

// POST /api/slots/generate
#[derive(Serialize)]
pub struct GenerateSlotsResponse {
    created: usize,
}

pub async fn generate_slots(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<GenerateSlotsRequest>,
) -> Result<(StatusCode, Json<GenerateSlotsResponse>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let created = {
        let mut db = state.db.lock().unwrap();
        services::slots::generate_time_slots(&mut db, &state.config.hours, &req)?
    };
    Ok((StatusCode::CREATED, Json(GenerateSlotsResponse { created })))
}

// POST /api/slots/:id/block
pub async fn block_slot(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<TimeSlotResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let db = state.db.lock().unwrap();
    let slot = services::slots::block_time_slot(&db, &id)?;
    Ok(Json(slot.into()))
}

// POST /api/slots/:id/unblock
pub async fn unblock_slot(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<TimeSlotResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let db = state.db.lock().unwrap();
    let slot = services::slots::unblock_time_slot(&db, &id)?;
    Ok(Json(slot.into()))
}
