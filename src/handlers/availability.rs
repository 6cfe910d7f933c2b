use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::handlers::check_auth;
use crate::models::BlockedPeriod;
use crate::services;
use crate::services::availability::{BlockPeriodRequest, DayAvailability, MonthAvailability};
use crate::services::timezone;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct TimezoneQuery {
    pub timezone: Option<String>,
}

fn resolve_tz(query: &TimezoneQuery) -> Result<Tz, AppError> {
    match query.timezone.as_deref() {
        Some(name) => timezone::parse_tz(name),
        None => Ok(Tz::UTC),
    }
}

// GET /api/availability/day/:date
pub async fn day_availability(
    State(state): State<Arc<AppState>>,
    Path(date): Path<NaiveDate>,
    Query(query): Query<TimezoneQuery>,
) -> Result<Json<DayAvailability>, AppError> {
    let tz = resolve_tz(&query)?;
    let db = state.db.lock().unwrap();
    let day = services::availability::day_availability(&db, date, tz)?;
    Ok(Json(day))
}

// GET /api/availability/month/:year/:month
pub async fn month_availability(
    State(state): State<Arc<AppState>>,
    Path((year, month)): Path<(i32, u32)>,
    Query(query): Query<TimezoneQuery>,
) -> Result<Json<MonthAvailability>, AppError> {
    let tz = resolve_tz(&query)?;
    let db = state.db.lock().unwrap();
    let month = services::availability::month_availability(&db, year, month, tz)?;
    Ok(Json(month))
}

#[derive(Serialize)]
pub struct BlockedPeriodResponse {
    id: String,
    date: String,
    start_utc: String,
    end_utc: String,
    reason: String,
    appointment_id: Option<String>,
    notes: Option<String>,
    created_at: String,
}

impl From<BlockedPeriod> for BlockedPeriodResponse {
    fn from(p: BlockedPeriod) -> Self {
        Self {
            id: p.id,
            date: p.date.format("%Y-%m-%d").to_string(),
            start_utc: p.start_utc.format("%Y-%m-%d %H:%M:%S").to_string(),
            end_utc: p.end_utc.format("%Y-%m-%d %H:%M:%S").to_string(),
            reason: p.reason,
            appointment_id: p.appointment_id,
            notes: p.notes,
            created_at: p.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

// POST /api/availability/block
pub async fn block_period(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<BlockPeriodRequest>,
) -> Result<(StatusCode, Json<Vec<BlockedPeriodResponse>>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let created = {
        let mut db = state.db.lock().unwrap();
        services::availability::block_period(&mut db, &req)?
    };
    Ok((
        StatusCode::CREATED,
        Json(created.into_iter().map(Into::into).collect()),
    ))
}

// DELETE /api/availability/block/:id
pub async fn unblock_period(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let db = state.db.lock().unwrap();
    services::availability::unblock_period(&db, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/availability/blocked-periods
#[derive(Deserialize)]
pub struct BlockedPeriodsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub async fn list_blocked_periods(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BlockedPeriodsQuery>,
) -> Result<Json<Vec<BlockedPeriodResponse>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let db = state.db.lock().unwrap();
    let periods =
        services::availability::list_blocked_periods(&db, query.start_date, query.end_date)?;
    Ok(Json(periods.into_iter().map(Into::into).collect()))
}
