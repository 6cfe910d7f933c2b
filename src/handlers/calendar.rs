use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::errors::AppError;
use crate::services;
use crate::services::calendar::generate_ics;
use crate::state::AppState;

// GET /api/appointments/:id/calendar.ics
pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let appt = {
        let db = state.db.lock().unwrap();
        services::appointments::get_appointment(&db, &id)?
    };

    let ics = generate_ics(&appt, &state.config.company_name);
    let filename = format!("appointment-{id}.ics");

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                &format!("attachment; filename=\"{filename}\""),
            ),
        ],
        ics,
    )
        .into_response())
}
