use axum::http::HeaderMap;

use crate::errors::AppError;

pub mod appointments;
pub mod availability;
pub mod calendar;
pub mod documents;
pub mod health;
pub mod payments;
pub mod slots;

/// Bearer-token check for admin endpoints.
pub(crate) fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}
