use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha1::Sha1;

use crate::services;
use crate::services::notifications;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PaymentEvent {
    pub event: String,
    pub appointment_id: String,
    pub payment_ref: Option<String>,
}

fn verify_signature(secret: &str, signature: &str, payload: &[u8]) -> bool {
    let mut mac = match Hmac::<Sha1>::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(payload);
    let expected = base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());
    expected == signature
}

// POST /api/payments/webhook
pub async fn payment_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    // Validate signature over the raw body; an empty secret means dev mode
    // and the check is skipped.
    if !state.config.payment_webhook_secret.is_empty() {
        let signature = headers
            .get("x-webhook-signature")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if signature.is_empty() {
            tracing::warn!("missing X-Webhook-Signature header");
            return (StatusCode::FORBIDDEN, "Missing signature").into_response();
        }

        if !verify_signature(
            &state.config.payment_webhook_secret,
            signature,
            body.as_bytes(),
        ) {
            tracing::warn!("invalid webhook signature");
            return (StatusCode::FORBIDDEN, "Invalid signature").into_response();
        }
    }

    let event: PaymentEvent = match serde_json::from_str(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "malformed payment event");
            return (StatusCode::BAD_REQUEST, "Malformed event").into_response();
        }
    };

    match event.event.as_str() {
        "payment.succeeded" => {
            let payment_ref = event.payment_ref.as_deref().unwrap_or("");
            let confirmed = {
                let db = state.db.lock().unwrap();
                services::appointments::confirm_payment(&db, &event.appointment_id, payment_ref)
            };
            match confirmed {
                Ok(appt) => {
                    let reference = appt.payment_ref.clone().unwrap_or_default();
                    let email = notifications::payment_receipt(
                        &appt,
                        &reference,
                        &state.config.company_name,
                    );
                    notifications::dispatch(&state, appt.email.clone(), email);
                }
                // replayed or unknown events are acknowledged, not retried
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        appointment_id = %event.appointment_id,
                        "could not apply payment confirmation"
                    );
                }
            }
        }
        "payment.failed" => {
            tracing::warn!(appointment_id = %event.appointment_id, "payment failed");
        }
        other => {
            tracing::info!(event = %other, "ignoring payment event");
        }
    }

    Json(serde_json::json!({ "received": true })).into_response()
}
