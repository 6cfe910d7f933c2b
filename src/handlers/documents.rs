use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Document;
use crate::services;
use crate::services::notifications;
use crate::state::AppState;

const MAX_DOCUMENT_BYTES: i64 = 10 * 1024 * 1024;

#[derive(Serialize)]
pub struct DocumentResponse {
    id: String,
    appointment_id: String,
    file_name: String,
    content_type: String,
    storage_key: String,
    size_bytes: i64,
    uploaded_at: String,
}

impl From<Document> for DocumentResponse {
    fn from(d: Document) -> Self {
        Self {
            id: d.id,
            appointment_id: d.appointment_id,
            file_name: d.file_name,
            content_type: d.content_type,
            storage_key: d.storage_key,
            size_bytes: d.size_bytes,
            uploaded_at: d.uploaded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

// POST /api/appointments/:id/documents
//
// Records metadata only; the bytes live in external storage under
// `storage_key`, generated here when the uploader does not supply one.
#[derive(Deserialize)]
pub struct UploadDocumentRequest {
    pub file_name: String,
    pub content_type: Option<String>,
    pub storage_key: Option<String>,
    pub size_bytes: i64,
}

pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UploadDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>), AppError> {
    let file_name = req.file_name.trim();
    if file_name.is_empty() {
        return Err(AppError::Validation("File name is required".to_string()));
    }
    if req.size_bytes <= 0 {
        return Err(AppError::Validation(
            "File size must be positive".to_string(),
        ));
    }
    if req.size_bytes > MAX_DOCUMENT_BYTES {
        return Err(AppError::Validation(format!(
            "File exceeds the {MAX_DOCUMENT_BYTES} byte limit"
        )));
    }

    let (appt, doc) = {
        let db = state.db.lock().unwrap();
        let appt = services::appointments::get_appointment(&db, &id)?;
        let doc = Document {
            id: Uuid::new_v4().to_string(),
            appointment_id: appt.id.clone(),
            file_name: file_name.to_string(),
            content_type: req
                .content_type
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            storage_key: req
                .storage_key
                .filter(|k| !k.trim().is_empty())
                .unwrap_or_else(|| format!("uploads/{}/{}", appt.id, Uuid::new_v4())),
            size_bytes: req.size_bytes,
            uploaded_at: Utc::now().naive_utc(),
        };
        queries::insert_document(&db, &doc)?;
        (appt, doc)
    };

    let email = notifications::documents_received(
        &appt,
        &[doc.file_name.clone()],
        &state.config.company_name,
    );
    notifications::dispatch(&state, appt.email.clone(), email);

    Ok((StatusCode::CREATED, Json(doc.into())))
}

// GET /api/appointments/:id/documents
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<DocumentResponse>>, AppError> {
    let db = state.db.lock().unwrap();
    services::appointments::get_appointment(&db, &id)?;
    let docs = queries::get_documents_for_appointment(&db, &id)?;
    Ok(Json(docs.into_iter().map(Into::into).collect()))
}
