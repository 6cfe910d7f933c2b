use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Metadata for a file a client attached to an appointment. The bytes
/// themselves live in external storage under `storage_key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub appointment_id: String,
    pub file_name: String,
    pub content_type: String,
    pub storage_key: String,
    pub size_bytes: i64,
    pub uploaded_at: NaiveDateTime,
}
