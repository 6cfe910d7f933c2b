use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Legacy pre-generated working-hours slot. The blocked-period engine is
/// what bookings actually check against; this grid only feeds the simple
/// slot-picker endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub available: bool,
    pub appointment_id: Option<String>,
}
