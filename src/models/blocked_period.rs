use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A span of time during which no appointment can start or run.
///
/// Stored as UTC instants; the `date` column carries the UTC date of the
/// start for indexed day lookups. Periods created on behalf of an
/// appointment carry its id and cannot be removed by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedPeriod {
    pub id: String,
    pub date: NaiveDate,
    pub start_utc: NaiveDateTime,
    pub end_utc: NaiveDateTime,
    pub reason: String,
    pub appointment_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

pub const APPOINTMENT_REASON: &str = "APPOINTMENT";

impl BlockedPeriod {
    pub fn is_appointment_derived(&self) -> bool {
        self.appointment_id.is_some()
    }
}
