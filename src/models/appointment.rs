use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A booked consultation. `start_utc` is the canonical instant; `timezone`
/// is only used to render local times for the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub start_utc: NaiveDateTime,
    pub duration_minutes: i32,
    pub consultation_type: String,
    pub client_presentation: Option<String>,
    pub timezone: String,
    pub amount_cents: i64,
    pub currency: Currency,
    pub status: AppointmentStatus,
    pub payment_ref: Option<String>,
    pub admin_notes: Option<String>,
    pub reminder_sent: bool,
    pub reminder_sent_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Appointment {
    pub fn end_utc(&self) -> NaiveDateTime {
        self.start_utc + chrono::Duration::minutes(self.duration_minutes as i64)
    }

    pub fn client_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::NoShow => "no_show",
        }
    }

    /// Lenient parse for database rows; unknown values read as pending.
    pub fn from_str(s: &str) -> Self {
        Self::parse(s).unwrap_or(AppointmentStatus::Pending)
    }

    /// Strict parse for values arriving over the wire.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(AppointmentStatus::Pending),
            "confirmed" => Some(AppointmentStatus::Confirmed),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            "completed" => Some(AppointmentStatus::Completed),
            "no_show" => Some(AppointmentStatus::NoShow),
            _ => None,
        }
    }

    /// Legal moves: pending -> confirmed or cancelled; confirmed ->
    /// completed, no_show or cancelled. Cancelled, completed and no_show
    /// are terminal.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Completed)
                | (Confirmed, NoShow)
                | (Confirmed, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Cad,
    Mad,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Cad => "CAD",
            Currency::Mad => "MAD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CAD" => Some(Currency::Cad),
            "MAD" => Some(Currency::Mad),
            _ => None,
        }
    }

    pub fn from_str(s: &str) -> Self {
        Self::parse(s).unwrap_or(Currency::Cad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
            AppointmentStatus::NoShow,
        ] {
            assert_eq!(AppointmentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(AppointmentStatus::parse("bogus"), None);
        assert_eq!(
            AppointmentStatus::from_str("bogus"),
            AppointmentStatus::Pending
        );
    }

    #[test]
    fn status_machine_allows_only_forward_moves() {
        use AppointmentStatus::*;

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(NoShow));
        assert!(Confirmed.can_transition_to(Cancelled));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(NoShow));
        for terminal in [Cancelled, Completed, NoShow] {
            for next in [Pending, Confirmed, Cancelled, Completed, NoShow] {
                assert!(!terminal.can_transition_to(next));
            }
        }
        assert!(!Confirmed.can_transition_to(Pending));
    }

    #[test]
    fn currency_parse_is_strict() {
        assert_eq!(Currency::parse("CAD"), Some(Currency::Cad));
        assert_eq!(Currency::parse("MAD"), Some(Currency::Mad));
        assert_eq!(Currency::parse("usd"), None);
        assert_eq!(Currency::parse("cad"), None);
    }
}
