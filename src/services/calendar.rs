use crate::models::Appointment;

/// Times are emitted as UTC instants (trailing Z) so calendar apps show
/// them in whatever zone the viewer is in.
pub fn generate_ics(appt: &Appointment, company_name: &str) -> String {
    let dtstart = appt.start_utc.format("%Y%m%dT%H%M%SZ").to_string();
    let dtend = appt.end_utc().format("%Y%m%dT%H%M%SZ").to_string();
    let dtstamp = appt.created_at.format("%Y%m%dT%H%M%SZ").to_string();
    let uid = format!("{}@slotbook", appt.id);

    let summary = escape_text(&format!("Consultation with {company_name}"));
    let description = escape_text(&format!(
        "{} consultation ({} minutes) for {}",
        appt.consultation_type,
        appt.duration_minutes,
        appt.client_name()
    ));

    format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Slotbook//Booking//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART:{dtstart}\r\n\
         DTEND:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         DESCRIPTION:{description}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    )
}

// Backslash first, then the separators RFC 5545 reserves.
fn escape_text(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentStatus, Currency};
    use chrono::NaiveDateTime;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn appointment(consultation_type: &str) -> Appointment {
        Appointment {
            id: "test-123".to_string(),
            first_name: "Nadia".to_string(),
            last_name: "Berrada".to_string(),
            email: "nadia@example.com".to_string(),
            phone: "+15145550123".to_string(),
            country: "Canada".to_string(),
            start_utc: dt("2030-06-17 18:00:00"),
            duration_minutes: 60,
            consultation_type: consultation_type.to_string(),
            client_presentation: None,
            timezone: "America/Montreal".to_string(),
            amount_cents: 9_000,
            currency: Currency::Cad,
            status: AppointmentStatus::Confirmed,
            payment_ref: Some("pay_123".to_string()),
            admin_notes: None,
            reminder_sent: false,
            reminder_sent_at: None,
            created_at: dt("2030-06-01 10:00:00"),
            updated_at: dt("2030-06-01 10:00:00"),
        }
    }

    #[test]
    fn test_generate_ics() {
        let ics = generate_ics(&appointment("Permanent Residence"), "Acme Immigration");
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(ics.contains("BEGIN:VEVENT"));
        assert!(ics.contains("DTSTART:20300617T180000Z"));
        assert!(ics.contains("DTEND:20300617T190000Z"));
        assert!(ics.contains("DTSTAMP:20300601T100000Z"));
        assert!(ics.contains("SUMMARY:Consultation with Acme Immigration"));
        assert!(ics.contains("DESCRIPTION:Permanent Residence consultation (60 minutes) for Nadia Berrada"));
        assert!(ics.contains("UID:test-123@slotbook"));
        assert!(ics.contains("END:VEVENT"));
        assert!(ics.contains("END:VCALENDAR"));
    }

    #[test]
    fn test_generate_ics_escapes_text() {
        let ics = generate_ics(&appointment("Work, Study; Visit"), "Acme Immigration");
        assert!(ics.contains("DESCRIPTION:Work\\, Study\\; Visit consultation"));
    }
}
