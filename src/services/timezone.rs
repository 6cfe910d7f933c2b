//! IANA timezone handling. UTC instants are canonical everywhere in the
//! store; these helpers produce and consume local wall-clock times at the
//! edges.

use chrono::{Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::errors::AppError;

/// Strict parse of an IANA identifier such as "America/Montreal".
pub fn parse_tz(name: &str) -> Result<Tz, AppError> {
    name.parse::<Tz>()
        .map_err(|_| AppError::BusinessRule(format!("Unknown timezone: {name}")))
}

/// Resolves a wall-clock time in `tz` to a UTC instant. A time skipped by
/// a DST transition is rejected; a repeated time resolves to its first
/// occurrence.
pub fn local_to_utc(local: NaiveDateTime, tz: Tz) -> Result<NaiveDateTime, AppError> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.naive_utc()),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.naive_utc()),
        LocalResult::None => Err(AppError::BusinessRule(format!(
            "{local} does not exist in timezone {tz} (daylight saving transition)"
        ))),
    }
}

/// UTC window [start, end) covering the local calendar day. Lenient about
/// transitions: a midnight swallowed by DST shifts to the next wall-clock
/// time that exists, so views never fail on transition days.
pub fn day_bounds_utc(date: NaiveDate, tz: Tz) -> (NaiveDateTime, NaiveDateTime) {
    let next = date.succ_opt().unwrap_or(date);
    (
        resolve_local_lenient(date.and_time(NaiveTime::MIN), tz),
        resolve_local_lenient(next.and_time(NaiveTime::MIN), tz),
    )
}

fn resolve_local_lenient(local: NaiveDateTime, tz: Tz) -> NaiveDateTime {
    let mut probe = local;
    for _ in 0..8 {
        match tz.from_local_datetime(&probe) {
            LocalResult::Single(dt) => return dt.naive_utc(),
            LocalResult::Ambiguous(earliest, _) => return earliest.naive_utc(),
            LocalResult::None => probe += Duration::minutes(30),
        }
    }
    // transition gaps are at most a few hours; treat the raw value as UTC
    local
}

/// "Monday, June 17, 2030 at 2:00 PM EDT" in the client's timezone.
/// An unknown timezone falls back to UTC rather than failing a mail send.
pub fn format_email_datetime(utc: NaiveDateTime, tz_name: &str) -> String {
    match tz_name.parse::<Tz>() {
        Ok(tz) => tz
            .from_utc_datetime(&utc)
            .format("%A, %B %-d, %Y at %-I:%M %p %Z")
            .to_string(),
        Err(_) => {
            tracing::warn!(timezone = %tz_name, "invalid timezone, formatting as UTC");
            Utc.from_utc_datetime(&utc)
                .format("%A, %B %-d, %Y at %-I:%M %p UTC")
                .to_string()
        }
    }
}

/// "2:00 PM" in the client's timezone, for subject lines.
pub fn format_email_time(utc: NaiveDateTime, tz_name: &str) -> String {
    match tz_name.parse::<Tz>() {
        Ok(tz) => tz
            .from_utc_datetime(&utc)
            .format("%-I:%M %p")
            .to_string(),
        Err(_) => Utc
            .from_utc_datetime(&utc)
            .format("%-I:%M %p")
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_tz("America/Montreal").is_ok());
        assert!(parse_tz("Mars/Olympus_Mons").is_err());
    }

    #[test]
    fn local_to_utc_applies_offset() {
        let tz: Tz = "America/Montreal".parse().unwrap();
        // EST in January, UTC-5
        let local = date(2030, 1, 15).and_hms_opt(14, 0, 0).unwrap();
        let utc = local_to_utc(local, tz).unwrap();
        assert_eq!(utc, date(2030, 1, 15).and_hms_opt(19, 0, 0).unwrap());
    }

    #[test]
    fn dst_gap_is_rejected() {
        let tz: Tz = "America/Montreal".parse().unwrap();
        // 2:30 AM on 2030-03-10 is skipped by the spring-forward jump
        let local = date(2030, 3, 10).and_hms_opt(2, 30, 0).unwrap();
        assert!(local_to_utc(local, tz).is_err());
    }

    #[test]
    fn ambiguous_time_takes_first_occurrence() {
        let tz: Tz = "America/Montreal".parse().unwrap();
        // 1:30 AM on 2030-11-03 happens twice; the EDT one comes first
        let local = date(2030, 11, 3).and_hms_opt(1, 30, 0).unwrap();
        let utc = local_to_utc(local, tz).unwrap();
        assert_eq!(utc, date(2030, 11, 3).and_hms_opt(5, 30, 0).unwrap());
    }

    #[test]
    fn day_bounds_cover_24h_outside_transitions() {
        let tz: Tz = "America/Montreal".parse().unwrap();
        let (start, end) = day_bounds_utc(date(2030, 1, 15), tz);
        assert_eq!(start, date(2030, 1, 15).and_hms_opt(5, 0, 0).unwrap());
        assert_eq!(end, date(2030, 1, 16).and_hms_opt(5, 0, 0).unwrap());
    }

    #[test]
    fn email_format_renders_local_time() {
        let utc = date(2030, 6, 17).and_hms_opt(18, 0, 0).unwrap();
        let formatted = format_email_datetime(utc, "America/Montreal");
        assert_eq!(formatted, "Monday, June 17, 2030 at 2:00 PM EDT");
    }

    #[test]
    fn email_format_falls_back_to_utc() {
        let utc = date(2030, 6, 17).and_hms_opt(18, 0, 0).unwrap();
        let formatted = format_email_datetime(utc, "Not/A_Zone");
        assert!(formatted.ends_with("6:00 PM UTC"));
    }

    #[test]
    fn email_time_is_short_local_form() {
        let utc = date(2030, 6, 17).and_hms_opt(18, 0, 0).unwrap();
        assert_eq!(format_email_time(utc, "America/Montreal"), "2:00 PM");
        assert_eq!(format_email_time(utc, "Not/A_Zone"), "6:00 PM");
    }
}
