//! The legacy pre-generated slot grid. Kept for the slot-picker
//! endpoints; real booking conflicts are decided by the blocked-period
//! engine, not by this table.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike};
use rusqlite::Connection;
use serde::Deserialize;
use uuid::Uuid;

use crate::config::WorkingHours;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::TimeSlot;

pub const DEFAULT_SLOT_MINUTES: i32 = 30;
const LAZY_WINDOW_DAYS: i64 = 30;
const MAX_GENERATE_SPAN_DAYS: i64 = 365;

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateSlotsRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub slot_duration_minutes: i32,
}

/// Fills the grid for every weekday in [start_date, end_date], slotting
/// each working band. Existing (date, start) pairs are left untouched,
/// so regeneration never duplicates. Returns how many slots were created.
pub fn generate_time_slots(
    conn: &mut Connection,
    hours: &WorkingHours,
    req: &GenerateSlotsRequest,
) -> Result<usize, AppError> {
    if req.end_date < req.start_date {
        return Err(AppError::BusinessRule(
            "End date must be after start date".to_string(),
        ));
    }
    if (req.end_date - req.start_date).num_days() >= MAX_GENERATE_SPAN_DAYS {
        return Err(AppError::BusinessRule(format!(
            "Cannot generate more than {MAX_GENERATE_SPAN_DAYS} days at once"
        )));
    }
    if req.slot_duration_minutes <= 0 {
        return Err(AppError::BusinessRule(
            "Slot duration must be positive".to_string(),
        ));
    }

    let tx = conn.transaction()?;
    let mut created = 0;
    let mut date = req.start_date;
    loop {
        // Monday..Friday only
        if date.weekday().number_from_monday() <= 5 {
            created += generate_slots_for_day(&tx, hours, date, req.slot_duration_minutes)?;
        }
        if date >= req.end_date {
            break;
        }
        date = match date.succ_opt() {
            Some(d) => d,
            None => break,
        };
    }
    tx.commit()?;

    tracing::info!(
        from = %req.start_date,
        to = %req.end_date,
        duration = req.slot_duration_minutes,
        created,
        "generated time slots"
    );
    Ok(created)
}

fn generate_slots_for_day(
    conn: &Connection,
    hours: &WorkingHours,
    date: NaiveDate,
    duration_minutes: i32,
) -> Result<usize, AppError> {
    let mut created = 0;
    for (band_start, band_end) in hours.bands() {
        let band_end_min = minutes_of_day(band_end);
        let mut start_min = minutes_of_day(band_start);
        while start_min + duration_minutes <= band_end_min {
            let start_time = time_from_minutes(start_min);
            if !queries::time_slot_exists(conn, date, start_time)? {
                let slot = TimeSlot {
                    id: Uuid::new_v4().to_string(),
                    date,
                    start_time,
                    end_time: time_from_minutes(start_min + duration_minutes),
                    available: true,
                    appointment_id: None,
                };
                queries::insert_time_slot(conn, &slot)?;
                created += 1;
            }
            start_min += duration_minutes;
        }
    }
    Ok(created)
}

fn minutes_of_day(time: NaiveTime) -> i32 {
    (time.hour() * 60 + time.minute()) as i32
}

fn time_from_minutes(minutes: i32) -> NaiveTime {
    NaiveTime::MIN + Duration::minutes(minutes as i64)
}

/// Open slots for a date. The first lookup near an empty stretch of the
/// grid triggers generation of the next 30 days of default slots.
pub fn get_available_slots(
    conn: &mut Connection,
    hours: &WorkingHours,
    date: NaiveDate,
) -> Result<Vec<TimeSlot>, AppError> {
    if !queries::time_slot_exists(conn, date, hours.morning_start)? {
        let req = GenerateSlotsRequest {
            start_date: date,
            end_date: date + Duration::days(LAZY_WINDOW_DAYS),
            slot_duration_minutes: DEFAULT_SLOT_MINUTES,
        };
        generate_time_slots(conn, hours, &req)?;
    }
    Ok(queries::get_available_time_slots_for_date(conn, date)?)
}

pub fn block_time_slot(conn: &Connection, id: &str) -> Result<TimeSlot, AppError> {
    let slot = queries::get_time_slot_by_id(conn, id)?
        .ok_or_else(|| AppError::NotFound("Time slot not found".to_string()))?;

    if !slot.available {
        return Err(AppError::BusinessRule(
            "Time slot is already blocked".to_string(),
        ));
    }

    queries::set_time_slot_availability(conn, id, false, slot.appointment_id.as_deref())?;
    Ok(TimeSlot {
        available: false,
        ..slot
    })
}

/// Reopens a slot, dropping any appointment link it carried.
pub fn unblock_time_slot(conn: &Connection, id: &str) -> Result<TimeSlot, AppError> {
    let slot = queries::get_time_slot_by_id(conn, id)?
        .ok_or_else(|| AppError::NotFound("Time slot not found".to_string()))?;

    queries::set_time_slot_availability(conn, id, true, None)?;
    Ok(TimeSlot {
        available: true,
        appointment_id: None,
        ..slot
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{Appointment, AppointmentStatus, Currency};
    use chrono::{NaiveDateTime, Utc};

    fn test_conn() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn hours() -> WorkingHours {
        WorkingHours::default()
    }

    fn gen_request(start: &str, end: &str, duration: i32) -> GenerateSlotsRequest {
        GenerateSlotsRequest {
            start_date: d(start),
            end_date: d(end),
            slot_duration_minutes: duration,
        }
    }

    fn seed_appointment(conn: &Connection, id: &str) {
        let now = Utc::now().naive_utc();
        let appt = Appointment {
            id: id.to_string(),
            first_name: "Nadia".to_string(),
            last_name: "Berrada".to_string(),
            email: format!("{id}@example.com"),
            phone: "+15145550123".to_string(),
            country: "Canada".to_string(),
            start_utc: NaiveDateTime::parse_from_str("2030-06-17 14:00", "%Y-%m-%d %H:%M").unwrap(),
            duration_minutes: 30,
            consultation_type: "initial".to_string(),
            client_presentation: None,
            timezone: "UTC".to_string(),
            amount_cents: 5_000,
            currency: Currency::Cad,
            status: AppointmentStatus::Pending,
            payment_ref: None,
            admin_notes: None,
            reminder_sent: false,
            reminder_sent_at: None,
            created_at: now,
            updated_at: now,
        };
        queries::create_appointment(conn, &appt).unwrap();
    }

    #[test]
    fn generates_both_bands_on_weekdays_only() {
        let mut conn = test_conn();
        // Sunday the 16th through Friday the 21st of June 2030
        let created =
            generate_time_slots(&mut conn, &hours(), &gen_request("2030-06-16", "2030-06-21", 30))
                .unwrap();
        assert_eq!(created, 5 * 12);

        assert!(queries::get_time_slots_for_date(&conn, d("2030-06-16"))
            .unwrap()
            .is_empty());

        let monday = queries::get_time_slots_for_date(&conn, d("2030-06-17")).unwrap();
        assert_eq!(monday.len(), 12);
        assert_eq!(monday.first().unwrap().start_time, t("09:00"));
        assert_eq!(monday.first().unwrap().end_time, t("09:30"));
        assert_eq!(monday.last().unwrap().start_time, t("16:30"));
        // nothing in the lunch gap
        assert!(!monday.iter().any(|s| s.start_time >= t("12:00") && s.start_time < t("14:00")));
        assert!(monday.iter().all(|s| s.available));
    }

    #[test]
    fn slot_duration_shapes_the_grid() {
        let mut conn = test_conn();
        generate_time_slots(&mut conn, &hours(), &gen_request("2030-06-17", "2030-06-17", 90))
            .unwrap();

        let slots = queries::get_time_slots_for_date(&conn, d("2030-06-17")).unwrap();
        let starts: Vec<NaiveTime> = slots.iter().map(|s| s.start_time).collect();
        assert_eq!(starts, vec![t("09:00"), t("10:30"), t("14:00"), t("15:30")]);
    }

    #[test]
    fn bands_come_from_config() {
        let mut conn = test_conn();
        let custom = WorkingHours {
            morning_start: t("08:00"),
            morning_end: t("10:00"),
            afternoon_start: t("13:00"),
            afternoon_end: t("13:30"),
        };
        generate_time_slots(&mut conn, &custom, &gen_request("2030-06-17", "2030-06-17", 30))
            .unwrap();

        let slots = queries::get_time_slots_for_date(&conn, d("2030-06-17")).unwrap();
        let starts: Vec<NaiveTime> = slots.iter().map(|s| s.start_time).collect();
        assert_eq!(
            starts,
            vec![t("08:00"), t("08:30"), t("09:00"), t("09:30"), t("13:00")]
        );
    }

    #[test]
    fn regeneration_skips_existing_slots() {
        let mut conn = test_conn();
        let req = gen_request("2030-06-17", "2030-06-18", 30);
        let first = generate_time_slots(&mut conn, &hours(), &req).unwrap();
        assert_eq!(first, 24);
        let second = generate_time_slots(&mut conn, &hours(), &req).unwrap();
        assert_eq!(second, 0);
        assert_eq!(
            queries::get_time_slots_for_date(&conn, d("2030-06-17"))
                .unwrap()
                .len(),
            12
        );
    }

    #[test]
    fn generation_validates_the_request() {
        let mut conn = test_conn();
        assert!(
            generate_time_slots(&mut conn, &hours(), &gen_request("2030-06-18", "2030-06-17", 30))
                .is_err()
        );
        assert!(
            generate_time_slots(&mut conn, &hours(), &gen_request("2030-06-17", "2030-06-17", 0))
                .is_err()
        );
        assert!(
            generate_time_slots(&mut conn, &hours(), &gen_request("2030-06-17", "2032-06-17", 30))
                .is_err()
        );
    }

    #[test]
    fn first_lookup_fills_the_next_month() {
        let mut conn = test_conn();
        let slots = get_available_slots(&mut conn, &hours(), d("2030-06-17")).unwrap();
        assert_eq!(slots.len(), 12);

        // the rest of the window came along
        assert_eq!(
            queries::get_time_slots_for_date(&conn, d("2030-06-28"))
                .unwrap()
                .len(),
            12
        );

        // blocked slots drop out of the listing
        let id = slots[0].id.clone();
        block_time_slot(&conn, &id).unwrap();
        let slots = get_available_slots(&mut conn, &hours(), d("2030-06-17")).unwrap();
        assert_eq!(slots.len(), 11);
        assert!(slots.iter().all(|s| s.id != id));
    }

    #[test]
    fn block_rejects_double_blocking() {
        let mut conn = test_conn();
        generate_time_slots(&mut conn, &hours(), &gen_request("2030-06-17", "2030-06-17", 30))
            .unwrap();
        let slot = &queries::get_time_slots_for_date(&conn, d("2030-06-17")).unwrap()[0];

        let blocked = block_time_slot(&conn, &slot.id).unwrap();
        assert!(!blocked.available);

        let err = block_time_slot(&conn, &slot.id).unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(msg) if msg == "Time slot is already blocked"));

        assert!(matches!(
            block_time_slot(&conn, "ghost"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn unblock_reopens_and_unlinks() {
        let mut conn = test_conn();
        generate_time_slots(&mut conn, &hours(), &gen_request("2030-06-17", "2030-06-17", 30))
            .unwrap();
        let slot = &queries::get_time_slots_for_date(&conn, d("2030-06-17")).unwrap()[0];

        seed_appointment(&conn, "appt-1");
        queries::set_time_slot_availability(&conn, &slot.id, false, Some("appt-1")).unwrap();

        let reopened = unblock_time_slot(&conn, &slot.id).unwrap();
        assert!(reopened.available);
        assert!(reopened.appointment_id.is_none());

        let stored = queries::get_time_slot_by_id(&conn, &slot.id).unwrap().unwrap();
        assert!(stored.available);
        assert!(stored.appointment_id.is_none());

        assert!(matches!(
            unblock_time_slot(&conn, "ghost"),
            Err(AppError::NotFound(_))
        ));
    }
}
