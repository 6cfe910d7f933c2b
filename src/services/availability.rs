//! The booking engine's source of truth: a calendar is free unless a
//! stored blocked period overlaps it. Appointments never consult the
//! legacy slot grid; they go through here.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::blocked_period::APPOINTMENT_REASON;
use crate::models::BlockedPeriod;
use crate::services::timerange::{self, TimeRange};
use crate::services::timezone;

pub const SLOT_STEP_MINUTES: i32 = 30;
pub const SLOTS_PER_DAY: usize = 48;
const MINUTES_PER_DAY: i32 = 1440;
// 48 half-hour slots minus one: a 00:00-23:59 block must read as full
const FULLY_BLOCKED_THRESHOLD_MINUTES: i32 = 1410;
const MAX_BLOCK_SPAN_DAYS: i64 = 365;

/// True when a consultation of `duration_minutes` can start at `start`
/// (UTC). Past instants are never available, nor is right now.
pub fn is_available(
    conn: &Connection,
    start: NaiveDateTime,
    duration_minutes: i32,
) -> Result<bool, AppError> {
    is_available_at(conn, start, duration_minutes, Utc::now().naive_utc())
}

pub fn is_available_at(
    conn: &Connection,
    start: NaiveDateTime,
    duration_minutes: i32,
    now: NaiveDateTime,
) -> Result<bool, AppError> {
    if start <= now || duration_minutes <= 0 {
        return Ok(false);
    }
    let end = start + Duration::minutes(duration_minutes as i64);
    Ok(!queries::is_time_blocked(conn, &start, &end)?)
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotAvailability {
    pub start_time: NaiveTime,
    pub available_30_min: bool,
    pub available_60_min: bool,
    pub available_90_min: bool,
}

impl SlotAvailability {
    pub fn has_any(&self) -> bool {
        self.available_30_min || self.available_60_min || self.available_90_min
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub timezone: String,
    pub fully_booked: bool,
    pub slots: Vec<SlotAvailability>,
}

/// Availability flags for all 48 half-hour starts of a local calendar
/// day, one flag per bookable duration. Blocks are fetched once for the
/// day's UTC window and compared as local minutes.
pub fn day_availability(
    conn: &Connection,
    date: NaiveDate,
    tz: Tz,
) -> Result<DayAvailability, AppError> {
    let (window_start, window_end) = timezone::day_bounds_utc(date, tz);
    let periods = queries::get_blocked_periods_overlapping(conn, &window_start, &window_end)?;
    let blocked: Vec<TimeRange> = periods
        .iter()
        .filter_map(|p| local_day_range(p, date, tz))
        .collect();

    let mut slots = Vec::with_capacity(SLOTS_PER_DAY);
    for i in 0..SLOTS_PER_DAY {
        let start_min = i as i32 * SLOT_STEP_MINUTES;
        let start_time = NaiveTime::MIN + Duration::minutes(start_min as i64);
        slots.push(SlotAvailability {
            start_time,
            available_30_min: slot_is_free(start_min, 30, &blocked),
            available_60_min: slot_is_free(start_min, 60, &blocked),
            available_90_min: slot_is_free(start_min, 90, &blocked),
        });
    }

    let fully_booked = !slots.iter().any(SlotAvailability::has_any);

    Ok(DayAvailability {
        date,
        timezone: tz.name().to_string(),
        fully_booked,
        slots,
    })
}

fn slot_is_free(start_min: i32, duration_minutes: i32, blocked: &[TimeRange]) -> bool {
    let end_min = start_min + duration_minutes;
    // bookings may not reach or cross midnight
    if end_min >= MINUTES_PER_DAY {
        return false;
    }
    let slot = TimeRange::new(start_min, end_min);
    !blocked.iter().any(|b| b.overlaps(&slot))
}

/// Projects a stored UTC period onto the wall clock of `date` in `tz`,
/// clamped to that day. None when the period does not touch the day.
fn local_day_range(period: &BlockedPeriod, date: NaiveDate, tz: Tz) -> Option<TimeRange> {
    use chrono::TimeZone;

    let day_start = date.and_time(NaiveTime::MIN);
    let day_end = day_start + Duration::days(1);

    let start_local = tz.from_utc_datetime(&period.start_utc).naive_local();
    let end_local = tz.from_utc_datetime(&period.end_utc).naive_local();

    let start = start_local.max(day_start);
    let end = end_local.min(day_end);
    if end <= start {
        return None;
    }

    Some(TimeRange::new(
        (start - day_start).num_minutes() as i32,
        (end - day_start).num_minutes() as i32,
    ))
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthAvailability {
    pub year: i32,
    pub month: u32,
    pub timezone: String,
    /// Day of month -> has any bookable time left.
    pub days: BTreeMap<u32, bool>,
}

pub fn month_availability(
    conn: &Connection,
    year: i32,
    month: u32,
    tz: Tz,
) -> Result<MonthAvailability, AppError> {
    let today = Utc::now().with_timezone(&tz).date_naive();
    month_availability_at(conn, year, month, tz, today)
}

/// Per-day bookability for a whole month, one overlap query for the
/// month's UTC window. Days before `today` read as unavailable without
/// inspection; remaining days are unavailable once their merged blocks
/// cover 23.5 hours or more.
pub fn month_availability_at(
    conn: &Connection,
    year: i32,
    month: u32,
    tz: Tz,
    today: NaiveDate,
) -> Result<MonthAvailability, AppError> {
    let first_day = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::BusinessRule(format!("Invalid month: {year}-{month}")))?;
    let next_month = first_day + Months::new(1);

    let (window_start, _) = timezone::day_bounds_utc(first_day, tz);
    let (window_end, _) = timezone::day_bounds_utc(next_month, tz);
    let periods = queries::get_blocked_periods_overlapping(conn, &window_start, &window_end)?;

    let mut days = BTreeMap::new();
    let mut date = first_day;
    while date < next_month {
        let open = if date < today {
            false
        } else {
            day_has_any_availability(&periods, date, tz)
        };
        days.insert(date.day(), open);
        date = match date.succ_opt() {
            Some(d) => d,
            None => break,
        };
    }

    Ok(MonthAvailability {
        year,
        month,
        timezone: tz.name().to_string(),
        days,
    })
}

fn day_has_any_availability(periods: &[BlockedPeriod], date: NaiveDate, tz: Tz) -> bool {
    let ranges: Vec<TimeRange> = periods
        .iter()
        .filter_map(|p| local_day_range(p, date, tz))
        .collect();
    if ranges.is_empty() {
        return true;
    }
    timerange::total_covered_minutes(&ranges) < FULLY_BLOCKED_THRESHOLD_MINUTES
}

/// Admin request to close off time. Times are wall-clock in `timezone`
/// (UTC when omitted); a date range blocks the same hours on every day.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockPeriodRequest {
    pub date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub full_day: bool,
    pub reason: String,
    pub notes: Option<String>,
    pub timezone: Option<String>,
}

pub fn block_period(
    conn: &mut Connection,
    req: &BlockPeriodRequest,
) -> Result<Vec<BlockedPeriod>, AppError> {
    if req.reason.trim().is_empty() {
        return Err(AppError::BusinessRule("Reason is required".to_string()));
    }

    let tz = match &req.timezone {
        Some(name) => timezone::parse_tz(name)?,
        None => Tz::UTC,
    };

    let end_date = req.end_date.unwrap_or(req.date);
    if end_date < req.date {
        return Err(AppError::BusinessRule(
            "End date must be after start date".to_string(),
        ));
    }
    if (end_date - req.date).num_days() >= MAX_BLOCK_SPAN_DAYS {
        return Err(AppError::BusinessRule(format!(
            "Cannot block more than {MAX_BLOCK_SPAN_DAYS} days at once"
        )));
    }

    let (start_time, end_time) = if req.full_day {
        (NaiveTime::MIN, NaiveTime::from_hms_opt(23, 59, 0).unwrap())
    } else {
        match (req.start_time, req.end_time) {
            (Some(start), Some(end)) if start < end => (start, end),
            (Some(_), Some(_)) => {
                return Err(AppError::BusinessRule(
                    "Start time must be before end time".to_string(),
                ))
            }
            _ => {
                return Err(AppError::BusinessRule(
                    "Start and end times are required unless blocking the full day".to_string(),
                ))
            }
        }
    };

    let now = Utc::now().naive_utc();
    let tx = conn.transaction()?;
    let mut created = Vec::new();
    let mut date = req.date;
    loop {
        let start_utc = timezone::local_to_utc(date.and_time(start_time), tz)?;
        let end_utc = timezone::local_to_utc(date.and_time(end_time), tz)?;

        let period = BlockedPeriod {
            id: Uuid::new_v4().to_string(),
            date: start_utc.date(),
            start_utc,
            end_utc,
            reason: req.reason.trim().to_string(),
            appointment_id: None,
            notes: req.notes.clone(),
            created_at: now,
        };
        queries::insert_blocked_period(&tx, &period)?;
        created.push(period);

        if date >= end_date {
            break;
        }
        date = match date.succ_opt() {
            Some(d) => d,
            None => break,
        };
    }
    tx.commit()?;

    tracing::info!(
        count = created.len(),
        from = %req.date,
        to = %end_date,
        reason = %req.reason.trim(),
        "blocked period created"
    );
    Ok(created)
}

pub fn unblock_period(conn: &Connection, id: &str) -> Result<(), AppError> {
    let period = queries::get_blocked_period_by_id(conn, id)?
        .ok_or_else(|| AppError::NotFound("Blocked period not found".to_string()))?;

    if period.is_appointment_derived() {
        return Err(AppError::BusinessRule(
            "Cannot unblock period associated with an appointment".to_string(),
        ));
    }

    queries::delete_blocked_period(conn, id)?;
    tracing::info!(period_id = %id, "unblocked period");
    Ok(())
}

/// Writes the blocked period that makes a booked consultation invisible
/// to other clients. The appointment row must already exist.
pub fn block_time_for_appointment(
    conn: &Connection,
    appointment_id: &str,
    start_utc: NaiveDateTime,
    duration_minutes: i32,
) -> Result<BlockedPeriod, AppError> {
    let appointment = queries::get_appointment_by_id(conn, appointment_id)?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;

    let period = BlockedPeriod {
        id: Uuid::new_v4().to_string(),
        date: start_utc.date(),
        start_utc,
        end_utc: start_utc + Duration::minutes(duration_minutes as i64),
        reason: APPOINTMENT_REASON.to_string(),
        appointment_id: Some(appointment.id),
        notes: None,
        created_at: Utc::now().naive_utc(),
    };
    queries::insert_blocked_period(conn, &period)?;

    tracing::info!(
        appointment_id = %appointment_id,
        start = %start_utc,
        duration = duration_minutes,
        "blocked time for appointment"
    );
    Ok(period)
}

/// Removes whatever blocked time the appointment owns. Safe to call for
/// appointments that never blocked anything or were already freed.
pub fn free_up_blocked_time_for_appointment(
    conn: &Connection,
    appointment_id: &str,
) -> Result<usize, AppError> {
    let count = queries::delete_blocked_periods_for_appointment(conn, appointment_id)?;
    if count > 0 {
        tracing::info!(appointment_id = %appointment_id, count, "freed blocked time");
    }
    Ok(count)
}

pub fn list_blocked_periods(
    conn: &Connection,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<Vec<BlockedPeriod>, AppError> {
    let periods = match (start_date, end_date) {
        (Some(start), Some(end)) => queries::get_blocked_periods_in_date_range(conn, start, end)?,
        (Some(start), None) => queries::get_blocked_periods_from_date(conn, start)?,
        (None, Some(end)) => queries::get_blocked_periods_until_date(conn, end)?,
        (None, None) => queries::get_all_blocked_periods(conn)?,
    };
    Ok(periods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{Appointment, AppointmentStatus, Currency};

    fn test_conn() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn montreal() -> Tz {
        "America/Montreal".parse().unwrap()
    }

    fn block_request(date: &str, start: &str, end: &str) -> BlockPeriodRequest {
        BlockPeriodRequest {
            date: d(date),
            end_date: None,
            start_time: Some(t(start)),
            end_time: Some(t(end)),
            full_day: false,
            reason: "VACATION".to_string(),
            notes: None,
            timezone: None,
        }
    }

    fn seed_appointment(conn: &Connection, id: &str, start: NaiveDateTime) {
        let now = Utc::now().naive_utc();
        let appt = Appointment {
            id: id.to_string(),
            first_name: "Nadia".to_string(),
            last_name: "Berrada".to_string(),
            email: format!("{id}@example.com"),
            phone: "+15145550123".to_string(),
            country: "Canada".to_string(),
            start_utc: start,
            duration_minutes: 60,
            consultation_type: "initial".to_string(),
            client_presentation: None,
            timezone: "America/Montreal".to_string(),
            amount_cents: 9_000,
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
    fn free_future_time_is_available() {
        let conn = test_conn();
        let now = dt("2030-06-17 09:00");
        assert!(is_available_at(&conn, dt("2030-06-17 10:00"), 60, now).unwrap());
    }

    #[test]
    fn past_and_present_are_never_available() {
        let conn = test_conn();
        let now = dt("2030-06-17 09:00");
        assert!(!is_available_at(&conn, dt("2030-06-17 08:00"), 30, now).unwrap());
        assert!(!is_available_at(&conn, now, 30, now).unwrap());
    }

    #[test]
    fn overlapping_block_makes_time_unavailable() {
        let mut conn = test_conn();
        block_period(&mut conn, &block_request("2030-06-17", "10:00", "11:00")).unwrap();
        let now = dt("2030-06-01 00:00");

        assert!(!is_available_at(&conn, dt("2030-06-17 10:00"), 30, now).unwrap());
        assert!(!is_available_at(&conn, dt("2030-06-17 09:30"), 60, now).unwrap());
        assert!(!is_available_at(&conn, dt("2030-06-17 10:30"), 90, now).unwrap());
    }

    #[test]
    fn adjacent_ranges_do_not_collide() {
        let mut conn = test_conn();
        block_period(&mut conn, &block_request("2030-06-17", "10:00", "11:00")).unwrap();
        let now = dt("2030-06-01 00:00");

        assert!(is_available_at(&conn, dt("2030-06-17 09:00"), 60, now).unwrap());
        assert!(is_available_at(&conn, dt("2030-06-17 11:00"), 60, now).unwrap());
    }

    #[test]
    fn day_view_flags_slots_per_duration() {
        let mut conn = test_conn();
        block_period(&mut conn, &block_request("2030-06-17", "10:00", "11:00")).unwrap();

        let day = day_availability(&conn, d("2030-06-17"), Tz::UTC).unwrap();
        assert_eq!(day.slots.len(), SLOTS_PER_DAY);
        assert!(!day.fully_booked);

        let slot = |time: &str| day.slots.iter().find(|s| s.start_time == t(time)).unwrap();

        assert!(slot("09:00").available_30_min);
        assert!(slot("09:00").available_60_min);
        assert!(!slot("09:00").available_90_min);

        assert!(slot("09:30").available_30_min);
        assert!(!slot("09:30").available_60_min);

        assert!(!slot("10:00").available_30_min);
        assert!(!slot("10:30").available_30_min);

        assert!(slot("11:00").available_30_min);
        assert!(slot("11:00").available_90_min);
    }

    #[test]
    fn day_view_never_offers_bookings_past_midnight() {
        let conn = test_conn();
        let day = day_availability(&conn, d("2030-06-17"), Tz::UTC).unwrap();

        let slot = |time: &str| day.slots.iter().find(|s| s.start_time == t(time)).unwrap();
        assert!(!slot("23:30").available_30_min);
        assert!(slot("23:00").available_30_min);
        assert!(!slot("23:00").available_60_min);
        assert!(slot("22:30").available_60_min);
        assert!(!slot("22:30").available_90_min);
    }

    #[test]
    fn full_day_block_reads_fully_booked() {
        let mut conn = test_conn();
        let mut req = block_request("2030-06-17", "00:00", "00:01");
        req.full_day = true;
        req.start_time = None;
        req.end_time = None;
        block_period(&mut conn, &req).unwrap();

        let day = day_availability(&conn, d("2030-06-17"), Tz::UTC).unwrap();
        assert!(day.fully_booked);
        assert!(day.slots.iter().all(|s| !s.has_any()));
    }

    #[test]
    fn day_view_projects_blocks_into_display_timezone() {
        let mut conn = test_conn();
        // 15:00-16:00 UTC is 10:00-11:00 in Montreal in January
        block_period(&mut conn, &block_request("2030-01-15", "15:00", "16:00")).unwrap();

        let day = day_availability(&conn, d("2030-01-15"), montreal()).unwrap();
        let slot = |time: &str| day.slots.iter().find(|s| s.start_time == t(time)).unwrap();

        assert!(!slot("10:00").available_30_min);
        assert!(!slot("10:30").available_30_min);
        assert!(slot("11:00").available_30_min);
        assert_eq!(day.timezone, "America/Montreal");
    }

    #[test]
    fn evening_block_lands_on_the_right_local_day() {
        let mut conn = test_conn();
        // 20:00-23:00 Montreal wall clock, stored as 01:00-04:00 UTC next day
        let mut req = block_request("2030-01-15", "20:00", "23:00");
        req.timezone = Some("America/Montreal".to_string());
        let created = block_period(&mut conn, &req).unwrap();
        assert_eq!(created[0].start_utc, dt("2030-01-16 01:00"));
        assert_eq!(created[0].date, d("2030-01-16"));

        let day = day_availability(&conn, d("2030-01-15"), montreal()).unwrap();
        let slot = |time: &str| day.slots.iter().find(|s| s.start_time == t(time)).unwrap();
        assert!(!slot("20:00").available_30_min);
        assert!(!slot("22:30").available_30_min);
        assert!(slot("19:30").available_30_min);
    }

    #[test]
    fn month_view_marks_past_and_blocked_days() {
        let mut conn = test_conn();
        let mut req = block_request("2030-06-17", "00:00", "00:01");
        req.full_day = true;
        req.start_time = None;
        req.end_time = None;
        block_period(&mut conn, &req).unwrap();
        block_period(&mut conn, &block_request("2030-06-20", "10:00", "12:00")).unwrap();

        let month = month_availability_at(&conn, 2030, 6, Tz::UTC, d("2030-06-10")).unwrap();
        assert_eq!(month.days.len(), 30);
        assert_eq!(month.days[&9], false);
        assert_eq!(month.days[&10], true);
        assert_eq!(month.days[&17], false);
        assert_eq!(month.days[&20], true);
        assert_eq!(month.days[&21], true);
    }

    #[test]
    fn month_view_merges_stacked_blocks_before_counting() {
        let mut conn = test_conn();
        // two identical 12h blocks only cover 12h; the day stays open
        block_period(&mut conn, &block_request("2030-06-17", "00:00", "12:00")).unwrap();
        block_period(&mut conn, &block_request("2030-06-17", "00:00", "12:00")).unwrap();

        let month = month_availability_at(&conn, 2030, 6, Tz::UTC, d("2030-06-01")).unwrap();
        assert_eq!(month.days[&17], true);

        // a second block pushing merged coverage past 23.5h closes it
        block_period(&mut conn, &block_request("2030-06-17", "11:00", "23:59")).unwrap();
        let month = month_availability_at(&conn, 2030, 6, Tz::UTC, d("2030-06-01")).unwrap();
        assert_eq!(month.days[&17], false);
    }

    #[test]
    fn month_view_rejects_invalid_month() {
        let conn = test_conn();
        assert!(month_availability_at(&conn, 2030, 13, Tz::UTC, d("2030-06-01")).is_err());
    }

    #[test]
    fn block_rejects_blank_reason() {
        let mut conn = test_conn();
        let mut req = block_request("2030-06-17", "10:00", "11:00");
        req.reason = "   ".to_string();
        assert!(matches!(
            block_period(&mut conn, &req),
            Err(AppError::BusinessRule(_))
        ));
    }

    #[test]
    fn block_rejects_inverted_times_and_dates() {
        let mut conn = test_conn();
        let req = block_request("2030-06-17", "11:00", "10:00");
        assert!(block_period(&mut conn, &req).is_err());

        let mut req = block_request("2030-06-17", "10:00", "11:00");
        req.end_date = Some(d("2030-06-16"));
        assert!(block_period(&mut conn, &req).is_err());
    }

    #[test]
    fn block_rejects_unknown_timezone() {
        let mut conn = test_conn();
        let mut req = block_request("2030-06-17", "10:00", "11:00");
        req.timezone = Some("Mars/Olympus_Mons".to_string());
        assert!(block_period(&mut conn, &req).is_err());
    }

    #[test]
    fn block_rejects_year_plus_ranges() {
        let mut conn = test_conn();
        let mut req = block_request("2030-06-17", "10:00", "11:00");
        req.end_date = Some(d("2031-06-17"));
        assert!(block_period(&mut conn, &req).is_err());
    }

    #[test]
    fn date_range_blocks_every_day_atomically() {
        let mut conn = test_conn();
        let mut req = block_request("2030-06-17", "10:00", "11:00");
        req.end_date = Some(d("2030-06-19"));
        let created = block_period(&mut conn, &req).unwrap();
        assert_eq!(created.len(), 3);

        let now = dt("2030-06-01 00:00");
        for day in ["2030-06-17", "2030-06-18", "2030-06-19"] {
            let start = NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap();
            assert!(!is_available_at(&conn, start, 30, now).unwrap(), "{day}");
        }
    }

    #[test]
    fn unblock_removes_manual_periods_only() {
        let mut conn = test_conn();
        let created = block_period(&mut conn, &block_request("2030-06-17", "10:00", "11:00")).unwrap();
        unblock_period(&conn, &created[0].id).unwrap();
        let now = dt("2030-06-01 00:00");
        assert!(is_available_at(&conn, dt("2030-06-17 10:00"), 30, now).unwrap());

        seed_appointment(&conn, "appt-1", dt("2030-06-18 14:00"));
        let derived =
            block_time_for_appointment(&conn, "appt-1", dt("2030-06-18 14:00"), 60).unwrap();
        assert!(matches!(
            unblock_period(&conn, &derived.id),
            Err(AppError::BusinessRule(_))
        ));
    }

    #[test]
    fn unblock_missing_period_is_not_found() {
        let conn = test_conn();
        assert!(matches!(
            unblock_period(&conn, "nope"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn appointment_block_requires_existing_appointment() {
        let conn = test_conn();
        assert!(matches!(
            block_time_for_appointment(&conn, "ghost", dt("2030-06-18 14:00"), 60),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn freeing_appointment_time_is_idempotent() {
        let conn = test_conn();
        seed_appointment(&conn, "appt-1", dt("2030-06-18 14:00"));
        block_time_for_appointment(&conn, "appt-1", dt("2030-06-18 14:00"), 60).unwrap();

        assert_eq!(free_up_blocked_time_for_appointment(&conn, "appt-1").unwrap(), 1);
        assert_eq!(free_up_blocked_time_for_appointment(&conn, "appt-1").unwrap(), 0);

        let now = dt("2030-06-01 00:00");
        assert!(is_available_at(&conn, dt("2030-06-18 14:00"), 60, now).unwrap());
    }

    #[test]
    fn listing_filters_by_date_bounds() {
        let mut conn = test_conn();
        block_period(&mut conn, &block_request("2030-06-17", "10:00", "11:00")).unwrap();
        block_period(&mut conn, &block_request("2030-06-20", "10:00", "11:00")).unwrap();
        block_period(&mut conn, &block_request("2030-07-01", "10:00", "11:00")).unwrap();

        let all = list_blocked_periods(&conn, None, None).unwrap();
        assert_eq!(all.len(), 3);

        let june = list_blocked_periods(&conn, Some(d("2030-06-01")), Some(d("2030-06-30"))).unwrap();
        assert_eq!(june.len(), 2);

        let from = list_blocked_periods(&conn, Some(d("2030-06-18")), None).unwrap();
        assert_eq!(from.len(), 2);

        let until = list_blocked_periods(&conn, None, Some(d("2030-06-18"))).unwrap();
        assert_eq!(until.len(), 1);
    }

    #[test]
    fn listing_carries_owning_appointment() {
        let conn = test_conn();
        seed_appointment(&conn, "appt-1", dt("2030-06-18 14:00"));
        block_time_for_appointment(&conn, "appt-1", dt("2030-06-18 14:00"), 60).unwrap();

        let all = list_blocked_periods(&conn, None, None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].appointment_id.as_deref(), Some("appt-1"));
        assert_eq!(all[0].reason, APPOINTMENT_REASON);
    }
}
