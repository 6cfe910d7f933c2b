use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{Appointment, AppointmentStatus, BlockedPeriod, Currency, Document, TimeSlot};

// ── Appointments ──

pub fn create_appointment(conn: &Connection, appt: &Appointment) -> anyhow::Result<()> {
    let start_utc = appt.start_utc.format("%Y-%m-%d %H:%M:%S").to_string();
    let reminder_sent_at = appt
        .reminder_sent_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string());
    let created_at = appt.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
    let updated_at = appt.updated_at.format("%Y-%m-%d %H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO appointments (id, first_name, last_name, email, phone, country, start_utc, duration_minutes, consultation_type, client_presentation, timezone, amount_cents, currency, status, payment_ref, admin_notes, reminder_sent, reminder_sent_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
        params![
            appt.id,
            appt.first_name,
            appt.last_name,
            appt.email,
            appt.phone,
            appt.country,
            start_utc,
            appt.duration_minutes,
            appt.consultation_type,
            appt.client_presentation,
            appt.timezone,
            appt.amount_cents,
            appt.currency.as_str(),
            appt.status.as_str(),
            appt.payment_ref,
            appt.admin_notes,
            appt.reminder_sent,
            reminder_sent_at,
            created_at,
            updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_appointment_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Appointment>> {
    let result = conn.query_row(
        "SELECT id, first_name, last_name, email, phone, country, start_utc, duration_minutes, consultation_type, client_presentation, timezone, amount_cents, currency, status, payment_ref, admin_notes, reminder_sent, reminder_sent_at, created_at, updated_at
         FROM appointments WHERE id = ?1",
        params![id],
        |row| Ok(parse_appointment_row(row)),
    );

    match result {
        Ok(appt) => Ok(Some(appt?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn has_pending_appointment_for_email(conn: &Connection, email: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM appointments WHERE email = ?1 AND status = 'pending'",
        params![email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn get_all_appointments(conn: &Connection) -> anyhow::Result<Vec<Appointment>> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, email, phone, country, start_utc, duration_minutes, consultation_type, client_presentation, timezone, amount_cents, currency, status, payment_ref, admin_notes, reminder_sent, reminder_sent_at, created_at, updated_at
         FROM appointments ORDER BY start_utc DESC",
    )?;

    let rows = stmt.query_map([], |row| Ok(parse_appointment_row(row)))?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

pub fn get_appointments_by_status(
    conn: &Connection,
    status: AppointmentStatus,
) -> anyhow::Result<Vec<Appointment>> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, email, phone, country, start_utc, duration_minutes, consultation_type, client_presentation, timezone, amount_cents, currency, status, payment_ref, admin_notes, reminder_sent, reminder_sent_at, created_at, updated_at
         FROM appointments WHERE status = ?1 ORDER BY start_utc DESC",
    )?;

    let rows = stmt.query_map(params![status.as_str()], |row| {
        Ok(parse_appointment_row(row))
    })?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

/// Confirmed appointments, soonest first. Matches the admin dashboard's
/// idea of "upcoming": everything confirmed, past rows included.
pub fn get_upcoming_appointments(conn: &Connection) -> anyhow::Result<Vec<Appointment>> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, email, phone, country, start_utc, duration_minutes, consultation_type, client_presentation, timezone, amount_cents, currency, status, payment_ref, admin_notes, reminder_sent, reminder_sent_at, created_at, updated_at
         FROM appointments WHERE status = 'confirmed' ORDER BY start_utc ASC",
    )?;

    let rows = stmt.query_map([], |row| Ok(parse_appointment_row(row)))?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

pub fn update_appointment(conn: &Connection, appt: &Appointment) -> anyhow::Result<bool> {
    let start_utc = appt.start_utc.format("%Y-%m-%d %H:%M:%S").to_string();
    let now = Utc::now()
        .naive_utc()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    let count = conn.execute(
        "UPDATE appointments SET start_utc = ?1, duration_minutes = ?2, consultation_type = ?3, status = ?4, admin_notes = ?5, updated_at = ?6 WHERE id = ?7",
        params![
            start_utc,
            appt.duration_minutes,
            appt.consultation_type,
            appt.status.as_str(),
            appt.admin_notes,
            now,
            appt.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn set_appointment_status(
    conn: &Connection,
    id: &str,
    status: AppointmentStatus,
) -> anyhow::Result<bool> {
    let now = Utc::now()
        .naive_utc()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let count = conn.execute(
        "UPDATE appointments SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now, id],
    )?;
    Ok(count > 0)
}

pub fn confirm_appointment_payment(
    conn: &Connection,
    id: &str,
    payment_ref: &str,
) -> anyhow::Result<bool> {
    let now = Utc::now()
        .naive_utc()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let count = conn.execute(
        "UPDATE appointments SET status = 'confirmed', payment_ref = ?1, updated_at = ?2 WHERE id = ?3",
        params![payment_ref, now, id],
    )?;
    Ok(count > 0)
}

/// Confirmed appointments starting inside [start, end) that have not been
/// reminded yet.
pub fn get_unreminded_confirmed_in_window(
    conn: &Connection,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> anyhow::Result<Vec<Appointment>> {
    let start_str = start.format("%Y-%m-%d %H:%M:%S").to_string();
    let end_str = end.format("%Y-%m-%d %H:%M:%S").to_string();

    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, email, phone, country, start_utc, duration_minutes, consultation_type, client_presentation, timezone, amount_cents, currency, status, payment_ref, admin_notes, reminder_sent, reminder_sent_at, created_at, updated_at
         FROM appointments WHERE status = 'confirmed' AND reminder_sent = 0 AND start_utc >= ?1 AND start_utc < ?2 ORDER BY start_utc ASC",
    )?;

    let rows = stmt.query_map(params![start_str, end_str], |row| {
        Ok(parse_appointment_row(row))
    })?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

pub fn get_confirmed_in_window(
    conn: &Connection,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> anyhow::Result<Vec<Appointment>> {
    let start_str = start.format("%Y-%m-%d %H:%M:%S").to_string();
    let end_str = end.format("%Y-%m-%d %H:%M:%S").to_string();

    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, email, phone, country, start_utc, duration_minutes, consultation_type, client_presentation, timezone, amount_cents, currency, status, payment_ref, admin_notes, reminder_sent, reminder_sent_at, created_at, updated_at
         FROM appointments WHERE status = 'confirmed' AND start_utc >= ?1 AND start_utc < ?2 ORDER BY start_utc ASC",
    )?;

    let rows = stmt.query_map(params![start_str, end_str], |row| {
        Ok(parse_appointment_row(row))
    })?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

pub fn mark_reminder_sent(
    conn: &Connection,
    id: &str,
    at: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let at_str = at.format("%Y-%m-%d %H:%M:%S").to_string();
    let count = conn.execute(
        "UPDATE appointments SET reminder_sent = 1, reminder_sent_at = ?1, updated_at = ?1 WHERE id = ?2",
        params![at_str, id],
    )?;
    Ok(count > 0)
}

fn parse_appointment_row(row: &rusqlite::Row) -> anyhow::Result<Appointment> {
    let id: String = row.get(0)?;
    let first_name: String = row.get(1)?;
    let last_name: String = row.get(2)?;
    let email: String = row.get(3)?;
    let phone: String = row.get(4)?;
    let country: String = row.get(5)?;
    let start_utc_str: String = row.get(6)?;
    let duration_minutes: i32 = row.get(7)?;
    let consultation_type: String = row.get(8)?;
    let client_presentation: Option<String> = row.get(9)?;
    let timezone: String = row.get(10)?;
    let amount_cents: i64 = row.get(11)?;
    let currency_str: String = row.get(12)?;
    let status_str: String = row.get(13)?;
    let payment_ref: Option<String> = row.get(14)?;
    let admin_notes: Option<String> = row.get(15)?;
    let reminder_sent: bool = row.get(16)?;
    let reminder_sent_at_str: Option<String> = row.get(17)?;
    let created_at_str: String = row.get(18)?;
    let updated_at_str: String = row.get(19)?;

    let start_utc = NaiveDateTime::parse_from_str(&start_utc_str, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let reminder_sent_at = reminder_sent_at_str
        .and_then(|s| NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S").ok());
    let created_at = NaiveDateTime::parse_from_str(&created_at_str, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at = NaiveDateTime::parse_from_str(&updated_at_str, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc());

    Ok(Appointment {
        id,
        first_name,
        last_name,
        email,
        phone,
        country,
        start_utc,
        duration_minutes,
        consultation_type,
        client_presentation,
        timezone,
        amount_cents,
        currency: Currency::from_str(&currency_str),
        status: AppointmentStatus::from_str(&status_str),
        payment_ref,
        admin_notes,
        reminder_sent,
        reminder_sent_at,
        created_at,
        updated_at,
    })
}

// ── Blocked periods ──

pub fn insert_blocked_period(conn: &Connection, period: &BlockedPeriod) -> anyhow::Result<()> {
    let date = period.date.format("%Y-%m-%d").to_string();
    let start_utc = period.start_utc.format("%Y-%m-%d %H:%M:%S").to_string();
    let end_utc = period.end_utc.format("%Y-%m-%d %H:%M:%S").to_string();
    let created_at = period.created_at.format("%Y-%m-%d %H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO blocked_periods (id, date, start_utc, end_utc, reason, appointment_id, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            period.id,
            date,
            start_utc,
            end_utc,
            period.reason,
            period.appointment_id,
            period.notes,
            created_at,
        ],
    )?;
    Ok(())
}

pub fn get_blocked_period_by_id(
    conn: &Connection,
    id: &str,
) -> anyhow::Result<Option<BlockedPeriod>> {
    let result = conn.query_row(
        "SELECT id, date, start_utc, end_utc, reason, appointment_id, notes, created_at
         FROM blocked_periods WHERE id = ?1",
        params![id],
        |row| Ok(parse_blocked_period_row(row)),
    );

    match result {
        Ok(period) => Ok(Some(period?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// True when any stored period overlaps [start, end). Half-open on both
/// sides, so back-to-back ranges do not collide.
pub fn is_time_blocked(
    conn: &Connection,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let start_str = start.format("%Y-%m-%d %H:%M:%S").to_string();
    let end_str = end.format("%Y-%m-%d %H:%M:%S").to_string();

    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM blocked_periods WHERE start_utc < ?2 AND end_utc > ?1",
        params![start_str, end_str],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn get_blocked_periods_overlapping(
    conn: &Connection,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> anyhow::Result<Vec<BlockedPeriod>> {
    let start_str = start.format("%Y-%m-%d %H:%M:%S").to_string();
    let end_str = end.format("%Y-%m-%d %H:%M:%S").to_string();

    let mut stmt = conn.prepare(
        "SELECT id, date, start_utc, end_utc, reason, appointment_id, notes, created_at
         FROM blocked_periods WHERE start_utc < ?2 AND end_utc > ?1 ORDER BY start_utc ASC",
    )?;

    let rows = stmt.query_map(params![start_str, end_str], |row| {
        Ok(parse_blocked_period_row(row))
    })?;

    let mut periods = vec![];
    for row in rows {
        periods.push(row??);
    }
    Ok(periods)
}

pub fn get_blocked_periods_in_date_range(
    conn: &Connection,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> anyhow::Result<Vec<BlockedPeriod>> {
    let start_str = start_date.format("%Y-%m-%d").to_string();
    let end_str = end_date.format("%Y-%m-%d").to_string();

    let mut stmt = conn.prepare(
        "SELECT id, date, start_utc, end_utc, reason, appointment_id, notes, created_at
         FROM blocked_periods WHERE date >= ?1 AND date <= ?2 ORDER BY start_utc ASC",
    )?;

    let rows = stmt.query_map(params![start_str, end_str], |row| {
        Ok(parse_blocked_period_row(row))
    })?;

    let mut periods = vec![];
    for row in rows {
        periods.push(row??);
    }
    Ok(periods)
}

pub fn get_blocked_periods_from_date(
    conn: &Connection,
    start_date: NaiveDate,
) -> anyhow::Result<Vec<BlockedPeriod>> {
    let start_str = start_date.format("%Y-%m-%d").to_string();

    let mut stmt = conn.prepare(
        "SELECT id, date, start_utc, end_utc, reason, appointment_id, notes, created_at
         FROM blocked_periods WHERE date >= ?1 ORDER BY start_utc ASC",
    )?;

    let rows = stmt.query_map(params![start_str], |row| Ok(parse_blocked_period_row(row)))?;

    let mut periods = vec![];
    for row in rows {
        periods.push(row??);
    }
    Ok(periods)
}

pub fn get_blocked_periods_until_date(
    conn: &Connection,
    end_date: NaiveDate,
) -> anyhow::Result<Vec<BlockedPeriod>> {
    let end_str = end_date.format("%Y-%m-%d").to_string();

    let mut stmt = conn.prepare(
        "SELECT id, date, start_utc, end_utc, reason, appointment_id, notes, created_at
         FROM blocked_periods WHERE date <= ?1 ORDER BY start_utc ASC",
    )?;

    let rows = stmt.query_map(params![end_str], |row| Ok(parse_blocked_period_row(row)))?;

    let mut periods = vec![];
    for row in rows {
        periods.push(row??);
    }
    Ok(periods)
}

pub fn get_all_blocked_periods(conn: &Connection) -> anyhow::Result<Vec<BlockedPeriod>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, start_utc, end_utc, reason, appointment_id, notes, created_at
         FROM blocked_periods ORDER BY start_utc ASC",
    )?;

    let rows = stmt.query_map([], |row| Ok(parse_blocked_period_row(row)))?;

    let mut periods = vec![];
    for row in rows {
        periods.push(row??);
    }
    Ok(periods)
}

pub fn get_blocked_periods_for_appointment(
    conn: &Connection,
    appointment_id: &str,
) -> anyhow::Result<Vec<BlockedPeriod>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, start_utc, end_utc, reason, appointment_id, notes, created_at
         FROM blocked_periods WHERE appointment_id = ?1 ORDER BY start_utc ASC",
    )?;

    let rows = stmt.query_map(params![appointment_id], |row| {
        Ok(parse_blocked_period_row(row))
    })?;

    let mut periods = vec![];
    for row in rows {
        periods.push(row??);
    }
    Ok(periods)
}

pub fn delete_blocked_period(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM blocked_periods WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn delete_blocked_periods_for_appointment(
    conn: &Connection,
    appointment_id: &str,
) -> anyhow::Result<usize> {
    let count = conn.execute(
        "DELETE FROM blocked_periods WHERE appointment_id = ?1",
        params![appointment_id],
    )?;
    Ok(count)
}

fn parse_blocked_period_row(row: &rusqlite::Row) -> anyhow::Result<BlockedPeriod> {
    let id: String = row.get(0)?;
    let date_str: String = row.get(1)?;
    let start_utc_str: String = row.get(2)?;
    let end_utc_str: String = row.get(3)?;
    let reason: String = row.get(4)?;
    let appointment_id: Option<String> = row.get(5)?;
    let notes: Option<String> = row.get(6)?;
    let created_at_str: String = row.get(7)?;

    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .unwrap_or_else(|_| Utc::now().date_naive());
    let start_utc = NaiveDateTime::parse_from_str(&start_utc_str, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let end_utc = NaiveDateTime::parse_from_str(&end_utc_str, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let created_at = NaiveDateTime::parse_from_str(&created_at_str, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc());

    Ok(BlockedPeriod {
        id,
        date,
        start_utc,
        end_utc,
        reason,
        appointment_id,
        notes,
        created_at,
    })
}

// ── Time slots ──

pub fn insert_time_slot(conn: &Connection, slot: &TimeSlot) -> anyhow::Result<()> {
    let date = slot.date.format("%Y-%m-%d").to_string();
    let start_time = slot.start_time.format("%H:%M").to_string();
    let end_time = slot.end_time.format("%H:%M").to_string();

    conn.execute(
        "INSERT INTO time_slots (id, date, start_time, end_time, available, appointment_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            slot.id,
            date,
            start_time,
            end_time,
            slot.available,
            slot.appointment_id,
        ],
    )?;
    Ok(())
}

pub fn get_time_slots_for_date(conn: &Connection, date: NaiveDate) -> anyhow::Result<Vec<TimeSlot>> {
    let date_str = date.format("%Y-%m-%d").to_string();

    let mut stmt = conn.prepare(
        "SELECT id, date, start_time, end_time, available, appointment_id
         FROM time_slots WHERE date = ?1 ORDER BY start_time ASC",
    )?;

    let rows = stmt.query_map(params![date_str], |row| Ok(parse_time_slot_row(row)))?;

    let mut slots = vec![];
    for row in rows {
        slots.push(row??);
    }
    Ok(slots)
}

pub fn get_available_time_slots_for_date(
    conn: &Connection,
    date: NaiveDate,
) -> anyhow::Result<Vec<TimeSlot>> {
    let date_str = date.format("%Y-%m-%d").to_string();

    let mut stmt = conn.prepare(
        "SELECT id, date, start_time, end_time, available, appointment_id
         FROM time_slots WHERE date = ?1 AND available = 1 ORDER BY start_time ASC",
    )?;

    let rows = stmt.query_map(params![date_str], |row| Ok(parse_time_slot_row(row)))?;

    let mut slots = vec![];
    for row in rows {
        slots.push(row??);
    }
    Ok(slots)
}

pub fn get_time_slot_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<TimeSlot>> {
    let result = conn.query_row(
        "SELECT id, date, start_time, end_time, available, appointment_id
         FROM time_slots WHERE id = ?1",
        params![id],
        |row| Ok(parse_time_slot_row(row)),
    );

    match result {
        Ok(slot) => Ok(Some(slot?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn time_slot_exists(
    conn: &Connection,
    date: NaiveDate,
    start_time: NaiveTime,
) -> anyhow::Result<bool> {
    let date_str = date.format("%Y-%m-%d").to_string();
    let start_str = start_time.format("%H:%M").to_string();

    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM time_slots WHERE date = ?1 AND start_time = ?2",
        params![date_str, start_str],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn set_time_slot_availability(
    conn: &Connection,
    id: &str,
    available: bool,
    appointment_id: Option<&str>,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE time_slots SET available = ?1, appointment_id = ?2 WHERE id = ?3",
        params![available, appointment_id, id],
    )?;
    Ok(count > 0)
}

pub fn release_time_slots_for_appointment(
    conn: &Connection,
    appointment_id: &str,
) -> anyhow::Result<usize> {
    let count = conn.execute(
        "UPDATE time_slots SET available = 1, appointment_id = NULL WHERE appointment_id = ?1",
        params![appointment_id],
    )?;
    Ok(count)
}

fn parse_time_slot_row(row: &rusqlite::Row) -> anyhow::Result<TimeSlot> {
    let id: String = row.get(0)?;
    let date_str: String = row.get(1)?;
    let start_time_str: String = row.get(2)?;
    let end_time_str: String = row.get(3)?;
    let available: bool = row.get(4)?;
    let appointment_id: Option<String> = row.get(5)?;

    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .unwrap_or_else(|_| Utc::now().date_naive());
    let start_time = NaiveTime::parse_from_str(&start_time_str, "%H:%M").unwrap_or(NaiveTime::MIN);
    let end_time = NaiveTime::parse_from_str(&end_time_str, "%H:%M").unwrap_or(NaiveTime::MIN);

    Ok(TimeSlot {
        id,
        date,
        start_time,
        end_time,
        available,
        appointment_id,
    })
}

// ── Documents ──

pub fn insert_document(conn: &Connection, doc: &Document) -> anyhow::Result<()> {
    let uploaded_at = doc.uploaded_at.format("%Y-%m-%d %H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO documents (id, appointment_id, file_name, content_type, storage_key, size_bytes, uploaded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            doc.id,
            doc.appointment_id,
            doc.file_name,
            doc.content_type,
            doc.storage_key,
            doc.size_bytes,
            uploaded_at,
        ],
    )?;
    Ok(())
}

pub fn get_documents_for_appointment(
    conn: &Connection,
    appointment_id: &str,
) -> anyhow::Result<Vec<Document>> {
    let mut stmt = conn.prepare(
        "SELECT id, appointment_id, file_name, content_type, storage_key, size_bytes, uploaded_at
         FROM documents WHERE appointment_id = ?1 ORDER BY uploaded_at ASC",
    )?;

    let rows = stmt.query_map(params![appointment_id], |row| Ok(parse_document_row(row)))?;

    let mut docs = vec![];
    for row in rows {
        docs.push(row??);
    }
    Ok(docs)
}

fn parse_document_row(row: &rusqlite::Row) -> anyhow::Result<Document> {
    let id: String = row.get(0)?;
    let appointment_id: String = row.get(1)?;
    let file_name: String = row.get(2)?;
    let content_type: String = row.get(3)?;
    let storage_key: String = row.get(4)?;
    let size_bytes: i64 = row.get(5)?;
    let uploaded_at_str: String = row.get(6)?;

    let uploaded_at = NaiveDateTime::parse_from_str(&uploaded_at_str, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc());

    Ok(Document {
        id,
        appointment_id,
        file_name,
        content_type,
        storage_key,
        size_bytes,
        uploaded_at,
    })
}
