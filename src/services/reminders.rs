use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

use crate::db::queries;
use crate::errors::AppError;
use crate::services::notifications;
use crate::state::AppState;

/// How far ahead of the start a client is reminded.
const REMINDER_LEAD_HOURS: i64 = 24;
/// Hour of day, UTC, at which the admin digest goes out.
const SUMMARY_HOUR_UTC: u32 = 9;
const TICK_SECS: u64 = 3600;

/// Background task: hourly reminder sweep plus one admin digest per day.
pub async fn run_reminder_loop(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(TICK_SECS));
    let mut last_summary: Option<NaiveDate> = None;
    loop {
        interval.tick().await;
        let now = Utc::now().naive_utc();

        match send_due_reminders(&state, now).await {
            Ok(0) => {}
            Ok(count) => tracing::info!(count, "sent appointment reminders"),
            Err(e) => tracing::error!(error = %e, "reminder sweep failed"),
        }

        if now.hour() == SUMMARY_HOUR_UTC && last_summary != Some(now.date()) {
            match send_daily_summary(&state, now.date()).await {
                Ok(true) => tracing::info!(date = %now.date(), "sent daily summary"),
                Ok(false) => {}
                Err(e) => tracing::error!(error = %e, "daily summary failed"),
            }
            last_summary = Some(now.date());
        }
    }
}

/// Reminds confirmed appointments starting 24 to 25 hours from `now`.
/// The flag flips only after a successful send, so a failed address is
/// retried on the next sweep without stopping the rest of the batch.
pub async fn send_due_reminders(
    state: &Arc<AppState>,
    now: NaiveDateTime,
) -> Result<usize, AppError> {
    let window_start = now + Duration::hours(REMINDER_LEAD_HOURS);
    let window_end = window_start + Duration::hours(1);

    let due = {
        let db = state.db.lock().unwrap();
        queries::get_unreminded_confirmed_in_window(&db, &window_start, &window_end)?
    };

    let mut sent = 0;
    for appt in due {
        let email = notifications::appointment_reminder(&appt, &state.config.company_name);
        if let Err(e) = state
            .notifier
            .send(&appt.email, &email.subject, &email.body)
            .await
        {
            tracing::error!(error = %e, appointment_id = %appt.id, "failed to send reminder");
            continue;
        }
        {
            let db = state.db.lock().unwrap();
            queries::mark_reminder_sent(&db, &appt.id, &now)?;
        }
        sent += 1;
    }
    Ok(sent)
}

/// Mails the admin a digest of the day's confirmed appointments.
/// Returns false when there is nothing to send or nowhere to send it.
pub async fn send_daily_summary(
    state: &Arc<AppState>,
    today: NaiveDate,
) -> Result<bool, AppError> {
    if state.config.admin_email.is_empty() {
        tracing::warn!("ADMIN_EMAIL not configured, skipping daily summary");
        return Ok(false);
    }

    let day_start = today.and_time(NaiveTime::MIN);
    let day_end = day_start + Duration::days(1);
    let confirmed = {
        let db = state.db.lock().unwrap();
        queries::get_confirmed_in_window(&db, &day_start, &day_end)?
    };
    if confirmed.is_empty() {
        return Ok(false);
    }

    let email = notifications::daily_summary(&confirmed, today, &state.config.company_name);
    if let Err(e) = state
        .notifier
        .send(&state.config.admin_email, &email.subject, &email.body)
        .await
    {
        tracing::error!(error = %e, "failed to send daily summary");
        return Ok(false);
    }
    Ok(true)
}
