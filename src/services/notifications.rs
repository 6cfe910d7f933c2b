use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::Appointment;
use crate::services::timezone;
use crate::state::AppState;

/// Outbound email sink. Deliveries are best-effort; callers fire and
/// forget, and a failed send never fails the request that queued it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

pub struct HttpEmailProvider {
    api_url: String,
    api_key: String,
    from: String,
    client: reqwest::Client,
}

impl HttpEmailProvider {
    pub fn new(api_url: String, api_key: String, from: String) -> Self {
        Self {
            api_url,
            api_key,
            from,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for HttpEmailProvider {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        self.client
            .post(&self.api_url)
            .basic_auth("api", Some(&self.api_key))
            .form(&[
                ("from", self.from.as_str()),
                ("to", to),
                ("subject", subject),
                ("text", body),
            ])
            .send()
            .await
            .context("failed to send email request")?
            .error_for_status()
            .context("mail API returned error")?;

        Ok(())
    }
}

/// Used when no mail API is configured; logs the send and drops it.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> anyhow::Result<()> {
        tracing::info!(to = %to, subject = %subject, "mail API not configured, dropping email");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Email {
    pub subject: String,
    pub body: String,
}

/// Sends an email on a background task. The caller's response never
/// waits on the mail API; failures are logged and swallowed.
pub fn dispatch(state: &Arc<AppState>, to: String, email: Email) {
    let state = Arc::clone(state);
    tokio::spawn(async move {
        if let Err(e) = state.notifier.send(&to, &email.subject, &email.body).await {
            tracing::warn!(error = %e, to = %to, subject = %email.subject, "failed to send email");
        }
    });
}

// ── message builders ──
//
// All client-facing times are rendered in the appointment's timezone.

pub fn booking_received(appt: &Appointment, company: &str) -> Email {
    let when = timezone::format_email_datetime(appt.start_utc, &appt.timezone);
    Email {
        subject: format!("Appointment Confirmation - {company}"),
        body: format!(
            "Dear {first},\n\n\
             Thank you for booking a consultation with {company}.\n\n\
             Date: {when}\n\
             Duration: {duration} minutes\n\
             Consultation type: {kind}\n\
             Amount due: {amount}\n\n\
             Your time is reserved and will be confirmed once payment is received.\n\
             Booking reference: {id}\n\n\
             {company}\n",
            first = appt.first_name,
            duration = appt.duration_minutes,
            kind = appt.consultation_type,
            amount = format_amount(appt),
            id = appt.id,
        ),
    }
}

pub fn payment_receipt(appt: &Appointment, payment_ref: &str, company: &str) -> Email {
    let when = timezone::format_email_datetime(appt.start_utc, &appt.timezone);
    Email {
        subject: format!("Payment Receipt - {company}"),
        body: format!(
            "Dear {first},\n\n\
             We have received your payment of {amount}.\n\
             Payment reference: {payment_ref}\n\n\
             Your consultation on {when} is confirmed.\n\
             We look forward to speaking with you.\n\n\
             {company}\n",
            first = appt.first_name,
            amount = format_amount(appt),
        ),
    }
}

pub fn appointment_reminder(appt: &Appointment, company: &str) -> Email {
    let when = timezone::format_email_datetime(appt.start_utc, &appt.timezone);
    let at = timezone::format_email_time(appt.start_utc, &appt.timezone);
    Email {
        subject: format!("Appointment Reminder - Tomorrow at {at}"),
        body: format!(
            "Dear {first},\n\n\
             This is a reminder of your consultation tomorrow.\n\n\
             Date: {when}\n\
             Duration: {duration} minutes\n\
             Consultation type: {kind}\n\n\
             {company}\n",
            first = appt.first_name,
            duration = appt.duration_minutes,
            kind = appt.consultation_type,
        ),
    }
}

pub fn cancellation(appt: &Appointment, company: &str) -> Email {
    let when = timezone::format_email_datetime(appt.start_utc, &appt.timezone);
    Email {
        subject: format!("Appointment Cancelled - {company}"),
        body: format!(
            "Dear {first},\n\n\
             Your consultation on {when} has been cancelled.\n\n\
             If you did not request this change, please contact us.\n\n\
             {company}\n",
            first = appt.first_name,
        ),
    }
}

pub fn documents_received(appt: &Appointment, file_names: &[String], company: &str) -> Email {
    let when = timezone::format_email_datetime(appt.start_utc, &appt.timezone);
    let mut listing = String::new();
    for name in file_names {
        listing.push_str("  - ");
        listing.push_str(name);
        listing.push('\n');
    }
    Email {
        subject: format!("Documents Received - {company}"),
        body: format!(
            "Dear {first},\n\n\
             We received the following for your consultation on {when}:\n\n\
             {listing}\n\
             They will be reviewed before your appointment.\n\n\
             {company}\n",
            first = appt.first_name,
        ),
    }
}

/// Admin digest of a day's confirmed appointments, times in UTC.
pub fn daily_summary(appointments: &[Appointment], date: NaiveDate, company: &str) -> Email {
    let mut lines = String::new();
    for appt in appointments {
        lines.push_str(&format!(
            "  {} UTC - {} - {} ({} min)\n",
            appt.start_utc.format("%H:%M"),
            appt.client_name(),
            appt.consultation_type,
            appt.duration_minutes,
        ));
    }
    Email {
        subject: format!("Daily Schedule for {} - {company}", date.format("%B %-d, %Y")),
        body: format!(
            "Confirmed appointments for {}:\n\n{lines}",
            date.format("%A, %B %-d, %Y"),
        ),
    }
}

fn format_amount(appt: &Appointment) -> String {
    format!(
        "{}.{:02} {}",
        appt.amount_cents / 100,
        appt.amount_cents % 100,
        appt.currency.as_str()
    )
}
