pub mod appointments;
pub mod availability;
pub mod calendar;
pub mod notifications;
pub mod reminders;
pub mod slots;
pub mod timerange;
pub mod timezone;
