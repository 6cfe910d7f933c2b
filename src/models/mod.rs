pub mod appointment;
pub mod blocked_period;
pub mod document;
pub mod time_slot;

pub use appointment::{Appointment, AppointmentStatus, Currency};
pub use blocked_period::BlockedPeriod;
pub use document::Document;
pub use time_slot::TimeSlot;
