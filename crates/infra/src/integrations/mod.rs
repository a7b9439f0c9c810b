//! External service integrations.

pub mod calendar;
pub mod email;
pub mod slack;
pub mod twilio;
