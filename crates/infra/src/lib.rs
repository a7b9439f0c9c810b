//! # PrepPulse Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Database implementations (SQLite/SQLCipher)
//! - Calendar and notification provider HTTP clients
//! - Event-bus publishing
//! - Configuration loading and the periodic scan scheduler
//!
//! ## Architecture
//! - Implements traits defined in `preppulse-core`
//! - Depends on `preppulse-domain` and `preppulse-core`
//! - Contains all "impure" code (I/O, external services)

pub mod config;
pub mod database;
pub mod errors;
pub mod events;
pub mod integrations;
pub mod scheduling;

// Re-export commonly used items
pub use database::{DbManager, SqliteMeetingRepository, SqliteUserRepository};
pub use errors::InfraError;
pub use events::HttpTriggerPublisher;
pub use integrations::calendar::GoogleCalendarSource;
pub use integrations::email::EmailApiClient;
pub use integrations::slack::SlackClient;
pub use integrations::twilio::TwilioClient;
pub use scheduling::{ScanScheduler, ScanSchedulerConfig, SchedulerError, SchedulerResult};
