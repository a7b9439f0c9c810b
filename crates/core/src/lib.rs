//! # PrepPulse Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The meeting-prep orchestration pipeline services
//! - Port/adapter interfaces (traits)
//! - The rule-driven meeting classifier
//!
//! ## Architecture Principles
//! - Only depends on `preppulse-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod classification;
pub mod notify;
pub mod scan;
pub mod sync;
pub mod trigger;

// Re-export specific items to avoid ambiguity
pub use classification::MeetingClassifier;
pub use notify::ports::{ChatProvider, EmailProvider, SmsProvider};
pub use notify::{channel_priority, ChatMessage, EmailMessage, Notifier};
pub use scan::{ScanCoordinator, ScanReport};
pub use sync::ports::{CalendarSource, MeetingRepository, TriggerPublisher, UserRepository};
pub use sync::{SyncEngine, SyncOutcome};
pub use trigger::{SkipReason, TriggerHandler, TriggerOutcome};
