//! Event-driven prep trigger handling

pub mod service;

pub use service::{SkipReason, TriggerHandler, TriggerOutcome};
