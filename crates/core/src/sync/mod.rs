//! Per-user calendar reconciliation

pub mod ports;
pub mod service;

pub use service::{SyncEngine, SyncOutcome};
