//! Trigger event publishing.

pub mod publisher;

pub use publisher::HttpTriggerPublisher;
