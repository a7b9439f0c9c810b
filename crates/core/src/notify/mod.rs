//! Multi-channel notification delivery

pub mod message;
pub mod ports;
pub mod service;

pub use message::{ChatMessage, EmailMessage};
pub use service::{channel_priority, Notifier};
