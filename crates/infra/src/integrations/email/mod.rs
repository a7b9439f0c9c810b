//! Transactional email integration.

pub mod client;

pub use client::EmailApiClient;
