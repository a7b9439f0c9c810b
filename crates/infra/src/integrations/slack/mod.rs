//! Slack integration.

pub mod client;

pub use client::SlackClient;
