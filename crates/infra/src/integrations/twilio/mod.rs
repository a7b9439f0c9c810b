//! Twilio SMS integration.

pub mod client;

pub use client::TwilioClient;
