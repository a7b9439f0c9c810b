//! Periodic full-population scan

pub mod service;

pub use service::{ScanCoordinator, ScanReport};
