//! Meeting classification domain

pub mod service;

pub use service::MeetingClassifier;
