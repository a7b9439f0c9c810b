//! SQLite-backed implementations of the store ports

pub mod manager;
pub mod meeting_repository;
pub mod user_repository;

pub use manager::DbManager;
pub use meeting_repository::SqliteMeetingRepository;
pub use user_repository::SqliteUserRepository;
