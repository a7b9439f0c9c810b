//! Shared helpers for infra integration tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use preppulse_domain::{Meeting, User};
use preppulse_infra::database::DbManager;
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary database with the schema applied.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&db_path, 4, None).expect("db manager should be created");
        manager.run_migrations().expect("migrations should run");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a connected user with a phone number.
pub fn sample_user(user_id: &str) -> User {
    let mut user = User::connected(user_id, format!("{user_id}@example.com"), "Test User");
    user.phone_number = Some("+15550100".to_string());
    user
}

/// Build a discovered meeting starting at the given instant.
pub fn sample_meeting(
    meeting_id: &str,
    external_id: &str,
    user_id: &str,
    start: DateTime<Utc>,
) -> Meeting {
    Meeting::discovered(
        meeting_id,
        Some(external_id.to_string()),
        user_id,
        "Leadership Team Sync",
        start,
        start + Duration::minutes(60),
        vec![
            "a@example.com".to_string(),
            "b@example.com".to_string(),
            "c@example.com".to_string(),
            "d@example.com".to_string(),
            "e@example.com".to_string(),
        ],
    )
}
