//! Port interfaces for the sync pipeline

use async_trait::async_trait;
use preppulse_domain::{Meeting, PrepTriggerEvent, Result, User};

/// Trait for the durable meeting store.
///
/// Full-item upserts only; there are no partial updates. Concurrent writers
/// are coordinated solely through the status guards in the services.
#[async_trait]
pub trait MeetingRepository: Send + Sync {
    /// Get a meeting by its system-assigned id
    async fn get(&self, meeting_id: &str) -> Result<Option<Meeting>>;

    /// Look up a meeting by its sync dedup key
    async fn find_by_external_id(
        &self,
        user_id: &str,
        external_id: &str,
    ) -> Result<Option<Meeting>>;

    /// Insert or fully replace a meeting row
    async fn put(&self, meeting: &Meeting) -> Result<()>;
}

/// Trait for the read-only user store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by id
    async fn get(&self, user_id: &str) -> Result<Option<User>>;

    /// Page through users with an active calendar connection
    async fn list_calendar_connected(&self, limit: usize, offset: usize) -> Result<Vec<User>>;
}

/// Trait for the external calendar source.
///
/// The source owns its OAuth token refresh, excludes all-day events, and
/// drops events missing a start time.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Fetch a user's upcoming meetings within the lookahead window
    async fn fetch_upcoming_meetings(
        &self,
        user: &User,
        days_ahead: i64,
        max_results: usize,
    ) -> Result<Vec<Meeting>>;
}

/// Trait for the at-least-once trigger event sink.
#[async_trait]
pub trait TriggerPublisher: Send + Sync {
    /// Publish one prep trigger event.
    ///
    /// Partial publish failure must surface as an error, never be silently
    /// swallowed.
    async fn publish(&self, event: &PrepTriggerEvent) -> Result<()>;
}
