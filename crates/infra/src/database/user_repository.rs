//! SQLite-backed implementation of the UserRepository port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use preppulse_core::UserRepository;
use preppulse_domain::{NotificationPreferences, Result, User};
use rusqlite::types::Type;
use rusqlite::{Row, ToSql};
use tracing::{debug, instrument};

use super::manager::DbManager;
use crate::errors::InfraError;

const USER_COLUMNS: &str = "user_id, email, name, phone_number, calendar_connected,
        timezone, notification_preferences, created_at, updated_at";

/// SQLite implementation of UserRepository.
///
/// The pipeline reads users; `put` exists for seeding and tests only.
pub struct SqliteUserRepository {
    db: Arc<DbManager>,
}

impl SqliteUserRepository {
    /// Create a new user repository on the shared pool.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert or fully replace a user row.
    pub fn put(&self, user: &User) -> Result<()> {
        let conn = self.db.get_connection()?;

        let preferences = serde_json::to_string(&user.notification_preferences)
            .map_err(|e| preppulse_domain::PrepPulseError::Internal(e.to_string()))?;

        conn.execute(
            "INSERT INTO users (
                user_id, email, name, phone_number, calendar_connected,
                timezone, notification_preferences, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(user_id) DO UPDATE SET
                email = excluded.email,
                name = excluded.name,
                phone_number = excluded.phone_number,
                calendar_connected = excluded.calendar_connected,
                timezone = excluded.timezone,
                notification_preferences = excluded.notification_preferences,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at",
            [
                &user.user_id as &dyn ToSql,
                &user.email,
                &user.name,
                &user.phone_number,
                &user.calendar_connected,
                &user.timezone,
                &preferences,
                &user.created_at.to_rfc3339(),
                &user.updated_at.to_rfc3339(),
            ]
            .as_ref(),
        )
        .map_err(InfraError::from)?;

        Ok(())
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    #[instrument(skip(self))]
    async fn get(&self, user_id: &str) -> Result<Option<User>> {
        let conn = self.db.get_connection()?;

        let result = conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
            [user_id],
            user_from_row,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(InfraError::from(e).into()),
        }
    }

    #[instrument(skip(self))]
    async fn list_calendar_connected(&self, limit: usize, offset: usize) -> Result<Vec<User>> {
        let conn = self.db.get_connection()?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users
                 WHERE calendar_connected = 1
                 ORDER BY user_id ASC
                 LIMIT ?1 OFFSET ?2"
            ))
            .map_err(InfraError::from)?;

        let users = stmt
            .query_map([limit as i64, offset as i64], user_from_row)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(InfraError::from)?;

        debug!(limit, offset, count = users.len(), "listed calendar-connected users");

        Ok(users)
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let preferences: String = row.get(6)?;
    let notification_preferences: NotificationPreferences = serde_json::from_str(&preferences)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;

    Ok(User {
        user_id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        phone_number: row.get(3)?,
        calendar_connected: row.get(4)?,
        timezone: row.get(5)?,
        notification_preferences,
        created_at: parse_timestamp(7, row.get(7)?)?,
        updated_at: parse_timestamp(8, row.get(8)?)?,
    })
}

fn parse_timestamp(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn setup_repo() -> (SqliteUserRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Arc::new(DbManager::new(temp_dir.path().join("test.db"), 2, None).unwrap());
        db.run_migrations().unwrap();
        (SqliteUserRepository::new(db), temp_dir)
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let (repo, _temp) = setup_repo();

        let mut user = User::connected("user-1", "ana@example.com", "Ana");
        user.phone_number = Some("+15550100".into());
        repo.put(&user).unwrap();

        let stored = repo.get("user-1").await.unwrap().expect("user found");
        assert_eq!(stored.email, "ana@example.com");
        assert_eq!(stored.phone_number.as_deref(), Some("+15550100"));
        assert!(stored.calendar_connected);
        assert!(stored.notification_preferences.prep_reminders);
    }

    #[tokio::test]
    async fn listing_skips_disconnected_users_and_paginates() {
        let (repo, _temp) = setup_repo();

        for i in 0..5 {
            let mut user = User::connected(
                format!("user-{i}"),
                format!("u{i}@example.com"),
                format!("User {i}"),
            );
            user.calendar_connected = i != 2;
            repo.put(&user).unwrap();
        }

        let first = repo.list_calendar_connected(2, 0).await.unwrap();
        assert_eq!(
            first.iter().map(|u| u.user_id.as_str()).collect::<Vec<_>>(),
            vec!["user-0", "user-1"]
        );

        let rest = repo.list_calendar_connected(10, 2).await.unwrap();
        assert_eq!(
            rest.iter().map(|u| u.user_id.as_str()).collect::<Vec<_>>(),
            vec!["user-3", "user-4"]
        );
    }

    #[tokio::test]
    async fn get_returns_none_for_missing_user() {
        let (repo, _temp) = setup_repo();
        assert!(repo.get("nobody").await.unwrap().is_none());
    }
}
