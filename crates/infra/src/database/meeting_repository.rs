//! SQLite-backed implementation of the MeetingRepository port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use preppulse_core::MeetingRepository;
use preppulse_domain::{Meeting, Result};
use rusqlite::types::Type;
use rusqlite::{Row, ToSql};
use tracing::{debug, instrument};

use super::manager::DbManager;
use crate::errors::InfraError;

const MEETING_COLUMNS: &str = "meeting_id, external_id, user_id, source, title, description,
        start_time, end_time, location, attendees, organizer,
        meeting_type, status, prep_hours_before, chat_session_id,
        notification_id, notification_sent_at,
        created_at, updated_at, last_synced_at";

/// SQLite implementation of MeetingRepository.
pub struct SqliteMeetingRepository {
    db: Arc<DbManager>,
}

impl SqliteMeetingRepository {
    /// Create a new meeting repository on the shared pool.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MeetingRepository for SqliteMeetingRepository {
    #[instrument(skip(self))]
    async fn get(&self, meeting_id: &str) -> Result<Option<Meeting>> {
        let conn = self.db.get_connection()?;

        let result = conn.query_row(
            &format!("SELECT {MEETING_COLUMNS} FROM meetings WHERE meeting_id = ?1"),
            [meeting_id],
            meeting_from_row,
        );

        match result {
            Ok(meeting) => Ok(Some(meeting)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(InfraError::from(e).into()),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_external_id(
        &self,
        user_id: &str,
        external_id: &str,
    ) -> Result<Option<Meeting>> {
        let conn = self.db.get_connection()?;

        let result = conn.query_row(
            &format!(
                "SELECT {MEETING_COLUMNS} FROM meetings
                 WHERE user_id = ?1 AND external_id = ?2"
            ),
            [user_id, external_id],
            meeting_from_row,
        );

        match result {
            Ok(meeting) => Ok(Some(meeting)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(InfraError::from(e).into()),
        }
    }

    #[instrument(skip(self, meeting), fields(meeting_id = %meeting.meeting_id))]
    async fn put(&self, meeting: &Meeting) -> Result<()> {
        let conn = self.db.get_connection()?;

        let attendees = serde_json::to_string(&meeting.attendees)
            .map_err(|e| preppulse_domain::PrepPulseError::Internal(e.to_string()))?;

        conn.execute(
            "INSERT INTO meetings (
                meeting_id, external_id, user_id, source, title, description,
                start_time, end_time, location, attendees, organizer,
                meeting_type, status, prep_hours_before, chat_session_id,
                notification_id, notification_sent_at,
                created_at, updated_at, last_synced_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
            ON CONFLICT(meeting_id) DO UPDATE SET
                external_id = excluded.external_id,
                user_id = excluded.user_id,
                source = excluded.source,
                title = excluded.title,
                description = excluded.description,
                start_time = excluded.start_time,
                end_time = excluded.end_time,
                location = excluded.location,
                attendees = excluded.attendees,
                organizer = excluded.organizer,
                meeting_type = excluded.meeting_type,
                status = excluded.status,
                prep_hours_before = excluded.prep_hours_before,
                chat_session_id = excluded.chat_session_id,
                notification_id = excluded.notification_id,
                notification_sent_at = excluded.notification_sent_at,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                last_synced_at = excluded.last_synced_at",
            [
                &meeting.meeting_id as &dyn ToSql,
                &meeting.external_id,
                &meeting.user_id,
                &meeting.source,
                &meeting.title,
                &meeting.description,
                &meeting.start_time.to_rfc3339(),
                &meeting.end_time.to_rfc3339(),
                &meeting.location,
                &attendees,
                &meeting.organizer,
                &meeting.meeting_type.as_str(),
                &meeting.status.as_str(),
                &meeting.prep_hours_before,
                &meeting.chat_session_id,
                &meeting.notification_id,
                &meeting.notification_sent_at.map(|ts| ts.to_rfc3339()),
                &meeting.created_at.to_rfc3339(),
                &meeting.updated_at.to_rfc3339(),
                &meeting.last_synced_at.map(|ts| ts.to_rfc3339()),
            ]
            .as_ref(),
        )
        .map_err(InfraError::from)?;

        debug!(
            meeting_id = %meeting.meeting_id,
            status = %meeting.status,
            "stored meeting"
        );

        Ok(())
    }
}

fn meeting_from_row(row: &Row<'_>) -> rusqlite::Result<Meeting> {
    let attendees: String = row.get(9)?;
    let attendees: Vec<String> = serde_json::from_str(&attendees)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?;

    let meeting_type: String = row.get(11)?;
    let status: String = row.get(12)?;

    Ok(Meeting {
        meeting_id: row.get(0)?,
        external_id: row.get(1)?,
        user_id: row.get(2)?,
        source: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        start_time: parse_timestamp(6, row.get(6)?)?,
        end_time: parse_timestamp(7, row.get(7)?)?,
        location: row.get(8)?,
        attendees,
        organizer: row.get(10)?,
        meeting_type: meeting_type
            .parse()
            .map_err(|e| conversion_error(11, e))?,
        status: status.parse().map_err(|e| conversion_error(12, e))?,
        prep_hours_before: row.get(13)?,
        chat_session_id: row.get(14)?,
        notification_id: row.get(15)?,
        notification_sent_at: parse_optional_timestamp(16, row.get(16)?)?,
        created_at: parse_timestamp(17, row.get(17)?)?,
        updated_at: parse_timestamp(18, row.get(18)?)?,
        last_synced_at: parse_optional_timestamp(19, row.get(19)?)?,
    })
}

fn parse_timestamp(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_optional_timestamp(
    idx: usize,
    value: Option<String>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    value.map(|v| parse_timestamp(idx, v)).transpose()
}

fn conversion_error(idx: usize, err: preppulse_domain::PrepPulseError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}
