//! Scan coordinator - top-level periodic entry point.
//!
//! Lists every user with a connected calendar, runs the sync engine for
//! each, isolates per-user failures, and returns aggregate counters. Each
//! invocation is a stateless unit of work; cadence is owned by the caller.

use std::sync::Arc;

use preppulse_domain::constants::USER_SCAN_PAGE_SIZE;
use preppulse_domain::Result;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::sync::ports::UserRepository;
use crate::sync::SyncEngine;

/// Aggregate counters for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub users_processed: usize,
    pub meetings_synced: usize,
    pub preps_triggered: usize,
    pub errors: usize,
}

/// Top-level scan entry point.
pub struct ScanCoordinator {
    users: Arc<dyn UserRepository>,
    engine: Arc<SyncEngine>,
    page_size: usize,
}

impl ScanCoordinator {
    /// Create a new coordinator.
    pub fn new(users: Arc<dyn UserRepository>, engine: Arc<SyncEngine>) -> Self {
        Self { users, engine, page_size: USER_SCAN_PAGE_SIZE }
    }

    /// Run one scan over all calendar-connected users.
    ///
    /// A per-user failure increments `errors` and excludes the user from
    /// `users_processed`; it never stops the scan.
    #[instrument(skip(self))]
    pub async fn run_scan(&self) -> Result<ScanReport> {
        let mut report = ScanReport::default();
        let mut offset = 0;

        loop {
            let page = self.users.list_calendar_connected(self.page_size, offset).await?;
            if page.is_empty() {
                break;
            }
            offset += page.len();

            for user in &page {
                match self.engine.sync_user(user).await {
                    Ok(outcome) => {
                        report.users_processed += 1;
                        report.meetings_synced += outcome.meetings_synced;
                        report.preps_triggered += outcome.preps_triggered;
                    }
                    Err(e) => {
                        report.errors += 1;
                        error!(
                            user_id = %user.user_id,
                            error = %e,
                            "failed to process user calendar, continuing scan"
                        );
                    }
                }
            }
        }

        info!(
            users_processed = report.users_processed,
            meetings_synced = report.meetings_synced,
            preps_triggered = report.preps_triggered,
            errors = report.errors,
            "calendar scan completed"
        );
        Ok(report)
    }
}
