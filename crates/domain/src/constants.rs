//! Domain constants and defaults

use std::time::Duration;

/// Days ahead the calendar source is queried for upcoming meetings.
pub const DEFAULT_LOOKAHEAD_DAYS: i64 = 14;

/// Maximum number of events requested from the calendar source per user.
pub const DEFAULT_MAX_EVENTS: usize = 250;

/// Fallback lead time when a meeting type has no configured entry.
pub const DEFAULT_LEAD_HOURS: i64 = 24;

/// Timeout applied to a single channel-provider HTTP call.
pub const PROVIDER_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Page size used when scanning for calendar-connected users.
pub const USER_SCAN_PAGE_SIZE: usize = 100;

/// Topic the sync engine publishes prep trigger events to.
pub const PREP_TRIGGER_TOPIC: &str = "preppulse.meeting-prep-required";

/// Event source name stamped on published trigger envelopes.
pub const TRIGGER_EVENT_SOURCE: &str = "preppulse.scan-coordinator";

/// Detail type stamped on published trigger envelopes.
pub const TRIGGER_DETAIL_TYPE: &str = "MeetingPrepRequired";
