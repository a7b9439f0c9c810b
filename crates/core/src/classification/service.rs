//! Rule-driven meeting classifier.
//!
//! Pure functions over the configured rule table: no I/O, deterministic for
//! a fixed table. Rules are evaluated in config order and the first match
//! wins, so the table stays config-like and testable in isolation from the
//! matching loop.

use chrono::{DateTime, Duration, Utc};
use preppulse_domain::{ClassificationConfig, Meeting, MeetingType};
use tracing::debug;

/// Classifier for meeting types and prep trigger timing.
pub struct MeetingClassifier {
    config: ClassificationConfig,
}

impl MeetingClassifier {
    /// Create a classifier over an ordered rule table.
    pub fn new(config: ClassificationConfig) -> Self {
        Self { config }
    }

    /// Classify a meeting by title keywords and attendee count.
    ///
    /// Returns [`MeetingType::Unknown`] for an empty title or when no rule
    /// matches. Classification never errors.
    pub fn classify(&self, meeting: &Meeting) -> MeetingType {
        let title = meeting.title.to_lowercase();
        if title.is_empty() {
            debug!(meeting_id = %meeting.meeting_id, "empty title, classifying as unknown");
            return MeetingType::Unknown;
        }

        let attendee_count = meeting.attendees.len();

        for rule in &self.config.rules {
            let keyword_match =
                rule.keywords.iter().any(|keyword| title.contains(&keyword.to_lowercase()));
            if !keyword_match {
                continue;
            }

            if let Some(min) = rule.min_attendees {
                if attendee_count < min {
                    continue;
                }
            }
            if let Some(max) = rule.max_attendees {
                if attendee_count > max {
                    continue;
                }
            }

            debug!(
                meeting_id = %meeting.meeting_id,
                meeting_type = %rule.meeting_type,
                attendee_count,
                "classified meeting"
            );
            return rule.meeting_type;
        }

        debug!(meeting_id = %meeting.meeting_id, attendee_count, "no rule matched");
        MeetingType::Unknown
    }

    /// Hours of lead time before a meeting of this type needs prep.
    ///
    /// An unconfigured type falls back to the `unknown` entry, itself
    /// defaulting to 24 hours.
    pub fn lead_hours(&self, meeting_type: MeetingType) -> i64 {
        self.config.lead_hours_for(meeting_type)
    }

    /// Whether `now` falls inside the meeting's prep window.
    ///
    /// The window is half-open: `[start - lead_hours, start)`. Prep fires at
    /// the window boundary but never once the meeting has begun.
    pub fn is_in_window(&self, meeting: &Meeting, now: DateTime<Utc>) -> bool {
        let lead = self.lead_hours(meeting.meeting_type);
        let trigger_time = meeting.start_time - Duration::hours(lead);
        trigger_time <= now && now < meeting.start_time
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use preppulse_domain::{ClassificationRule, LeadHoursEntry, MeetingStatus};

    use super::*;

    fn meeting_with(title: &str, attendees: usize) -> Meeting {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap();
        let mut meeting = Meeting::discovered(
            "m-1",
            Some("ext-1".into()),
            "u-1",
            title,
            start,
            start + Duration::minutes(30),
            (0..attendees).map(|i| format!("person{i}@example.com")).collect(),
        );
        meeting.status = MeetingStatus::Discovered;
        meeting
    }

    fn classifier() -> MeetingClassifier {
        MeetingClassifier::new(ClassificationConfig::default())
    }

    #[test]
    fn classification_is_deterministic() {
        let classifier = classifier();
        let meeting = meeting_with("Leadership Team Sync", 8);
        let first = classifier.classify(&meeting);
        for _ in 0..5 {
            assert_eq!(classifier.classify(&meeting), first);
        }
        assert_eq!(first, MeetingType::LeadershipTeam);
    }

    #[test]
    fn empty_title_is_unknown() {
        assert_eq!(classifier().classify(&meeting_with("", 3)), MeetingType::Unknown);
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        assert_eq!(
            classifier().classify(&meeting_with("LEADERSHIP offsite planning", 6)),
            MeetingType::LeadershipTeam
        );
    }

    #[test]
    fn first_matching_rule_wins() {
        let config = ClassificationConfig {
            rules: vec![
                ClassificationRule {
                    meeting_type: MeetingType::VendorMeeting,
                    keywords: vec!["review".into()],
                    min_attendees: None,
                    max_attendees: None,
                },
                ClassificationRule {
                    meeting_type: MeetingType::ReliabilityReview,
                    keywords: vec!["review".into()],
                    min_attendees: None,
                    max_attendees: None,
                },
            ],
            lead_hours: vec![],
        };
        let classifier = MeetingClassifier::new(config);
        assert_eq!(
            classifier.classify(&meeting_with("Design review", 4)),
            MeetingType::VendorMeeting
        );
    }

    #[test]
    fn one_on_one_respects_max_attendees() {
        let classifier = classifier();
        assert_eq!(classifier.classify(&meeting_with("1-1 with Alice", 2)), MeetingType::OneOnOne);
        // Three attendees violate max_attendees=2, so the rule is skipped.
        assert_eq!(classifier.classify(&meeting_with("1-1 with Alice", 3)), MeetingType::Unknown);
    }

    #[test]
    fn leadership_respects_min_attendees() {
        let classifier = classifier();
        assert_eq!(
            classifier.classify(&meeting_with("Leadership Team Sync", 3)),
            MeetingType::Unknown
        );
        assert_eq!(
            classifier.classify(&meeting_with("Leadership Team Sync", 5)),
            MeetingType::LeadershipTeam
        );
    }

    #[test]
    fn lead_hours_fall_back_for_unconfigured_type() {
        let config = ClassificationConfig {
            rules: vec![],
            lead_hours: vec![LeadHoursEntry { meeting_type: MeetingType::Unknown, hours: 6 }],
        };
        let classifier = MeetingClassifier::new(config);
        assert_eq!(classifier.lead_hours(MeetingType::ExecutiveStaff), 6);
    }

    #[test]
    fn window_is_half_open_at_both_ends() {
        let classifier = classifier();
        let mut meeting = meeting_with("Leadership Team Sync", 8);
        meeting.meeting_type = MeetingType::LeadershipTeam;
        let start = meeting.start_time;
        let lead = Duration::hours(classifier.lead_hours(MeetingType::LeadershipTeam));

        // True exactly at the trigger boundary, false exactly at start.
        assert!(classifier.is_in_window(&meeting, start - lead));
        assert!(!classifier.is_in_window(&meeting, start));
        assert!(!classifier.is_in_window(&meeting, start - lead - Duration::seconds(1)));
        assert!(classifier.is_in_window(&meeting, start - Duration::seconds(1)));
    }

    #[test]
    fn leadership_sync_window_scenario() {
        let classifier = classifier();
        let mut meeting = meeting_with("Leadership Team Sync", 8);
        meeting.meeting_type = classifier.classify(&meeting);
        assert_eq!(meeting.meeting_type, MeetingType::LeadershipTeam);

        let start = meeting.start_time;
        assert!(classifier.is_in_window(&meeting, start - Duration::hours(20)));
        assert!(!classifier.is_in_window(&meeting, start - Duration::hours(30)));
    }
}
