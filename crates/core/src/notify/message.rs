//! Per-channel message rendering.
//!
//! Every channel conveys the same facts in its own shape: meeting title,
//! type, start time, duration, attendee count, and a call to action. The
//! chat channel adds two interactive actions ("start prep" /
//! "remind later").

use preppulse_domain::Meeting;
use serde_json::{json, Value};

/// Structured chat payload: fallback text plus interactive blocks.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Plain-text fallback shown by clients that cannot render blocks.
    pub text: String,
    /// Block Kit layout.
    pub blocks: Value,
}

/// Rendered email payload.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub subject: String,
    pub html: String,
    pub text: String,
}

fn long_time(meeting: &Meeting) -> String {
    meeting.start_time.format("%A, %B %d at %I:%M %p UTC").to_string()
}

fn short_time(meeting: &Meeting) -> String {
    meeting.start_time.format("%b %d at %I:%M %p UTC").to_string()
}

/// Build the interactive chat notification for a meeting.
pub fn chat_message(meeting: &Meeting) -> ChatMessage {
    let action_value = json!({
        "meeting_id": meeting.meeting_id,
        "user_id": meeting.user_id,
    })
    .to_string();

    let summary = format!(
        "You have a *{}* coming up:\n\n*{}*\n{}\n{} minutes\n{} attendee(s)",
        meeting.meeting_type.display_name(),
        meeting.title,
        long_time(meeting),
        meeting.duration_minutes(),
        meeting.attendees.len(),
    );

    let blocks = json!([
        {
            "type": "header",
            "text": { "type": "plain_text", "text": "Meeting Prep Reminder" }
        },
        {
            "type": "section",
            "text": { "type": "mrkdwn", "text": summary }
        },
        { "type": "divider" },
        {
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": "Time to prepare! Start a prep session to build your agenda, \
                         question bank, and notes template."
            }
        },
        {
            "type": "actions",
            "elements": [
                {
                    "type": "button",
                    "text": { "type": "plain_text", "text": "Start Prep Session" },
                    "style": "primary",
                    "action_id": "start_prep",
                    "value": action_value
                },
                {
                    "type": "button",
                    "text": { "type": "plain_text", "text": "Remind Me in 2 Hours" },
                    "action_id": "remind_later",
                    "value": action_value
                }
            ]
        }
    ]);

    ChatMessage { text: format!("Meeting prep reminder for {}", meeting.title), blocks }
}

/// Build the plain-text SMS body for a meeting.
pub fn sms_body(meeting: &Meeting) -> String {
    format!(
        "Meeting prep reminder: {} ({})\nWhen: {}\nDuration: {} min, {} attendee(s)\nReply SKIP to dismiss",
        meeting.title,
        meeting.meeting_type.display_name(),
        short_time(meeting),
        meeting.duration_minutes(),
        meeting.attendees.len(),
    )
}

/// Build the subject + HTML + text email for a meeting.
pub fn email_message(meeting: &Meeting) -> EmailMessage {
    let when = long_time(meeting);
    let type_name = meeting.meeting_type.display_name();
    let duration = meeting.duration_minutes();
    let attendee_count = meeting.attendees.len();

    let html = format!(
        "<html><body>\
         <h2>Meeting Prep Reminder</h2>\
         <p>You have a <strong>{type_name}</strong> coming up:</p>\
         <h3>{title}</h3>\
         <ul><li>When: {when}</li><li>Duration: {duration} minutes</li>\
         <li>Attendees: {attendee_count}</li></ul>\
         <p>Time to prepare! Start a prep session to build your agenda and materials.</p>\
         <p><em>This is an automated message from PrepPulse.</em></p>\
         </body></html>",
        title = meeting.title,
    );

    let text = format!(
        "Meeting Prep Reminder\n\nYou have a {type_name} coming up:\n\n{title}\n\
         - When: {when}\n- Duration: {duration} minutes\n- Attendees: {attendee_count}\n\n\
         Time to prepare! Start a prep session to build your agenda and materials.",
        title = meeting.title,
    );

    EmailMessage { subject: format!("Meeting Prep: {}", meeting.title), html, text }
}
