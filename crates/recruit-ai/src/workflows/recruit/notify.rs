//! Outbound notification composition and dispatch.
//!
//! Two templates: the recruiter-facing match alert (with the oracle's raw
//! report and the resume attached when available) and the applicant-facing
//! congratulations message carrying proposed interview times. Dispatch is
//! best-effort with per-recipient isolation: one failed send is logged and
//! the rest of the batch still goes out.

use crate::workflows::recruit::scheduling::{
    self, CalendarGateway, InterviewSlot, SlotPlan, SlotSchedule,
};
use crate::workflows::recruit::state::{MatchResult, RecruitState};
use chrono::NaiveDate;
use std::fmt::Write as _;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail transport unavailable: {0}")]
    Transport(String),
    #[error("mail rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: Option<Attachment>,
}

/// Outbound mail seam.
pub trait MailGateway: Send + Sync {
    fn send(&self, message: &OutboundMessage) -> Result<(), MailError>;
}

/// Send one match alert per accepted posting to its recruiter. Returns the
/// number of messages dispatched.
pub fn notify_recruiters<M>(
    mail: &M,
    state: &RecruitState,
    resume: Option<&Attachment>,
) -> usize
where
    M: MailGateway + ?Sized,
{
    if state.match_results.is_empty() {
        info!(document = %state.document_name, "no matches, skipping recruiter notifications");
        return 0;
    }

    let mut sent = 0;
    for matched in &state.match_results {
        let Some(recruiter_email) = matched.recruiter_email.as_deref() else {
            warn!(posting = %matched.source_filename, "no recruiter email for match, skipping");
            continue;
        };

        let message = OutboundMessage {
            to: recruiter_email.to_string(),
            subject: format!("Potential Candidate Match for {}", matched.source_filename),
            body: recruiter_body(state, matched, resume.is_some()),
            attachment: resume.cloned(),
        };

        match mail.send(&message) {
            Ok(()) => {
                info!(recruiter = recruiter_email, posting = %matched.source_filename, "recruiter notified");
                sent += 1;
            }
            Err(err) => {
                warn!(recruiter = recruiter_email, error = %err, "failed to notify recruiter");
            }
        }
    }

    if sent == 0 {
        warn!(document = %state.document_name, "no recruiter notifications were sent");
    }
    sent
}

/// Send the applicant one congratulations message per accepted posting,
/// carrying open interview slots pulled from the recruiter's calendar.
pub fn notify_applicant<M, C>(
    mail: &M,
    calendar: &C,
    state: &RecruitState,
    today: NaiveDate,
    plan: SlotPlan,
) -> usize
where
    M: MailGateway + ?Sized,
    C: CalendarGateway + ?Sized,
{
    if state.applicant_email.is_empty() {
        warn!(document = %state.document_name, "no applicant email, cannot send notification");
        return 0;
    }
    if state.match_results.is_empty() {
        info!(document = %state.document_name, "no matches, skipping applicant notification");
        return 0;
    }

    let applicant_name = state.applicant_name.as_deref().unwrap_or("Candidate");
    let mut sent = 0;

    for matched in &state.match_results {
        let Some(recruiter_email) = matched.recruiter_email.as_deref() else {
            warn!(posting = %matched.source_filename, "no recruiter contact for match, skipping applicant notice");
            continue;
        };
        let recruiter_display = matched
            .recruiter_name
            .clone()
            .unwrap_or_else(|| display_name_from_email(recruiter_email));

        let schedule = scheduling::find_interview_slots(calendar, recruiter_email, today, plan);
        let message = OutboundMessage {
            to: state.applicant_email.clone(),
            subject: "Exciting News! You're a Match!".to_string(),
            body: applicant_body(applicant_name, &recruiter_display, recruiter_email, &schedule),
            attachment: None,
        };

        match mail.send(&message) {
            Ok(()) => {
                info!(
                    applicant = %state.applicant_email,
                    posting = %matched.source_filename,
                    slots = schedule.len(),
                    "applicant notified"
                );
                sent += 1;
            }
            Err(err) => {
                warn!(applicant = %state.applicant_email, error = %err, "failed to notify applicant");
            }
        }
    }

    if sent == 0 {
        warn!(document = %state.document_name, "no applicant notifications were sent");
    }
    sent
}

fn recruiter_body(state: &RecruitState, matched: &MatchResult, has_attachment: bool) -> String {
    let greeting = matched.recruiter_name.as_deref().unwrap_or("there");
    let candidate_info = match state.applicant_name.as_deref() {
        Some(name) if !state.applicant_email.is_empty() => {
            format!("{name} ({})", state.applicant_email)
        }
        Some(name) => name.to_string(),
        None => "a candidate".to_string(),
    };

    let mut body = String::new();
    writeln!(body, "Hi {greeting},").expect("write greeting");
    body.push('\n');
    writeln!(
        body,
        "I'm reaching out on behalf of our recruiting team. We've reviewed your job listing for {} and found {candidate_info} whose resume appears to be a strong match.",
        matched.source_filename
    )
    .expect("write intro");
    body.push('\n');
    if has_attachment {
        writeln!(
            body,
            "I've attached the candidate's resume for your review. If you'd like to connect with them, please let us know."
        )
        .expect("write attachment note");
    } else {
        writeln!(
            body,
            "We can share the candidate's full resume on request. If you'd like to connect with them, please let us know."
        )
        .expect("write resume note");
    }
    body.push('\n');
    writeln!(body, "Best regards,").expect("write signoff");
    writeln!(body, "Recruitment Assistant").expect("write signature");
    body.push('\n');
    writeln!(body, "---").expect("write divider");
    writeln!(body, "Match Analysis:").expect("write analysis heading");
    writeln!(body, "{}", matched.score_report).expect("write report");
    body
}

fn applicant_body(
    applicant_name: &str,
    recruiter_display: &str,
    recruiter_email: &str,
    schedule: &SlotSchedule,
) -> String {
    let mut body = String::new();
    writeln!(body, "Hi {applicant_name},").expect("write greeting");
    body.push('\n');
    writeln!(
        body,
        "Congratulations! Your resume has been matched with an opportunity, and the recruiter is interested in connecting with you."
    )
    .expect("write intro");
    body.push('\n');
    writeln!(body, "Recruiter: {recruiter_display}").expect("write recruiter");
    writeln!(body, "Contact: {recruiter_email}").expect("write contact");
    body.push('\n');
    body.push_str(&times_text(schedule));
    body.push('\n');
    writeln!(body, "Next steps:").expect("write steps heading");
    writeln!(body, "1. Review the available meeting times above").expect("write step");
    writeln!(body, "2. Reply to this email with your preferred time slot number")
        .expect("write step");
    writeln!(
        body,
        "3. We'll coordinate with {recruiter_display} to confirm the meeting"
    )
    .expect("write step");
    writeln!(
        body,
        "4. You can also reach out directly to {recruiter_email} if you need different times"
    )
    .expect("write step");
    body.push('\n');
    writeln!(body, "Best regards,").expect("write signoff");
    writeln!(body, "Recruitment Assistant").expect("write signature");
    body
}

fn times_text(schedule: &SlotSchedule) -> String {
    if schedule.is_empty() {
        return "We're working on coordinating meeting times with the recruiter and will follow up with availability soon.\n".to_string();
    }

    let mut text = String::new();
    writeln!(
        text,
        "Here are some available meeting times with the recruiter:"
    )
    .expect("write times heading");
    text.push('\n');

    let mut index = 1;
    if !schedule.morning.is_empty() {
        writeln!(text, "Morning Options (9 AM - 12 PM):").expect("write morning heading");
        for slot in &schedule.morning {
            writeln!(text, "   {index}. {}", format_slot(slot)).expect("write slot");
            index += 1;
        }
        text.push('\n');
    }
    if !schedule.afternoon.is_empty() {
        writeln!(text, "Afternoon Options (1 PM - 5 PM):").expect("write afternoon heading");
        for slot in &schedule.afternoon {
            writeln!(text, "   {index}. {}", format_slot(slot)).expect("write slot");
            index += 1;
        }
        text.push('\n');
    }
    writeln!(
        text,
        "Please reply to this email with your preferred time slot number, and we'll coordinate with the recruiter to confirm the meeting."
    )
    .expect("write reply note");
    text
}

fn format_slot(slot: &InterviewSlot) -> String {
    format!(
        "{}, {} - {} to {}",
        slot.start.format("%A"),
        slot.start.format("%Y-%m-%d"),
        slot.start.format("%I:%M %p"),
        slot.end.format("%I:%M %p")
    )
}

fn display_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    local
        .split(['.', '_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::recruit::scheduling::{BusyInterval, CalendarError};
    use chrono::NaiveDateTime;
    use std::sync::Mutex;

    struct RecordingMail {
        messages: Mutex<Vec<OutboundMessage>>,
        fail_recipients: Vec<String>,
    }

    impl RecordingMail {
        fn new() -> Self {
            Self {
                messages: Mutex::new(Vec::new()),
                fail_recipients: Vec::new(),
            }
        }

        fn sent(&self) -> Vec<OutboundMessage> {
            self.messages.lock().expect("mail log").clone()
        }
    }

    impl MailGateway for RecordingMail {
        fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
            if self.fail_recipients.contains(&message.to) {
                return Err(MailError::Transport("boom".to_string()));
            }
            self.messages.lock().expect("mail log").push(message.clone());
            Ok(())
        }
    }

    struct FreeCalendar;

    impl CalendarGateway for FreeCalendar {
        fn busy_intervals(
            &self,
            _attendee: &str,
            _from: NaiveDateTime,
            _to: NaiveDateTime,
        ) -> Result<Vec<BusyInterval>, CalendarError> {
            Ok(Vec::new())
        }
    }

    struct ClosedCalendar;

    impl CalendarGateway for ClosedCalendar {
        fn busy_intervals(
            &self,
            attendee: &str,
            _from: NaiveDateTime,
            _to: NaiveDateTime,
        ) -> Result<Vec<BusyInterval>, CalendarError> {
            Err(CalendarError::NoAccess(attendee.to_string()))
        }
    }

    fn matched_state() -> RecruitState {
        let mut state = RecruitState::new("doc-1", "resume.pdf");
        state.applicant_name = Some("Jordan Blake".to_string());
        state.applicant_email = "jordan@example.com".to_string();
        state.match_results = vec![
            MatchResult {
                recruiter_email: Some("dana.reed@acme.com".to_string()),
                recruiter_name: Some("Dana Reed".to_string()),
                source_filename: "backend.txt".to_string(),
                score_report: "Score: 9/10\nDid Meet All Requirements: No\nComment: strong"
                    .to_string(),
            },
            MatchResult {
                recruiter_email: None,
                recruiter_name: None,
                source_filename: "orphan.txt".to_string(),
                score_report: "Score: 8/10".to_string(),
            },
        ];
        state
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 11).expect("valid date")
    }

    #[test]
    fn recruiter_notification_carries_report_and_attachment() {
        let mail = RecordingMail::new();
        let state = matched_state();
        let resume = Attachment {
            filename: "resume.pdf".to_string(),
            bytes: vec![1, 2, 3],
        };

        let sent = notify_recruiters(&mail, &state, Some(&resume));
        assert_eq!(sent, 1);

        let messages = mail.sent();
        assert_eq!(messages.len(), 1);
        let message = &messages[0];
        assert_eq!(message.to, "dana.reed@acme.com");
        assert_eq!(message.subject, "Potential Candidate Match for backend.txt");
        assert!(message.body.contains("Hi Dana Reed,"));
        assert!(message.body.contains("Jordan Blake (jordan@example.com)"));
        assert!(message.body.contains("Score: 9/10"));
        assert!(message.attachment.is_some());
    }

    #[test]
    fn recruiter_send_failure_does_not_stop_the_batch() {
        let mail = RecordingMail {
            messages: Mutex::new(Vec::new()),
            fail_recipients: vec!["dana.reed@acme.com".to_string()],
        };
        let mut state = matched_state();
        state.match_results[1].recruiter_email = Some("lee@beta.io".to_string());

        let sent = notify_recruiters(&mail, &state, None);
        assert_eq!(sent, 1);
        assert_eq!(mail.sent()[0].to, "lee@beta.io");
    }

    #[test]
    fn applicant_notification_lists_slots_and_recruiter_contact() {
        let mail = RecordingMail::new();
        let state = matched_state();

        let sent = notify_applicant(&mail, &FreeCalendar, &state, today(), SlotPlan::default());
        assert_eq!(sent, 1);

        let messages = mail.sent();
        let message = &messages[0];
        assert_eq!(message.to, "jordan@example.com");
        assert!(message.body.contains("Recruiter: Dana Reed"));
        assert!(message.body.contains("Contact: dana.reed@acme.com"));
        assert!(message.body.contains("Morning Options (9 AM - 12 PM):"));
        assert!(message.body.contains("Afternoon Options (1 PM - 5 PM):"));
        assert!(message.body.contains("09:00 AM"));
    }

    #[test]
    fn applicant_message_falls_back_when_no_slots_found() {
        let mail = RecordingMail::new();
        let state = matched_state();

        let sent = notify_applicant(&mail, &ClosedCalendar, &state, today(), SlotPlan::default());
        assert_eq!(sent, 1);
        assert!(mail.sent()[0]
            .body
            .contains("We're working on coordinating meeting times"));
    }

    #[test]
    fn missing_applicant_email_sends_nothing() {
        let mail = RecordingMail::new();
        let mut state = matched_state();
        state.applicant_email.clear();

        let sent = notify_applicant(&mail, &FreeCalendar, &state, today(), SlotPlan::default());
        assert_eq!(sent, 0);
        assert!(mail.sent().is_empty());
    }

    #[test]
    fn recruiter_display_name_derived_from_email_when_unnamed() {
        assert_eq!(display_name_from_email("dana.reed@acme.com"), "Dana Reed");
        assert_eq!(display_name_from_email("lee@beta.io"), "Lee");
    }
}
