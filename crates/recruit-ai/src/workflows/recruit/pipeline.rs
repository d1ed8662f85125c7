//! The workflow controller: a fixed stage graph driven over one state record.
//!
//! The graph is declared as a transition table (current stage, guard, next
//! stage) and consumed by a single driver loop; stage bodies never decide
//! where to go next. The only branch is the readability guard after
//! experience extraction — everything else is linear. Collaborator failures
//! degrade the owning stage's result and the run continues; nothing escapes
//! to the caller except the final state.

use crate::workflows::recruit::corpus::{self, DocumentStore};
use crate::workflows::recruit::dispatch::TriggerEvent;
use crate::workflows::recruit::entities;
use crate::workflows::recruit::extract;
use crate::workflows::recruit::matching::{self, ScoreOracle};
use crate::workflows::recruit::notify::{self, Attachment, MailGateway};
use crate::workflows::recruit::scheduling::{CalendarGateway, SlotPlan};
use crate::workflows::recruit::state::RecruitState;
use chrono::Local;
use std::sync::Arc;
use tracing::{info, warn};

/// Extracted resume texts shorter than this are treated as extraction
/// failures; nothing useful survives below it.
pub const MIN_RESUME_CHARS: usize = 100;

/// Stages of the recruiting workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ExtractText,
    ExtractExperience,
    UnreadableEnd,
    ReadCorpus,
    ExtractRecruiters,
    Match,
    NotifyRecruiters,
    NotifyApplicant,
    End,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::End | Stage::UnreadableEnd)
    }

    fn label(self) -> &'static str {
        match self {
            Stage::ExtractText => "extract_text",
            Stage::ExtractExperience => "extract_experience",
            Stage::UnreadableEnd => "unreadable_end",
            Stage::ReadCorpus => "read_corpus",
            Stage::ExtractRecruiters => "extract_recruiters",
            Stage::Match => "match",
            Stage::NotifyRecruiters => "notify_recruiters",
            Stage::NotifyApplicant => "notify_applicant",
            Stage::End => "end",
        }
    }
}

/// Guarded edge out of a stage.
enum Next {
    Always(Stage),
    /// Branch on the readability flag written by experience extraction.
    WhenReadable { readable: Stage, unreadable: Stage },
}

const TRANSITIONS: &[(Stage, Next)] = &[
    (Stage::ExtractText, Next::Always(Stage::ExtractExperience)),
    (
        Stage::ExtractExperience,
        Next::WhenReadable {
            readable: Stage::ReadCorpus,
            unreadable: Stage::UnreadableEnd,
        },
    ),
    (Stage::ReadCorpus, Next::Always(Stage::ExtractRecruiters)),
    (Stage::ExtractRecruiters, Next::Always(Stage::Match)),
    (Stage::Match, Next::Always(Stage::NotifyRecruiters)),
    (Stage::NotifyRecruiters, Next::Always(Stage::NotifyApplicant)),
    (Stage::NotifyApplicant, Next::Always(Stage::End)),
];

fn next_stage(current: Stage, state: &RecruitState) -> Stage {
    match TRANSITIONS.iter().find(|(from, _)| *from == current) {
        Some((_, Next::Always(to))) => *to,
        Some((
            _,
            Next::WhenReadable {
                readable,
                unreadable,
            },
        )) => {
            if state.readable {
                *readable
            } else {
                *unreadable
            }
        }
        // Terminal stages have no outgoing edge.
        None => Stage::End,
    }
}

/// How one run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Unreadable,
}

/// Final state of a finished run, handed back to the dispatcher for logging.
#[derive(Debug)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub state: RecruitState,
}

/// Static settings one pipeline instance runs with.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Corpus collection holding the job postings.
    pub postings_folder_id: String,
    /// When set, finished resumes are moved here at the end of a run.
    pub processed_folder_id: Option<String>,
    pub slot_plan: SlotPlan,
}

/// The workflow controller, generic over its collaborator seams so tests can
/// drive it with in-memory gateways.
pub struct RecruitPipeline<D, O, M, C> {
    documents: Arc<D>,
    oracle: Arc<O>,
    mail: Arc<M>,
    calendar: Arc<C>,
    config: PipelineConfig,
}

impl<D, O, M, C> RecruitPipeline<D, O, M, C>
where
    D: DocumentStore,
    O: ScoreOracle,
    M: MailGateway,
    C: CalendarGateway,
{
    pub fn new(
        documents: Arc<D>,
        oracle: Arc<O>,
        mail: Arc<M>,
        calendar: Arc<C>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            documents,
            oracle,
            mail,
            calendar,
            config,
        }
    }

    /// Drive one state record from trigger to a terminal stage.
    pub fn run(&self, event: TriggerEvent) -> RunSummary {
        let mut state = RecruitState::new(event.document_id, event.document_name);
        info!(document = %state.document_name, "starting run");

        let mut stage = Stage::ExtractText;
        while !stage.is_terminal() {
            info!(document = %state.document_name, stage = stage.label(), "entering stage");
            self.execute(stage, &mut state);
            stage = next_stage(stage, &state);
        }

        let outcome = match stage {
            Stage::UnreadableEnd => {
                info!(
                    document = %state.document_name,
                    "run terminated: no experience section found, resume could not be read"
                );
                RunOutcome::Unreadable
            }
            _ => {
                self.archive(&state);
                RunOutcome::Completed
            }
        };

        RunSummary { outcome, state }
    }

    fn execute(&self, stage: Stage, state: &mut RecruitState) {
        match stage {
            Stage::ExtractText => self.extract_text(state),
            Stage::ExtractExperience => extract_experience(state),
            Stage::ReadCorpus => {
                state.corpus_entries =
                    corpus::read_corpus(self.documents.as_ref(), &self.config.postings_folder_id);
            }
            Stage::ExtractRecruiters => {
                state.recruiter_directory = corpus::recruiter_directory(&state.corpus_entries);
            }
            Stage::Match => {
                let experience = state.experience_excerpt.as_deref().unwrap_or_default();
                state.match_results = matching::match_jobs(
                    self.oracle.as_ref(),
                    experience,
                    &state.corpus_entries,
                    &state.recruiter_directory,
                );
            }
            Stage::NotifyRecruiters => {
                let resume = self.fetch_resume_attachment(state);
                notify::notify_recruiters(self.mail.as_ref(), state, resume.as_ref());
            }
            Stage::NotifyApplicant => {
                notify::notify_applicant(
                    self.mail.as_ref(),
                    self.calendar.as_ref(),
                    state,
                    Local::now().date_naive(),
                    self.config.slot_plan,
                );
            }
            Stage::UnreadableEnd | Stage::End => {}
        }
    }

    fn extract_text(&self, state: &mut RecruitState) {
        let text = match self.documents.fetch_document(&state.document_id) {
            Ok(fetched) => {
                extract::document_text(&state.document_name, &fetched.media_type, &fetched.bytes)
            }
            Err(err) => {
                warn!(document = %state.document_name, error = %err, "failed to fetch resume");
                String::new()
            }
        };

        if text.chars().count() < MIN_RESUME_CHARS {
            warn!(
                document = %state.document_name,
                length = text.chars().count(),
                "extracted text too short, treating as unreadable"
            );
            return;
        }

        state.applicant_email = entities::first_email(&text).unwrap_or_default();
        let email = if state.applicant_email.is_empty() {
            None
        } else {
            Some(state.applicant_email.as_str())
        };
        state.applicant_name = entities::applicant_name(&text, email);
        state.raw_text = text;
    }

    fn fetch_resume_attachment(&self, state: &RecruitState) -> Option<Attachment> {
        if state.match_results.is_empty() {
            return None;
        }
        match self.documents.fetch_document(&state.document_id) {
            Ok(fetched) => Some(Attachment {
                filename: state.document_name.clone(),
                bytes: fetched.bytes,
            }),
            Err(err) => {
                warn!(document = %state.document_name, error = %err, "could not fetch resume for attachment");
                None
            }
        }
    }

    fn archive(&self, state: &RecruitState) {
        let Some(folder) = self.config.processed_folder_id.as_deref() else {
            return;
        };
        match self
            .documents
            .archive_document(&state.document_id, folder)
        {
            Ok(()) => info!(document = %state.document_name, folder, "resume archived"),
            Err(err) => {
                warn!(document = %state.document_name, error = %err, "failed to archive resume");
            }
        }
    }
}

fn extract_experience(state: &mut RecruitState) {
    match entities::experience_section(&state.raw_text) {
        Some(section) => {
            state.experience_excerpt = Some(section);
            state.readable = true;
        }
        None => {
            state.experience_excerpt = None;
            state.readable = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_readable(readable: bool) -> RecruitState {
        let mut state = RecruitState::new("doc", "resume.pdf");
        state.readable = readable;
        state
    }

    #[test]
    fn experience_branch_is_the_only_conditional_edge() {
        let readable = state_with_readable(true);
        let unreadable = state_with_readable(false);

        assert_eq!(
            next_stage(Stage::ExtractExperience, &readable),
            Stage::ReadCorpus
        );
        assert_eq!(
            next_stage(Stage::ExtractExperience, &unreadable),
            Stage::UnreadableEnd
        );
        // The rest of the graph ignores the flag.
        assert_eq!(next_stage(Stage::ExtractText, &unreadable), Stage::ExtractExperience);
        assert_eq!(next_stage(Stage::Match, &unreadable), Stage::NotifyRecruiters);
    }

    #[test]
    fn linear_path_reaches_end() {
        let state = state_with_readable(true);
        let mut stage = Stage::ExtractText;
        let mut visited = vec![stage];
        while !stage.is_terminal() {
            stage = next_stage(stage, &state);
            visited.push(stage);
        }
        assert_eq!(stage, Stage::End);
        assert_eq!(visited.len(), 8);
    }

    #[test]
    fn unreadable_branch_is_a_dead_end() {
        let state = state_with_readable(false);
        let mut stage = Stage::ExtractText;
        while !stage.is_terminal() {
            stage = next_stage(stage, &state);
        }
        assert_eq!(stage, Stage::UnreadableEnd);
    }

    #[test]
    fn extract_experience_sets_the_readability_flag() {
        let mut state = RecruitState::new("doc", "resume.pdf");
        state.raw_text = "intro\nWORK EXPERIENCE\nbuilt things".to_string();
        extract_experience(&mut state);
        assert!(state.readable);
        assert!(state.experience_excerpt.is_some());

        let mut blank = RecruitState::new("doc", "resume.pdf");
        blank.raw_text = "a cover letter".to_string();
        extract_experience(&mut blank);
        assert!(!blank.readable);
        assert!(blank.experience_excerpt.is_none());
    }
}
