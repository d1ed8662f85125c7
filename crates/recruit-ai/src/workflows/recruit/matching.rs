//! Scoring of one applicant's experience against each posting's requirements.
//!
//! The oracle is only trusted through a fixed three-line response contract:
//!
//! ```text
//! Score: X/10
//! Did Meet All Requirements: Yes/No
//! Comment: <free text>
//! ```
//!
//! Non-conforming responses parse to "no verdict, no score" and fail the
//! acceptance rule; they are never surfaced as errors.

use crate::workflows::recruit::state::{CorpusEntry, MatchResult, RecruiterContact};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{info, warn};

/// Minimum parsed score that accepts a job on its own.
pub const ACCEPTANCE_SCORE: u8 = 8;

const MET_MARKER: &str = "Did Meet All Requirements: Yes";

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Transport(String),
    #[error("oracle returned an unusable response: {0}")]
    Malformed(String),
}

/// Scoring backend: one prompt in, one free-text report out.
pub trait ScoreOracle: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String, OracleError>;
}

/// Fixed-structure prompt pairing the applicant's experience with one
/// posting's requirements.
pub fn build_match_prompt(experience: &str, requirements: &str) -> String {
    format!(
        "You're a recruiting assistant. Compare the resume experience below with the job \
requirements, and rate the match on a scale from 1 to 10. It is most important that the \
candidate meets the job requirements; skills that are merely desired are not important. \
Add a yes or no stating whether all the requirements are met, and give a two-sentence \
explanation. If the resume does not meet the requirements, explain why.\n\
Resume Experience:\n\"\"\"\n{experience}\n\"\"\"\n\
Job Requirements:\n\"\"\"\n{requirements}\n\"\"\"\n\
Return your answer in this format:\n\
Score: X/10\n\
Did Meet All Requirements: Yes/No\n\
Comment: <your explanation here>\n"
    )
}

fn score_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Score:\s*(\d+)/10").expect("score pattern"))
}

/// Whether the report carries the exact affirmative verdict line.
pub fn requirements_met(report: &str) -> bool {
    report.contains(MET_MARKER)
}

/// Numeric score out of ten, when the report carries a parseable one.
pub fn parse_score(report: &str) -> Option<u8> {
    score_regex()
        .captures(report)
        .and_then(|captures| captures.get(1))
        .and_then(|m| m.as_str().parse::<u8>().ok())
}

/// Acceptance rule: an explicit "yes" verdict OR a score of at least eight.
/// Either signal alone suffices so a single misparsed channel cannot sink a
/// genuine match.
pub fn accepted(report: &str) -> bool {
    requirements_met(report) || parse_score(report).is_some_and(|score| score >= ACCEPTANCE_SCORE)
}

/// Score every posting with a non-empty requirements excerpt and keep the
/// ones that pass the acceptance rule, joined to the recruiter directory by
/// source filename. Oracle failures exclude that posting and never abort the
/// batch.
pub fn match_jobs<O>(
    oracle: &O,
    experience: &str,
    entries: &[CorpusEntry],
    directory: &[RecruiterContact],
) -> Vec<MatchResult>
where
    O: ScoreOracle + ?Sized,
{
    let mut results = Vec::new();

    for entry in entries {
        if entry.requirements_excerpt.trim().is_empty() {
            warn!(posting = %entry.filename, "no requirements found, skipping");
            continue;
        }

        let prompt = build_match_prompt(experience, &entry.requirements_excerpt);
        let report = match oracle.complete(&prompt) {
            Ok(report) => report.trim().to_string(),
            Err(err) => {
                warn!(posting = %entry.filename, error = %err, "oracle call failed, excluding posting");
                continue;
            }
        };

        let met = requirements_met(&report);
        let score = parse_score(&report);
        if met || score.is_some_and(|value| value >= ACCEPTANCE_SCORE) {
            let contact = directory
                .iter()
                .find(|contact| contact.source_filename == entry.filename);
            info!(posting = %entry.filename, requirements_met = met, ?score, "match accepted");
            results.push(MatchResult {
                recruiter_email: contact.map(|c| c.email.clone()),
                recruiter_name: contact.and_then(|c| c.name.clone()),
                source_filename: entry.filename.clone(),
                score_report: report,
            });
        } else {
            info!(posting = %entry.filename, requirements_met = met, ?score, "match rejected");
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn report(score: Option<u8>, met: bool) -> String {
        let score_line = match score {
            Some(value) => format!("Score: {value}/10\n"),
            None => "Score: unknown\n".to_string(),
        };
        let verdict = if met { "Yes" } else { "No" };
        format!("{score_line}Did Meet All Requirements: {verdict}\nComment: fixture report")
    }

    #[test]
    fn acceptance_truth_table() {
        assert!(accepted(&report(Some(5), true)));
        assert!(accepted(&report(Some(9), false)));
        assert!(!accepted(&report(Some(7), false)));
        assert!(accepted(&report(None, true)));
    }

    #[test]
    fn malformed_report_is_no_verdict_no_score() {
        let garbled = "I think this candidate is great!";
        assert!(!requirements_met(garbled));
        assert_eq!(parse_score(garbled), None);
        assert!(!accepted(garbled));
    }

    #[test]
    fn score_parses_with_variable_spacing() {
        assert_eq!(parse_score("Score:8/10"), Some(8));
        assert_eq!(parse_score("Score:   10/10"), Some(10));
        assert_eq!(parse_score("Score: 8 / 10"), None);
    }

    struct ScriptedOracle {
        responses: Mutex<Vec<Result<String, OracleError>>>,
    }

    impl ScriptedOracle {
        fn new(responses: Vec<Result<String, OracleError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    impl ScoreOracle for ScriptedOracle {
        fn complete(&self, _prompt: &str) -> Result<String, OracleError> {
            self.responses
                .lock()
                .expect("oracle script")
                .remove(0)
        }
    }

    fn entry(filename: &str, requirements: &str) -> CorpusEntry {
        CorpusEntry {
            filename: filename.to_string(),
            normalized_text: String::new(),
            requirements_excerpt: requirements.to_string(),
        }
    }

    fn contact(email: &str, filename: &str) -> RecruiterContact {
        RecruiterContact {
            email: email.to_string(),
            name: Some("Dana Reed".to_string()),
            source_filename: filename.to_string(),
        }
    }

    #[test]
    fn empty_requirements_skip_the_oracle_entirely() {
        let oracle = ScriptedOracle::new(Vec::new());
        let entries = vec![entry("blank.pdf", "   ")];
        let results = match_jobs(&oracle, "experience", &entries, &[]);
        assert!(results.is_empty());
    }

    #[test]
    fn oracle_failure_excludes_only_that_posting() {
        let oracle = ScriptedOracle::new(vec![
            Err(OracleError::Transport("timeout".to_string())),
            Ok(report(Some(9), false)),
        ]);
        let entries = vec![entry("a.pdf", "rust"), entry("b.pdf", "rust")];
        let directory = vec![contact("a@corp.com", "a.pdf"), contact("b@corp.com", "b.pdf")];

        let results = match_jobs(&oracle, "experience", &entries, &directory);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source_filename, "b.pdf");
        assert_eq!(results[0].recruiter_email.as_deref(), Some("b@corp.com"));
    }

    #[test]
    fn join_takes_first_directory_entry_for_the_filename() {
        let oracle = ScriptedOracle::new(vec![Ok(report(Some(5), true))]);
        let entries = vec![entry("role.pdf", "rust")];
        let directory = vec![
            contact("first@corp.com", "role.pdf"),
            contact("second@corp.com", "role.pdf"),
        ];

        let results = match_jobs(&oracle, "experience", &entries, &directory);
        assert_eq!(results[0].recruiter_email.as_deref(), Some("first@corp.com"));
    }

    #[test]
    fn missing_directory_entry_still_records_the_match() {
        let oracle = ScriptedOracle::new(vec![Ok(report(Some(9), false))]);
        let entries = vec![entry("orphan.pdf", "rust")];

        let results = match_jobs(&oracle, "experience", &entries, &[]);
        assert_eq!(results.len(), 1);
        assert!(results[0].recruiter_email.is_none());
    }
}
