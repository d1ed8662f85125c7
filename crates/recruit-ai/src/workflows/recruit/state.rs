use serde::{Deserialize, Serialize};

/// Mutable record threaded through one workflow run.
///
/// Owned exclusively by the pipeline driver; each stage writes its own fields
/// once and later stages only read them. Discarded at the terminal stage —
/// nothing here survives across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecruitState {
    pub document_id: String,
    pub document_name: String,
    /// Full extracted resume text; empty signals extraction failure.
    pub raw_text: String,
    /// Bounded experience section; `None` means the resume was unreadable.
    pub experience_excerpt: Option<String>,
    pub applicant_name: Option<String>,
    pub applicant_email: String,
    /// Cleared when the experience section cannot be located; gates the
    /// early-exit branch.
    pub readable: bool,
    pub corpus_entries: Vec<CorpusEntry>,
    pub recruiter_directory: Vec<RecruiterContact>,
    pub match_results: Vec<MatchResult>,
}

impl RecruitState {
    pub fn new(document_id: impl Into<String>, document_name: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            document_name: document_name.into(),
            raw_text: String::new(),
            experience_excerpt: None,
            applicant_name: None,
            applicant_email: String::new(),
            readable: true,
            corpus_entries: Vec::new(),
            recruiter_directory: Vec::new(),
            match_results: Vec::new(),
        }
    }
}

/// One job posting as read from the corpus during this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub filename: String,
    pub normalized_text: String,
    pub requirements_excerpt: String,
}

/// Contact derived from a posting, joined to matches by `source_filename`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruiterContact {
    pub email: String,
    pub name: Option<String>,
    pub source_filename: String,
}

/// A posting that passed the acceptance rule, with the oracle's raw report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub recruiter_email: Option<String>,
    pub recruiter_name: Option<String>,
    pub source_filename: String,
    pub score_report: String,
}
