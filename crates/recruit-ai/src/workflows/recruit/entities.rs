//! Heuristic extraction of people and bounded sections from document text.
//!
//! Every extractor here follows the same philosophy: try cheap structural
//! heuristics in priority order, stop at the first success, and fall back to
//! a weaker signal when all of them miss. Each heuristic is an independent
//! function so it can be tested on its own; cascades are ordered slices
//! combined first-success-wins.

use regex::Regex;
use std::sync::OnceLock;

const EXPERIENCE_START: &str = "WORK EXPERIENCE";
const EXPERIENCE_END: &[&str] = &["CERTIFICATIONS", "EDUCATION", "SKILLS", "PROJECTS", "SUMMARY"];

const REQUIREMENTS_START: &[&str] = &["skills required", "required skills", "job requirements"];
const REQUIREMENTS_END: &[&str] = &[
    "nice to have",
    "about you",
    "about the team",
    "about the company",
];

/// Lines containing any of these cannot be a person's name.
const NAME_DENYLIST: &[&str] = &[
    "resume",
    "cv",
    "curriculum vitae",
    "phone",
    "email",
    "address",
    "objective",
    "summary",
    "experience",
    "education",
    "skills",
    "linkedin",
    "github",
    "portfolio",
    "website",
    "http",
    "www",
];

/// How many leading lines the heading heuristic inspects.
const HEADING_SCAN_LINES: usize = 10;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email pattern")
    })
}

fn name_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z\s\.]+$").expect("name line pattern"))
}

/// First email-shaped token in the text; syntax only, no validation.
pub fn first_email(text: &str) -> Option<String> {
    email_regex().find(text).map(|m| m.as_str().to_string())
}

type NameHeuristic = fn(&str, Option<&str>) -> Option<String>;

const APPLICANT_NAME_HEURISTICS: &[NameHeuristic] =
    &[heading_line_name, labeled_applicant_name, name_from_email];

const RECRUITER_NAME_HEURISTICS: &[NameHeuristic] = &[labeled_recruiter_name, name_from_email];

/// Candidate name from resume text, heading heuristic first.
pub fn applicant_name(text: &str, email: Option<&str>) -> Option<String> {
    run_cascade(APPLICANT_NAME_HEURISTICS, text, email)
}

/// Contact name from a posting, label patterns first.
pub fn recruiter_name(text: &str, email: Option<&str>) -> Option<String> {
    run_cascade(RECRUITER_NAME_HEURISTICS, text, email)
}

fn run_cascade(heuristics: &[NameHeuristic], text: &str, email: Option<&str>) -> Option<String> {
    heuristics
        .iter()
        .find_map(|heuristic| heuristic(text, email))
}

/// Resumes conventionally put the candidate's name as the first non-trivial
/// line, so scan the top of the document for a short all-letters line.
fn heading_line_name(text: &str, _email: Option<&str>) -> Option<String> {
    for line in text.lines().take(HEADING_SCAN_LINES) {
        let line = line.trim();
        if line.is_empty() || line.len() >= 100 {
            continue;
        }
        let lowered = line.to_lowercase();
        if NAME_DENYLIST.iter().any(|word| lowered.contains(word)) {
            continue;
        }
        if name_line_regex().is_match(line) && line.split_whitespace().count() <= 4 {
            return Some(line.to_string());
        }
    }
    None
}

fn labeled_applicant_name(text: &str, _email: Option<&str>) -> Option<String> {
    labeled_name(
        text,
        &[
            r"(?i)name\s*:\s*([A-Za-z. ]+)",
            r"(?i)full\s+name\s*:\s*([A-Za-z. ]+)",
            r"(?i)contact\s+name\s*:\s*([A-Za-z. ]+)",
        ],
    )
}

fn labeled_recruiter_name(text: &str, _email: Option<&str>) -> Option<String> {
    labeled_name(
        text,
        &[
            r"(?i)from\s*:\s*([A-Za-z. ]+)",
            r"(?i)sent\s+by\s*:\s*([A-Za-z. ]+)",
            r"(?i)contact\s*:\s*([A-Za-z. ]+)",
            r"(?i)recruiter\s*:\s*([A-Za-z. ]+)",
            r"(?i)hiring\s+manager\s*:\s*([A-Za-z. ]+)",
            r"(?i)contact\s+name\s*:\s*([A-Za-z. ]+)",
        ],
    )
}

fn labeled_name(text: &str, patterns: &[&str]) -> Option<String> {
    for pattern in patterns {
        let re = Regex::new(pattern).expect("label pattern");
        if let Some(captures) = re.captures(text) {
            let name = captures
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .filter(|name| !name.is_empty());
            if name.is_some() {
                return name;
            }
        }
    }
    None
}

/// Weakest signal: derive a display name from the email local part.
fn name_from_email(_text: &str, email: Option<&str>) -> Option<String> {
    let local = email?.split('@').next()?;
    let cleaned = local
        .chars()
        .map(|c| {
            if matches!(c, '0'..='9' | '.' | '_' | '-') {
                ' '
            } else {
                c
            }
        })
        .collect::<String>();
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    let joined = words.join(" ");
    if joined.len() > 2 && (1..=3).contains(&words.len()) {
        Some(title_case(&joined))
    } else {
        None
    }
}

fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
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

/// Isolate the experience section of a resume.
///
/// The excerpt runs from the line containing the start marker (inclusive) to
/// the first later line containing a recognized section heading (exclusive),
/// or to end-of-text. `None` means the resume has no experience section and
/// the run must branch to its unreadable terminal.
pub fn experience_section(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let start = lines
        .iter()
        .position(|line| line.to_uppercase().contains(EXPERIENCE_START))?;

    let end = lines[start + 1..]
        .iter()
        .position(|line| {
            let upper = line.to_uppercase();
            EXPERIENCE_END.iter().any(|key| upper.contains(key))
        })
        .map(|offset| start + 1 + offset)
        .unwrap_or(lines.len());

    Some(lines[start..end].join("\n"))
}

/// Normalize posting text for matching: per-line NBSP and bullet-glyph
/// cleanup, internal whitespace collapsed, then lowercased.
pub fn normalize_posting(text: &str) -> String {
    let cleaned: Vec<String> = text
        .lines()
        .map(|line| {
            line.replace('\u{a0}', " ")
                .replace('\u{f0b7}', "")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();
    cleaned.join("\n").to_lowercase()
}

/// Isolate the requirements block of a normalized posting.
///
/// The start-marker scan skips the first two lines; the window opens six
/// lines before the marker (clamped) so context the heading refers to is
/// kept, and closes at the first end-marker line or end-of-text. Without a
/// start marker the whole normalized text stands in for the requirements.
pub fn requirements_excerpt(normalized: &str) -> String {
    let lines: Vec<&str> = normalized
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let marker = lines
        .iter()
        .enumerate()
        .skip(2)
        .find(|(_, line)| REQUIREMENTS_START.iter().any(|key| line.contains(key)))
        .map(|(index, _)| index);

    match marker {
        Some(index) => {
            let start = index.saturating_sub(6);
            let end = lines[index + 1..]
                .iter()
                .position(|line| REQUIREMENTS_END.iter().any(|key| line.contains(key)))
                .map(|offset| index + 1 + offset)
                .unwrap_or(lines.len());
            lines[start..end].join("\n")
        }
        None => lines.join("\n"),
    }
}
