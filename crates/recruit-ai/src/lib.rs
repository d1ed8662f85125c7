//! Recruiting-automation workflow library.
//!
//! Watches a document store for newly uploaded resumes, extracts structured
//! applicant information, scores the resume against a job-posting corpus via
//! a language-model oracle, and notifies matched recruiters and the applicant
//! with proposed interview times. The HTTP/CLI shell lives in `services/api`.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
