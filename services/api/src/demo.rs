//! End-to-end CLI demo of the matching workflow over in-memory fixtures.
//!
//! Useful for stakeholder walkthroughs and for exercising the pipeline
//! without Google credentials or a model endpoint. The fixture gateways are
//! also reused by the route tests.

use recruit_ai::error::AppError;
use recruit_ai::workflows::recruit::corpus::{
    DocumentHandle, DocumentStore, DocumentStoreError, FetchedDocument,
};
use recruit_ai::workflows::recruit::matching::{OracleError, ScoreOracle};
use recruit_ai::workflows::recruit::notify::{MailError, MailGateway, OutboundMessage};
use recruit_ai::workflows::recruit::pipeline::{PipelineConfig, RecruitPipeline, RunOutcome};
use recruit_ai::workflows::recruit::scheduling::{
    BusyInterval, CalendarError, CalendarGateway, SlotPlan,
};
use recruit_ai::workflows::recruit::TriggerEvent;
use std::sync::{Arc, Mutex};

pub(crate) const DEMO_RESUME_ID: &str = "demo-resume";
const DEMO_POSTINGS_FOLDER: &str = "demo-postings";

const DEMO_RESUME: &str = "Jordan Blake\nSeattle, WA\njordan.blake@example.com\n\nWORK EXPERIENCE\nSenior Backend Engineer, Acme Corp (2019-2025)\nDesigned and ran distributed ingest pipelines in Rust on Tokio.\nLed a four-person services team through two migrations.\nEDUCATION\nBS Computer Science, University of Washington";

const DEMO_BACKEND_POSTING: &str = "Acme Corp is hiring a backend engineer\ncontact: Dana Reed\ndana.reed@acme.com\nYou will own ingestion services end to end\nSkills Required\nRust\nTokio\nOperational ownership\nAbout the company\nAcme ships developer infrastructure";

const DEMO_DATA_POSTING: &str = "Beta Industries data platform role\nrecruiter: Lee Wong\nlee.wong@beta.io\nThe data group runs warehouse tooling\nRequired Skills\nSpark\nScala\nAbout the team\nSmall and senior";

pub(crate) struct DemoStore;

impl DocumentStore for DemoStore {
    fn list_documents(&self, folder_id: &str) -> Result<Vec<DocumentHandle>, DocumentStoreError> {
        if folder_id != DEMO_POSTINGS_FOLDER {
            return Ok(Vec::new());
        }
        Ok(vec![
            DocumentHandle {
                id: "demo-posting-backend".to_string(),
                name: "acme-backend-engineer.txt".to_string(),
                media_type: "text/plain".to_string(),
            },
            DocumentHandle {
                id: "demo-posting-data".to_string(),
                name: "beta-data-platform.txt".to_string(),
                media_type: "text/plain".to_string(),
            },
        ])
    }

    fn fetch_document(&self, document_id: &str) -> Result<FetchedDocument, DocumentStoreError> {
        let body = match document_id {
            DEMO_RESUME_ID => DEMO_RESUME,
            "demo-posting-backend" => DEMO_BACKEND_POSTING,
            "demo-posting-data" => DEMO_DATA_POSTING,
            other => return Err(DocumentStoreError::NotFound(other.to_string())),
        };
        Ok(FetchedDocument {
            bytes: body.as_bytes().to_vec(),
            media_type: "text/plain".to_string(),
        })
    }

    fn archive_document(
        &self,
        _document_id: &str,
        _target_folder_id: &str,
    ) -> Result<(), DocumentStoreError> {
        Ok(())
    }
}

/// Scripted stand-in for the model endpoint.
pub(crate) struct DemoOracle;

impl ScoreOracle for DemoOracle {
    fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        if prompt.contains("tokio") {
            Ok("Score: 9/10\nDid Meet All Requirements: Yes\nComment: The candidate's Rust and Tokio service background covers every listed requirement.".to_string())
        } else {
            Ok("Score: 2/10\nDid Meet All Requirements: No\nComment: No Spark or Scala experience appears anywhere in the resume.".to_string())
        }
    }
}

#[derive(Default)]
pub(crate) struct DemoMail {
    messages: Mutex<Vec<OutboundMessage>>,
}

impl DemoMail {
    pub(crate) fn sent(&self) -> Vec<OutboundMessage> {
        self.messages.lock().expect("mail log").clone()
    }
}

impl MailGateway for DemoMail {
    fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        self.messages
            .lock()
            .expect("mail log")
            .push(message.clone());
        Ok(())
    }
}

pub(crate) struct DemoCalendar;

impl CalendarGateway for DemoCalendar {
    fn busy_intervals(
        &self,
        _attendee: &str,
        from: chrono::NaiveDateTime,
        _to: chrono::NaiveDateTime,
    ) -> Result<Vec<BusyInterval>, CalendarError> {
        // One standing meeting on the first morning of each queried week.
        let meeting_start = from + chrono::Duration::hours(10);
        Ok(vec![(
            meeting_start,
            meeting_start + chrono::Duration::minutes(30),
        )])
    }
}

pub(crate) type DemoPipeline = RecruitPipeline<DemoStore, DemoOracle, DemoMail, DemoCalendar>;

pub(crate) fn demo_pipeline() -> (Arc<DemoPipeline>, Arc<DemoMail>) {
    let mail = Arc::new(DemoMail::default());
    let pipeline = Arc::new(RecruitPipeline::new(
        Arc::new(DemoStore),
        Arc::new(DemoOracle),
        Arc::clone(&mail),
        Arc::new(DemoCalendar),
        PipelineConfig {
            postings_folder_id: DEMO_POSTINGS_FOLDER.to_string(),
            processed_folder_id: None,
            slot_plan: SlotPlan::default(),
        },
    ));
    (pipeline, mail)
}

pub(crate) fn run_demo() -> Result<(), AppError> {
    let (pipeline, mail) = demo_pipeline();

    println!("Recruiting workflow demo");
    println!("Processing fixture resume 'jordan-blake-resume.pdf'\n");

    let summary = pipeline.run(TriggerEvent {
        document_id: DEMO_RESUME_ID.to_string(),
        document_name: "jordan-blake-resume.pdf".to_string(),
    });

    let state = &summary.state;
    println!(
        "Applicant: {} <{}>",
        state.applicant_name.as_deref().unwrap_or("(unknown)"),
        state.applicant_email
    );
    println!("Postings read: {}", state.corpus_entries.len());
    println!("Recruiter contacts: {}", state.recruiter_directory.len());

    match summary.outcome {
        RunOutcome::Unreadable => {
            println!("\nOutcome: resume could not be read (no experience section)");
            return Ok(());
        }
        RunOutcome::Completed => {
            println!("\nMatched postings");
            if state.match_results.is_empty() {
                println!("- none");
            }
            for matched in &state.match_results {
                println!(
                    "- {} (recruiter: {})",
                    matched.source_filename,
                    matched.recruiter_email.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    println!("\nOutbound messages");
    for message in mail.sent() {
        println!("- to {} | {}", message.to, message.subject);
    }

    Ok(())
}
