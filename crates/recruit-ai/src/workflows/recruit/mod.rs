//! Resume/job matching workflow.
//!
//! One run per triggering resume: extract text and applicant identity, isolate
//! the experience section, read the posting corpus, score experience against
//! each posting's requirements through the oracle, then notify matched
//! recruiters and the applicant. The pipeline drives a fixed stage graph with
//! a single data-quality branch; admission control keeps duplicate trigger
//! events from dispatching overlapping runs.

pub mod admission;
pub mod corpus;
pub mod dispatch;
pub mod entities;
pub mod extract;
pub mod gateways;
pub mod matching;
pub mod notify;
pub mod pipeline;
pub mod scheduling;
pub mod state;

pub use admission::AdmissionController;
pub use corpus::{DocumentHandle, DocumentStore, DocumentStoreError, FetchedDocument};
pub use dispatch::{RunDispatcher, TriggerEvent};
pub use matching::{OracleError, ScoreOracle};
pub use notify::{MailGateway, MailError, OutboundMessage};
pub use pipeline::{PipelineConfig, RecruitPipeline, RunOutcome, RunSummary};
pub use scheduling::{CalendarError, CalendarGateway, SlotPlan};
pub use state::{CorpusEntry, MatchResult, RecruitState, RecruiterContact};
