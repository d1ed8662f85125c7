//! Wiring of the workflow pipeline to its production collaborators and the
//! intake-side admission/dispatch plumbing the routes consume.

use metrics_exporter_prometheus::PrometheusHandle;
use recruit_ai::config::RecruitConfig;
use recruit_ai::error::AppError;
use recruit_ai::workflows::recruit::gateways::{
    ChatCompletionOracle, GatewaySetupError, GmailClient, GoogleCalendarClient, GoogleDriveClient,
};
use recruit_ai::workflows::recruit::pipeline::{PipelineConfig, RecruitPipeline};
use recruit_ai::workflows::recruit::scheduling::SlotPlan;
use recruit_ai::workflows::recruit::{AdmissionController, RunDispatcher, TriggerEvent};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Decision taken for one inbound trigger, surfaced to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum IntakeDecision {
    Dispatched,
    /// Change event did not describe a processable resume upload.
    Filtered(&'static str),
    /// Same document seen again inside the admission cooldown.
    DuplicateSuppressed,
    /// Queue full or workers gone; the caller sees a failure.
    Rejected(String),
}

/// Front door for trigger events: filters change notifications, gates them
/// through admission, and hands admitted work to the dispatcher.
pub(crate) struct RecruitIntake {
    admission: Arc<AdmissionController>,
    dispatcher: RunDispatcher,
    watched_folder_id: String,
}

impl RecruitIntake {
    pub(crate) fn new(
        admission: Arc<AdmissionController>,
        dispatcher: RunDispatcher,
        watched_folder_id: String,
    ) -> Self {
        Self {
            admission,
            dispatcher,
            watched_folder_id,
        }
    }

    /// Handle one document-store change event.
    pub(crate) fn handle_change(
        &self,
        change_type: &str,
        folder_id: &str,
        document_id: &str,
        document_name: &str,
    ) -> IntakeDecision {
        if change_type != "add" {
            return IntakeDecision::Filtered("not an addition");
        }
        if folder_id != self.watched_folder_id {
            return IntakeDecision::Filtered("outside the watched collection");
        }
        if !document_name.to_lowercase().ends_with(".pdf") {
            return IntakeDecision::Filtered("not a pdf");
        }
        self.admit_and_dispatch(document_id, document_name)
    }

    /// Manual trigger for a known document: skips the change filter, still
    /// passes admission so repeated triggers don't double-process.
    pub(crate) fn trigger(&self, document_id: &str, document_name: &str) -> IntakeDecision {
        self.admit_and_dispatch(document_id, document_name)
    }

    pub(crate) fn reset_dedup(&self) {
        self.admission.reset();
        info!("admission map cleared");
    }

    fn admit_and_dispatch(&self, document_id: &str, document_name: &str) -> IntakeDecision {
        if !self.admission.admit(document_id) {
            info!(document = document_name, "duplicate trigger suppressed");
            return IntakeDecision::DuplicateSuppressed;
        }

        let event = TriggerEvent {
            document_id: document_id.to_string(),
            document_name: document_name.to_string(),
        };
        match self.dispatcher.submit(event) {
            Ok(()) => {
                info!(document = document_name, "run dispatched");
                IntakeDecision::Dispatched
            }
            Err(err) => {
                // The run never started; release the cooldown so a retry can
                // get through.
                self.admission.forget(document_id);
                warn!(document = document_name, error = %err, "dispatch failed");
                IntakeDecision::Rejected(err.to_string())
            }
        }
    }
}

pub(crate) type ProductionPipeline = RecruitPipeline<
    GoogleDriveClient<DriveConnector>,
    ChatCompletionOracle,
    GmailClient<GmailConnector>,
    GoogleCalendarClient<CalendarConnector>,
>;

pub(crate) type DriveConnector = google_drive3::hyper_rustls::HttpsConnector<
    google_drive3::hyper_util::client::legacy::connect::HttpConnector,
>;
pub(crate) type GmailConnector = google_gmail1::hyper_rustls::HttpsConnector<
    google_gmail1::hyper_util::client::legacy::connect::HttpConnector,
>;
pub(crate) type CalendarConnector = google_calendar3::hyper_rustls::HttpsConnector<
    google_calendar3::hyper_util::client::legacy::connect::HttpConnector,
>;

/// Build the workflow pipeline wired to Google Drive, Gmail, Google Calendar,
/// and the configured scoring oracle.
pub(crate) async fn build_pipeline(
    config: &RecruitConfig,
) -> Result<Arc<ProductionPipeline>, AppError> {
    let drive = GoogleDriveClient::with_runtime(drive_hub(&config.service_account_key).await?)?;
    let mail = GmailClient::with_runtime(
        gmail_hub(&config.service_account_key).await?,
        config.mail_sender.clone(),
    )?;
    let calendar =
        GoogleCalendarClient::with_runtime(calendar_hub(&config.service_account_key).await?)?;
    let oracle = ChatCompletionOracle::new(&config.oracle)?;

    let pipeline_config = PipelineConfig {
        postings_folder_id: config.postings_folder_id.clone(),
        processed_folder_id: config.processed_folder_id.clone(),
        slot_plan: SlotPlan::default(),
    };

    Ok(Arc::new(RecruitPipeline::new(
        Arc::new(drive),
        Arc::new(oracle),
        Arc::new(mail),
        Arc::new(calendar),
        pipeline_config,
    )))
}

async fn drive_hub(
    key_path: &Path,
) -> Result<google_drive3::DriveHub<DriveConnector>, GatewaySetupError> {
    use google_drive3::{hyper_rustls, hyper_util, yup_oauth2};

    let key = yup_oauth2::read_service_account_key(key_path)
        .await
        .map_err(|err| GatewaySetupError::Credentials(err.to_string()))?;
    let auth = yup_oauth2::ServiceAccountAuthenticator::builder(key)
        .build()
        .await
        .map_err(|err| GatewaySetupError::Credentials(err.to_string()))?;

    let connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .map_err(|err| GatewaySetupError::Http(err.to_string()))?
        .https_or_http()
        .enable_http1()
        .build();
    let client = hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
        .build(connector);

    Ok(google_drive3::DriveHub::new(client, auth))
}

async fn gmail_hub(
    key_path: &Path,
) -> Result<google_gmail1::Gmail<GmailConnector>, GatewaySetupError> {
    use google_gmail1::{hyper_rustls, hyper_util, yup_oauth2};

    let key = yup_oauth2::read_service_account_key(key_path)
        .await
        .map_err(|err| GatewaySetupError::Credentials(err.to_string()))?;
    let auth = yup_oauth2::ServiceAccountAuthenticator::builder(key)
        .build()
        .await
        .map_err(|err| GatewaySetupError::Credentials(err.to_string()))?;

    let connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .map_err(|err| GatewaySetupError::Http(err.to_string()))?
        .https_or_http()
        .enable_http1()
        .build();
    let client = hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
        .build(connector);

    Ok(google_gmail1::Gmail::new(client, auth))
}

async fn calendar_hub(
    key_path: &Path,
) -> Result<google_calendar3::CalendarHub<CalendarConnector>, GatewaySetupError> {
    use google_calendar3::{hyper_rustls, hyper_util, yup_oauth2};

    let key = yup_oauth2::read_service_account_key(key_path)
        .await
        .map_err(|err| GatewaySetupError::Credentials(err.to_string()))?;
    let auth = yup_oauth2::ServiceAccountAuthenticator::builder(key)
        .build()
        .await
        .map_err(|err| GatewaySetupError::Credentials(err.to_string()))?;

    let connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .map_err(|err| GatewaySetupError::Http(err.to_string()))?
        .https_or_http()
        .enable_http1()
        .build();
    let client = hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
        .build(connector);

    Ok(google_calendar3::CalendarHub::new(client, auth))
}
