//! Concrete collaborator implementations behind the workflow's seam traits.
//!
//! Each client wraps an async third-party API behind the synchronous trait
//! the pipeline consumes, holding its own runtime so workflow code never has
//! to care about async details.

pub mod calendar;
pub mod drive;
pub mod mail;
pub mod oracle;

pub use calendar::GoogleCalendarClient;
pub use drive::GoogleDriveClient;
pub use mail::GmailClient;
pub use oracle::ChatCompletionOracle;

/// Errors raised while constructing a gateway, before any run is dispatched.
#[derive(Debug, thiserror::Error)]
pub enum GatewaySetupError {
    #[error("failed to read service account credentials: {0}")]
    Credentials(String),
    #[error("failed to build http client: {0}")]
    Http(String),
    #[error("gateway runtime unavailable: {0}")]
    Runtime(String),
}
