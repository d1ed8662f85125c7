use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub recruit: RecruitConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            recruit: RecruitConfig::load()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Everything the recruiting pipeline needs to reach its collaborators.
///
/// Missing required variables are fatal before any run is dispatched; the
/// pipeline itself never consults the environment.
#[derive(Debug, Clone)]
pub struct RecruitConfig {
    /// Watched collection for incoming resumes.
    pub resume_folder_id: String,
    /// Corpus collection holding the job postings.
    pub postings_folder_id: String,
    /// Optional collection that processed resumes are moved into.
    pub processed_folder_id: Option<String>,
    /// Path to the Google service-account key file.
    pub service_account_key: PathBuf,
    /// Address outbound mail is sent from.
    pub mail_sender: String,
    pub oracle: OracleConfig,
    pub dispatch: DispatchConfig,
}

impl RecruitConfig {
    fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            resume_folder_id: require("RESUME_FOLDER_ID")?,
            postings_folder_id: require("POSTINGS_FOLDER_ID")?,
            processed_folder_id: env::var("PROCESSED_FOLDER_ID").ok().filter(|v| !v.is_empty()),
            service_account_key: PathBuf::from(require("GOOGLE_SERVICE_ACCOUNT")?),
            mail_sender: require("MAIL_SENDER")?,
            oracle: OracleConfig::load()?,
            dispatch: DispatchConfig::load()?,
        })
    }
}

/// Connection settings for the scoring oracle endpoint.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl OracleConfig {
    fn load() -> Result<Self, ConfigError> {
        let timeout_secs = parse_u64("ORACLE_TIMEOUT_SECS", 30)?;
        Ok(Self {
            url: require("ORACLE_URL")?,
            api_key: require("ORACLE_API_KEY")?,
            model: env::var("ORACLE_MODEL").unwrap_or_else(|_| "gpt-4".to_string()),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Admission and worker-pool sizing.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub admission_cooldown: Duration,
    pub workers: usize,
    pub queue_depth: usize,
}

impl DispatchConfig {
    fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            admission_cooldown: Duration::from_secs(parse_u64("ADMISSION_COOLDOWN_SECS", 60)?),
            workers: parse_u64("DISPATCH_WORKERS", 4)? as usize,
            queue_depth: parse_u64("DISPATCH_QUEUE_DEPTH", 64)? as usize,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVariable(name)),
    }
}

fn parse_u64(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber(name)),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost { source: std::net::AddrParseError },
    #[error("required environment variable {0} is not set")]
    MissingVariable(&'static str),
    #[error("environment variable {0} must be a non-negative integer")]
    InvalidNumber(&'static str),
}
