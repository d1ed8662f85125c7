use crate::demo::run_demo;
use crate::{infra, server};
use clap::{Args, Parser, Subcommand};
use recruit_ai::config::AppConfig;
use recruit_ai::error::AppError;
use recruit_ai::telemetry;
use recruit_ai::workflows::recruit::pipeline::RunOutcome;
use recruit_ai::workflows::recruit::TriggerEvent;

#[derive(Parser, Debug)]
#[command(
    name = "Recruiting Assistant Orchestrator",
    about = "Run the resume/job matching workflow service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run the workflow once for a known document id
    Trigger(TriggerArgs),
    /// Run an end-to-end demo of the matching workflow on in-memory fixtures
    Demo,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct TriggerArgs {
    /// Identifier of the resume in the document store
    #[arg(long)]
    document_id: String,
    /// Display name of the resume (used in notifications and logs)
    #[arg(long)]
    document_name: String,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Trigger(args) => run_trigger(args).await,
        Command::Demo => run_demo(),
    }
}

/// One-shot run of the workflow controller against the real collaborators.
async fn run_trigger(args: TriggerArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let pipeline = infra::build_pipeline(&config.recruit).await?;
    let event = TriggerEvent {
        document_id: args.document_id,
        document_name: args.document_name,
    };

    let summary = tokio::task::spawn_blocking(move || pipeline.run(event))
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?;

    match summary.outcome {
        RunOutcome::Completed => {
            println!(
                "Run completed: {} matched posting(s) for {}",
                summary.state.match_results.len(),
                summary.state.document_name
            );
        }
        RunOutcome::Unreadable => {
            println!(
                "Run stopped: resume {} could not be read (no experience section)",
                summary.state.document_name
            );
        }
    }
    Ok(())
}
