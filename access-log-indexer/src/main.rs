use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tracing::{error, info};

use access_log_indexer::telemetry::init_tracing;
use access_log_indexer::{AppError, Dependencies, Settings};
use access_log_indexer_pipeline::{parse_notification, IngestReport, ObjectNotification};
use access_log_indexer_shared::ObjectLocation;

#[derive(Parser)]
#[command(name = "access-log-indexer")]
#[command(about = "Index load balancer access logs into OpenSearch", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every object named by an S3 event notification
    Event {
        /// Read the event JSON from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Process a single object
    Object {
        #[arg(long)]
        bucket: String,
        #[arg(long)]
        key: String,
        /// Region of the bucket (default: AWS_REGION)
        #[arg(long)]
        region: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(settings.log_format);

    let result = tokio::select! {
        result = run(cli.command, &settings) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
            Err(AppError::Interrupted)
        }
    };

    match result {
        Ok(report) => {
            info!(
                objects = report.outcomes.len(),
                lines_indexed = report.lines_indexed(),
                "Ingest complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Ingest failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, settings: &Settings) -> Result<IngestReport, AppError> {
    let notifications = match command {
        Commands::Event { file } => {
            let payload = match file {
                Some(path) => tokio::fs::read_to_string(path).await?,
                None => {
                    let mut payload = String::new();
                    tokio::io::stdin().read_to_string(&mut payload).await?;
                    payload
                }
            };
            parse_notification(&payload, &settings.region)?
        }
        Commands::Object { bucket, key, region } => vec![ObjectNotification {
            location: ObjectLocation::new(region.unwrap_or_else(|| settings.region.clone()), bucket, key),
            size: None,
        }],
    };

    let dependencies = Dependencies::new(settings).await?;
    let report = dependencies
        .orchestrator
        .process_notifications(notifications)
        .await;

    for outcome in &report.outcomes {
        if let Ok(stats) = &outcome.result {
            info!(
                location = %outcome.location,
                stats = %serde_json::to_string(stats).unwrap_or_default(),
                "Object summary"
            );
        }
    }

    match report.failures() {
        0 => Ok(report),
        failed => Err(AppError::IngestFailed {
            failed,
            total: report.outcomes.len(),
        }),
    }
}
