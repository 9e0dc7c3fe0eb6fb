//! VibePoint command-line client.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vibepoint_gateway::GatewayClient;
use vibepoint_models::{AnalysisTarget, VideoId, VideoKind};
use vibepoint_workflow::poller::AnalysisPoller;
use vibepoint_workflow::progress::{self, ProgressReceiver};
use vibepoint_workflow::render::{render_indexes, render_videos, TRACK_WIDTH};
use vibepoint_workflow::{
    PlacementReport, PollEvent, PollReason, Session, WorkflowConfig, WorkflowError,
};

#[derive(Parser, Debug)]
#[command(name = "vibepoint", author, version, about = "Find ad breaks in creator videos", long_about = None)]
struct Cli {
    /// Backend base URL, overrides VIBEPOINT_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Width of the timeline track in characters
    #[arg(long, global = true, default_value_t = TRACK_WIDTH)]
    width: usize,

    /// Print placement reports as JSON instead of a timeline
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a video file and wait for ad suggestions
    Upload {
        file: PathBuf,
        /// creator or ad
        #[arg(long, default_value = "creator")]
        kind: VideoKind,
        /// Return once analysis has started
        #[arg(long)]
        no_wait: bool,
        /// Creator index used to look up the video duration
        #[arg(long)]
        index: Option<String>,
    },
    /// Start analysis of an indexed video and wait for suggestions
    Analyze {
        video_id: String,
        #[arg(long, default_value = "creator")]
        kind: VideoKind,
        #[arg(long)]
        no_wait: bool,
        #[arg(long)]
        index: Option<String>,
    },
    /// Fetch suggestions once
    Suggest {
        video_id: String,
        #[arg(long)]
        index: Option<String>,
    },
    /// Poll for suggestions of an analysis that is already running
    Watch {
        video_id: String,
        #[arg(long)]
        index: Option<String>,
    },
    /// List catalog indexes
    Indexes,
    /// List the videos of an index
    Videos { index_id: String },
    /// Check that the backend is reachable
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command failed: {:#}", e);
            match e.downcast_ref::<WorkflowError>() {
                Some(workflow_error) => eprintln!("{}", workflow_error.user_message()),
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

/// JSON logs when `LOG_FORMAT=json`, human-readable otherwise. Logs go to
/// stderr so stdout only carries results.
fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = WorkflowConfig::from_env()?;
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url)?;
    }
    info!(api_url = %config.gateway.base_url, ad_index = %config.ad_index_id, "Starting vibepoint");

    let session = Session::new(config.clone())?;
    let output = Output {
        width: cli.width,
        json: cli.json,
    };

    match cli.command {
        Command::Upload {
            file,
            kind,
            no_wait,
            index,
        } => {
            let (sender, receiver) = progress::channel();
            let printer = tokio::spawn(print_upload_progress(receiver));
            let result = session.upload(&file, kind, &sender).await;
            drop(sender);
            printer.await.ok();

            let outcome = result.with_context(|| format!("uploading {}", file.display()))?;
            println!("Video id:   {}", outcome.job.video_id);
            println!("Stream URL: {}", outcome.stream_url);
            if no_wait {
                return Ok(());
            }

            let mut poller = session.poller();
            tokio::spawn(print_poll_events(poller.events()));
            poller.resume(outcome.job.video_id.clone());
            let report = await_with_interrupt(&session, &poller, &outcome.job.video_id, index.as_deref()).await?;
            output.report(&report)?;
        }

        Command::Analyze {
            video_id,
            kind,
            no_wait,
            index,
        } => {
            let video_id = VideoId::from(video_id);
            let mut poller = session.poller();
            tokio::spawn(print_poll_events(poller.events()));

            let job = session
                .analyze(&mut poller, &AnalysisTarget::VideoId(video_id.clone()), kind)
                .await?;
            println!("Analysis started for {}", job.video_id);
            if no_wait {
                return Ok(());
            }

            let report = await_with_interrupt(&session, &poller, &job.video_id, index.as_deref()).await?;
            output.report(&report)?;
        }

        Command::Suggest { video_id, index } => {
            let report = session.suggest(&VideoId::from(video_id), index.as_deref()).await?;
            output.report(&report)?;
        }

        Command::Watch { video_id, index } => {
            let video_id = VideoId::from(video_id);
            let mut poller = session.poller();
            tokio::spawn(print_poll_events(poller.events()));
            poller.resume(video_id.clone());

            let report = await_with_interrupt(&session, &poller, &video_id, index.as_deref()).await?;
            output.report(&report)?;
        }

        Command::Indexes => {
            let indexes = session.list_indexes().await?;
            print!("{}", render_indexes(&indexes));
        }

        Command::Videos { index_id } => {
            let videos = session.list_videos(&index_id).await?;
            print!("{}", render_videos(&videos, config.default_duration_sec));
        }

        Command::Health => {
            let health = GatewayClient::new(config.gateway.clone())?.health().await?;
            println!(
                "{} ({})",
                health.status,
                health.timestamp.as_deref().unwrap_or("no timestamp")
            );
            if !health.is_healthy() {
                anyhow::bail!("backend reported status '{}'", health.status);
            }
        }
    }

    Ok(())
}

/// How placement reports are printed.
struct Output {
    width: usize,
    json: bool,
}

impl Output {
    fn report(&self, report: &PlacementReport) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(report)?);
        } else {
            print!("{}", report.render(self.width));
        }
        Ok(())
    }
}

/// Wait for the poll to finish; Ctrl-C ends the wait as a cancellation.
/// Dropping the poller afterwards stops its task.
async fn await_with_interrupt(
    session: &Session,
    poller: &AnalysisPoller,
    video_id: &VideoId,
    index: Option<&str>,
) -> Result<PlacementReport, WorkflowError> {
    tokio::select! {
        report = session.await_report(poller, video_id, index) => report,
        _ = tokio::signal::ctrl_c() => {
            info!(video_id = %video_id, "Interrupted, cancelling poll");
            Err(WorkflowError::Cancelled)
        }
    }
}

async fn print_upload_progress(mut receiver: ProgressReceiver) {
    while let Some(event) = receiver.recv().await {
        eprintln!("{}", event.text());
    }
}

async fn print_poll_events(mut events: tokio::sync::broadcast::Receiver<PollEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Some(line) = poll_event_text(&event) {
                    eprintln!("{}", line);
                }
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

fn poll_event_text(event: &PollEvent) -> Option<String> {
    let text = match &event.reason {
        PollReason::Started | PollReason::Resumed => "Analyzing video...".to_string(),
        PollReason::Empty | PollReason::NotReady => {
            format!("Analysis still processing (attempt {})...", event.attempt)
        }
        PollReason::Error(message) => format!("Attempt {} failed: {}", event.attempt, message),
        PollReason::Suggested(response) => {
            format!("Found {} suggested ads", response.suggested_ads.len())
        }
        PollReason::TimedOut => {
            "Analysis may still be processing. Please try fetching suggestions again later."
                .to_string()
        }
        PollReason::Cancelled => return None,
    };
    Some(text)
}
