// src/cli.rs
// Command line surface over the controller

use crate::api::{ApiError, HttpBackend, OutputFile, ShortsBackend};
use crate::config::{self, AppConfig, ConfigError};
use crate::controller::{Controller, ControllerSettings};
use crate::events::{ControllerEvent, EventReceiver, Notice, NoticeLevel};
use crate::job::{Job, JobState, StatusUpdate, SubmitError};
use crate::options::{ColorGrading, QuoteCategory, QuoteFormat, QuoteLanguage, Resolution};
use crate::segments::{parser, SegmentError};
use crate::youtube;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Segments(#[from] SegmentError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Interrupted")]
    Interrupted,
}

#[derive(Debug, Parser)]
#[command(name = "shorts-studio")]
#[command(about = "Cut YouTube videos into shorts with the processing service")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Submit a video with its clip ranges and wait for the shorts
    Process {
        /// YouTube link of the source video
        url: String,
        /// Clip range such as "00:01:02 - 00:10:00" (repeatable)
        #[arg(long = "segment", value_name = "RANGE")]
        segments: Vec<String>,
        /// File with one clip range per line
        #[arg(long, value_name = "FILE")]
        segments_file: Option<PathBuf>,
        #[arg(long)]
        resolution: Option<Resolution>,
        #[arg(long)]
        color_grading: Option<ColorGrading>,
        #[arg(long)]
        project_name: Option<String>,
        /// Download finished clips into this directory
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Show the clip ranges found in bulk text (stdin when no file is given)
    Parse { file: Option<PathBuf> },

    /// Query a project's status once
    Status { project_id: String },

    /// Generate a quote card or quote video
    Quote {
        #[arg(long)]
        language: Option<QuoteLanguage>,
        #[arg(long)]
        category: Option<QuoteCategory>,
        #[arg(long)]
        format: Option<QuoteFormat>,
        /// Download the result into this directory
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Print the config file location
    Path,
}

pub async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };

    match cli.command {
        Commands::Parse { file } => {
            let text = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut text = String::new();
                    std::io::stdin().read_to_string(&mut text)?;
                    text
                }
            };
            print_parsed(&text);
            Ok(())
        }
        Commands::Config(ConfigCommands::Path) => {
            println!("{}", config_path.display());
            Ok(())
        }
        Commands::Config(ConfigCommands::Show) => {
            let config = config::load_or_create(&config_path)?;
            println!("{}", serde_json::to_string_pretty(&config).map_err(ConfigError::from)?);
            println!("effective api url: {}", config.api_base_url());
            Ok(())
        }
        Commands::Status { project_id } => {
            let config = config::load_or_create(&config_path)?;
            let backend = http_backend(&config)?;
            match StatusUpdate::classify(backend.status(&project_id).await?) {
                Some(update) => print_status(&backend, &project_id, &update),
                None => println!("{}: no status reported", project_id),
            }
            Ok(())
        }
        Commands::Quote {
            language,
            category,
            format,
            output,
        } => {
            let config = config::load_or_create(&config_path)?;
            let backend = Arc::new(http_backend(&config)?);
            let (mut controller, mut events) =
                Controller::new(backend.clone(), ControllerSettings::from(&config));
            let quote = &mut controller.session_mut().quote;
            quote.language = language.unwrap_or(quote.language);
            quote.category = category.unwrap_or(quote.category);
            quote.format = format.unwrap_or(quote.format);

            let result = controller.generate_quote().await;
            drain_notices(&mut events);
            let result = result?;
            println!("{} ({:?})", backend.artifact_url(&result.url)?, result.kind);

            if let Some(dir) = output {
                let output = OutputFile {
                    filename: file_name_of(&result.url),
                    url: result.url.clone(),
                };
                let path = backend.download_artifact(&output, &dir).await?;
                println!("saved {}", path.display());
            }
            Ok(())
        }
        Commands::Process {
            url,
            segments,
            segments_file,
            resolution,
            color_grading,
            project_name,
            output_dir,
        } => {
            let config = config::load_or_create(&config_path)?;
            let file_text = match segments_file {
                Some(path) => Some(std::fs::read_to_string(path)?),
                None => None,
            };

            let mut settings = ControllerSettings::from(&config);
            if let Some(name) = project_name.filter(|name| !name.trim().is_empty()) {
                settings.project_name = name;
            }
            if let Some(resolution) = resolution {
                settings.options.resolution = resolution;
            }
            if let Some(color_grading) = color_grading {
                settings.options.color_grading = color_grading;
            }

            let job = process(
                &config,
                settings,
                url,
                bulk_text(&segments, file_text.as_deref()),
                output_dir.as_deref(),
            )
            .await?;
            if let Some(secs) = job.elapsed_secs() {
                println!("finished in {}s", secs);
            }
            Ok(())
        }
    }
}

async fn process(
    config: &AppConfig,
    settings: ControllerSettings,
    url: String,
    bulk: String,
    output_dir: Option<&Path>,
) -> Result<Job, CliError> {
    let backend = Arc::new(http_backend(config)?);
    let (mut controller, mut events) = Controller::new(backend.clone(), settings);

    if let Some(preview) = youtube::embed_url(&url) {
        tracing::info!("Source preview: {}", preview);
    }
    controller.set_source_url(url);

    if bulk.trim().is_empty() {
        tracing::info!("No ranges given, using the default segment");
    } else {
        controller.set_bulk_text(bulk);
        if controller.apply_bulk_text().is_none() {
            drain_notices(&mut events);
            return Err(SegmentError::NoTimestamps.into());
        }
    }

    for segment in controller.segments() {
        println!("  {} - {}", segment.start, segment.end);
    }
    let options = controller.session().options;
    println!(
        "{}... ({}, grading: {})",
        controller.submit_label(),
        options.resolution.label(),
        options.color_grading.label()
    );

    let submitted = controller.submit().await;
    drain_notices(&mut events);
    let project_id = submitted?;
    println!("project id: {}", project_id);

    let job = wait_for_terminal(&controller, &mut events).await?;
    match job.state {
        JobState::Completed => {
            for output in &job.outputs {
                println!("{}  {}", output.filename, backend.artifact_url(&output.url)?);
            }
            if let Some(dir) = output_dir {
                for output in &job.outputs {
                    let path = backend.download_artifact(output, dir).await?;
                    println!("saved {}", path.display());
                }
            }
            Ok(job)
        }
        _ => Err(CliError::JobFailed(job.message)),
    }
}

/// Print progress until the tracked job finishes. Ctrl-C stops polling.
async fn wait_for_terminal(
    controller: &Controller,
    events: &mut EventReceiver,
) -> Result<Job, CliError> {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(ControllerEvent::JobChanged(job)) if job.state.is_terminal() => {
                    drain_notices(events);
                    return Ok(job);
                }
                Some(ControllerEvent::JobChanged(job)) => println!("... {}", job.message),
                Some(ControllerEvent::Notice(notice)) => print_notice(&notice),
                Some(ControllerEvent::StatusPolled { .. }) => {}
                None => return Ok(controller.job()),
            },
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted, stopping poll");
                controller.shutdown();
                return Err(CliError::Interrupted);
            }
        }
    }
}

fn http_backend(config: &AppConfig) -> Result<HttpBackend, ApiError> {
    let backend = HttpBackend::new(&config.api_base_url(), config.request_timeout())?;
    tracing::debug!("Using service at {}", backend.base_url());
    Ok(backend)
}

fn drain_notices(events: &mut EventReceiver) {
    while let Ok(event) = events.try_recv() {
        if let ControllerEvent::Notice(notice) = event {
            print_notice(&notice);
        }
    }
}

fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Error => eprintln!("{}", notice.message),
        NoticeLevel::Success => println!("{}", notice.message),
    }
}

fn print_parsed(text: &str) {
    let segments = parser::parse(text);
    println!("{} clip(s) detected", segments.len());
    for (index, segment) in segments.iter().enumerate() {
        println!("{:>3}. {} - {}", index + 1, segment.start, segment.end);
    }
}

fn print_status(backend: &HttpBackend, project_id: &str, update: &StatusUpdate) {
    match update {
        StatusUpdate::Running { message } => println!("{}: processing ({})", project_id, message),
        StatusUpdate::Failed { message } => println!("{}: error ({})", project_id, message),
        StatusUpdate::Completed {
            outputs,
            email_sent,
        } => {
            println!("{}: completed, email_sent={}", project_id, email_sent);
            for output in outputs {
                match backend.artifact_url(&output.url) {
                    Ok(url) => println!("  {}  {}", output.filename, url),
                    Err(_) => println!("  {}  {}", output.filename, output.url),
                }
            }
        }
    }
}

/// Joins `--segment` values and file contents into one bulk text.
fn bulk_text(segments: &[String], file_text: Option<&str>) -> String {
    let mut lines: Vec<&str> = segments.iter().map(String::as_str).collect();
    if let Some(text) = file_text {
        lines.extend(text.lines());
    }
    lines.join("\n")
}

fn file_name_of(url: &str) -> String {
    let path = url.split(|c| c == '?' || c == '#').next().unwrap_or(url);
    path.rsplit('/')
        .find(|part| !part.is_empty())
        .unwrap_or("quote")
        .to_string()
}
