pub mod api;
mod cli;
pub mod config;
pub mod controller;
pub mod events;
pub mod job;
pub mod options;
pub mod quote;
pub mod segments;
pub mod youtube;

#[cfg(test)]
mod testing;

pub use cli::CliError;
pub use controller::{Controller, ControllerSettings, Session};

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
const DEFAULT_LOG_DIRECTIVE: &str = "shorts_studio=info";

fn init_tracing() {
    let use_json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));

    // A second init (tests, embedding) keeps the first subscriber.
    if use_json {
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .try_init();
    }
}

pub fn run() -> Result<(), CliError> {
    // Load environment variables from .env file
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = cli::Cli::parse();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(cli::dispatch(args))
}
