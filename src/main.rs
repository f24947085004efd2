//! homework-bot CLI entry point.
//!
//! Provides `start` to run the poll loop and `check` to perform a single
//! poll without notifying.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{error, info, warn};

use homework_bot::api::PracticumClient;
use homework_bot::config::{Config, EnvSource, Settings};
use homework_bot::notifier::TelegramNotifier;
use homework_bot::poller::{notification_text, poll_once, Poller};

/// homework-bot — homework review status notifier.
#[derive(Parser)]
#[command(name = "homework-bot", version, about)]
struct Cli {
    /// Path to the `.env` file with secrets.
    #[arg(long, global = true, default_value = ".env")]
    env_file: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Run the poll loop until interrupted.
    Start,
    /// Poll once, log the result, and exit without notifying.
    Check {
        /// Unix timestamp to poll from (default: now).
        #[arg(long)]
        from_date: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let env = EnvSource::load(Path::new(&cli.env_file))?;

    match cli.command {
        Command::Start => handle_start(&env).await,
        Command::Check { from_date } => handle_check(&env, from_date).await,
    }
}

/// Run the poll loop.
async fn handle_start(env: &EnvSource) -> anyhow::Result<ExitCode> {
    let settings = Settings::load(|key| env.get(key)).context("failed to load settings")?;

    let _logging_guard = homework_bot::logging::init_production(&settings.logging.dir)?;

    let config = match Config::from_env(&settings, |key| env.get(key)) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "configuration check failed, refusing to start");
            return Err(e.into());
        }
    };

    let api = Arc::new(PracticumClient::new(&config));
    let notifier = Arc::new(TelegramNotifier::new(
        &config.telegram_token,
        &config.telegram_chat_id,
    ));
    let poller = Poller::new(
        api,
        notifier,
        config.retry_period,
        chrono::Utc::now().timestamp(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received shutdown signal");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for shutdown signal");
                shutdown_tx.closed().await;
            }
        }
    });

    info!(
        endpoint = %config.endpoint,
        logs = %settings.logging.dir.display(),
        "homework-bot started"
    );

    poller.run(shutdown_rx).await;
    Ok(ExitCode::SUCCESS)
}

/// Poll once and report the result to the console.
async fn handle_check(env: &EnvSource, from_date: Option<i64>) -> anyhow::Result<ExitCode> {
    homework_bot::logging::init_cli();

    let settings = Settings::load(|key| env.get(key)).context("failed to load settings")?;
    let config = Config::from_env(&settings, |key| env.get(key))?;

    let api = PracticumClient::new(&config);
    let cursor = from_date.unwrap_or_else(|| chrono::Utc::now().timestamp());

    let result = poll_once(&api, cursor).await;
    let text = notification_text(&result);
    match result {
        Ok(outcome) => {
            info!(from_date = cursor, outcome = ?outcome, message = %text, "check complete");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(from_date = cursor, error = %e, "check failed");
            Ok(ExitCode::FAILURE)
        }
    }
}
