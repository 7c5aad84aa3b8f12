// signdesk: terminal console for a sign-in automation server.

mod api;
mod app;
mod auth;
mod cli;
mod clipboard;
mod config;
mod error;
mod format;
mod state;
mod storage;
mod theme;
mod ui;

#[cfg(test)]
mod test_support;

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::auth::Session;
use crate::config::{Args, ConsoleConfig};
use crate::storage::paths;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let mut args = Args::parse();
    let config = ConsoleConfig::from_args(&args).map_err(|e| anyhow::anyhow!(e.user_message()))?;

    if let Some(command) = args.command.take() {
        init_stderr_tracing(&args.log_level);
        return Ok(match cli::run(command, &config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("error: {}", err.user_message());
                ExitCode::FAILURE
            }
        });
    }

    let _guard = init_file_tracing(&args.log_level, &config)?;
    tracing::info!(server = %config.api_base, "starting signdesk");

    let session = Session::open(&config).context("failed to open preferences")?;
    let mut app = App::new(session, config);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.context("terminal UI failed")?;
    tracing::info!("signdesk exited");
    Ok(ExitCode::SUCCESS)
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// CLI subcommands own no screen, so logs go to stderr.
fn init_stderr_tracing(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(io::stderr)
        .try_init();
}

/// The TUI owns the terminal; log to a daily-rolling file under the data dir.
fn init_file_tracing(level: &str, config: &ConsoleConfig) -> anyhow::Result<WorkerGuard> {
    let log_dir = paths::log_dir(&config.data_dir);
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let appender = tracing_appender::rolling::daily(&log_dir, "signdesk.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(guard)
}
