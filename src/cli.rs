// Non-interactive subcommands.
// Each one opens the stored session, performs one request and prints a summary.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use chrono::Local;
use clap::Subcommand;

use crate::api::types::SignStatus;
use crate::auth::Session;
use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, Result};
use crate::format::{format_percent, format_quota};
use crate::storage::{paths, store};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign in and store the access token
    Login {
        #[arg(short, long)]
        username: String,
        /// Read from stdin when not set
        #[arg(long, env = "SIGNDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored access token
    Logout,
    /// Print the dashboard summary
    Status,
    /// Sign one account, or every active account
    Sign {
        #[arg(short, long)]
        account: Option<u64>,
    },
    /// Export or import a server backup
    Backup {
        #[command(subcommand)]
        action: BackupCommand,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum BackupCommand {
    /// Download a backup file
    Export {
        #[arg(long)]
        include_logs: bool,
        /// Defaults to the exports directory under the data dir
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Upload a backup file
    Import {
        file: PathBuf,
        /// Replace existing records instead of skipping them
        #[arg(long)]
        overwrite: bool,
    },
}

/// Run a subcommand against the configured server, printing to stdout.
/// A rejected credential is cleared before the error is returned.
pub async fn run(command: Command, config: &ConsoleConfig) -> Result<()> {
    let mut session = Session::open(config)?;
    let mut out = io::stdout();
    let result = execute(command, &mut session, config, &mut out).await;
    if let Err(err) = &result {
        if err.is_unauthorized() {
            session.expire();
        }
    }
    result
}

async fn execute(
    command: Command,
    session: &mut Session,
    config: &ConsoleConfig,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            session.login(&username, &password).await?;
            writeln!(out, "Logged in as {}", username)?;
        }
        Command::Logout => {
            session.logout()?;
            writeln!(out, "Logged out")?;
        }
        Command::Status => {
            require_login(session)?;
            let user = session.client().current_user().await?;
            let data = session.client().get_dashboard().await?;
            writeln!(
                out,
                "signed in as {} on {}{}",
                user.username,
                session.client().base_url(),
                user.app_version
                    .map(|v| format!(" (server {})", v))
                    .unwrap_or_default()
            )?;
            writeln!(
                out,
                "accounts   {} ({} active, {} unhealthy)",
                data.account_count, data.active_account_count, data.unhealthy_account_count
            )?;
            writeln!(
                out,
                "today      {}/{} signed, {} success",
                data.today_sign_success,
                data.today_sign_count,
                format_percent(data.success_rate.unwrap_or(0.0), 1)
            )?;
            writeln!(
                out,
                "this month {}",
                data.month_reward_display
                    .unwrap_or_else(|| format_quota(Some(data.month_reward)))
            )?;
            writeln!(
                out,
                "balance    {}",
                data.total_quota_display
                    .unwrap_or_else(|| format_quota(Some(data.total_quota)))
            )?;
        }
        Command::Sign { account: Some(id) } => {
            require_login(session)?;
            let outcome = session.client().sign_account(id).await?;
            let reward = outcome
                .reward_display
                .clone()
                .unwrap_or_else(|| format_quota(Some(outcome.reward_quota)));
            match outcome.effective_status() {
                SignStatus::Success => writeln!(out, "Account #{} signed, reward {}", id, reward)?,
                SignStatus::AlreadySigned => writeln!(out, "Account #{} already signed today", id)?,
                SignStatus::Failed => {
                    return Err(ConsoleError::Rejected(format!(
                        "Sign failed for account #{}: {}",
                        id, outcome.message
                    )));
                }
            }
        }
        Command::Sign { account: None } => {
            require_login(session)?;
            let result = session.client().batch_sign().await?;
            for item in &result.results {
                let mark = if item.success { "ok  " } else { "FAIL" };
                writeln!(
                    out,
                    "{} #{:<5} {:<20} {}",
                    mark,
                    item.account_id,
                    item.username.as_deref().unwrap_or("-"),
                    item.message
                )?;
            }
            writeln!(
                out,
                "{} signed, {} already signed, {} failed of {}",
                result.success_count, result.already_signed_count, result.fail_count, result.total
            )?;
        }
        Command::Backup {
            action: BackupCommand::Export { include_logs, out: path },
        } => {
            require_login(session)?;
            let path = path.unwrap_or_else(|| paths::backup_export_path(&config.data_dir, Local::now()));
            let bytes = session.client().export_backup(include_logs).await?;
            store::write_atomic(&path, &bytes)?;
            tracing::info!(path = %path.display(), bytes = bytes.len(), "backup exported");
            writeln!(out, "Backup saved to {}", path.display())?;
        }
        Command::Backup {
            action: BackupCommand::Import { file, overwrite },
        } => {
            require_login(session)?;
            let contents = std::fs::read(&file)?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "backup.json".to_string());
            let message = session
                .client()
                .import_backup(&file_name, contents, overwrite)
                .await?;
            if message.is_empty() {
                writeln!(out, "Backup imported")?;
            } else {
                writeln!(out, "{}", message)?;
            }
        }
    }
    Ok(())
}

fn require_login(session: &Session) -> Result<()> {
    if session.is_logged_in() {
        Ok(())
    } else {
        Err(ConsoleError::NotLoggedIn)
    }
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(ConsoleError::Other("password is required".into()));
    }
    Ok(password)
}
