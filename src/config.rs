// Command-line and environment configuration.
// Resolves server address, request timeout and data directory.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::cli::Command;
use crate::storage::paths;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";
pub const API_PREFIX: &str = "/api/v1";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Base URL of the sign-in automation server
    #[arg(short, long, env = "SIGNDESK_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Request timeout in seconds
    #[arg(short, long, env = "SIGNDESK_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    /// Directory for credentials, preferences and logs
    #[arg(short, long, env = "SIGNDESK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log filter (e.g. "info", "signdesk=debug")
    #[arg(long, env = "SIGNDESK_LOG", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// API root including the version prefix, without trailing slash.
    pub api_base: String,
    pub timeout: Duration,
    pub data_dir: PathBuf,
}

impl ConsoleConfig {
    pub fn from_args(args: &Args) -> crate::error::Result<Self> {
        let data_dir = match &args.data_dir {
            Some(dir) => dir.clone(),
            None => paths::default_data_dir().ok_or_else(|| {
                crate::error::ConsoleError::Other(
                    "could not determine a data directory; pass --data-dir".into(),
                )
            })?,
        };

        Ok(Self {
            api_base: api_base(&args.server),
            timeout: Duration::from_secs(args.timeout.max(1)),
            data_dir,
        })
    }

    /// Configuration pointing at an arbitrary server, used by tests.
    #[cfg(test)]
    pub fn for_server(server: &str, data_dir: PathBuf) -> Self {
        Self {
            api_base: api_base(server),
            timeout: Duration::from_secs(5),
            data_dir,
        }
    }
}

/// Join the server address and the API version prefix.
fn api_base(server: &str) -> String {
    let trimmed = server.trim().trim_end_matches('/');
    if trimmed.ends_with(API_PREFIX) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, API_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base_joins_prefix() {
        assert_eq!(api_base("http://host:8000"), "http://host:8000/api/v1");
        assert_eq!(api_base("http://host:8000/"), "http://host:8000/api/v1");
        assert_eq!(api_base("http://host/api/v1/"), "http://host/api/v1");
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["signdesk", "--data-dir", "/tmp/signdesk"]);
        let config = ConsoleConfig::from_args(&args).unwrap();
        assert_eq!(config.api_base, "http://127.0.0.1:8000/api/v1");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/signdesk"));
        assert!(args.command.is_none());
    }
}
