// Storage path utilities.
// Constructs filesystem paths under the console's data directory.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use directories::ProjectDirs;

/// Platform data directory (~/.local/share/signdesk on Linux).
pub fn default_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "signdesk").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Path to the key-value preferences file.
pub fn preferences_path(data_dir: &Path) -> PathBuf {
    data_dir.join("preferences.json")
}

/// Directory for rolling log files.
pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

/// Directory for cached server snapshots.
pub fn snapshots_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("snapshots")
}

/// Path to the last dashboard summary.
pub fn dashboard_snapshot_path(data_dir: &Path) -> PathBuf {
    snapshots_dir(data_dir).join("dashboard.json")
}

/// Directory where downloaded backups are written.
pub fn exports_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("exports")
}

/// Timestamped path for a new backup export.
pub fn backup_export_path(data_dir: &Path, at: DateTime<Local>) -> PathBuf {
    exports_dir(data_dir).join(format!("backup-{}.json", at.format("%Y%m%d-%H%M%S")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_storage_paths() {
        let root = Path::new("/data/signdesk");

        assert!(preferences_path(root).ends_with("signdesk/preferences.json"));
        assert!(log_dir(root).ends_with("signdesk/logs"));
        assert!(dashboard_snapshot_path(root).ends_with("snapshots/dashboard.json"));

        let at = Local.with_ymd_and_hms(2024, 3, 5, 8, 9, 10).unwrap();
        let export = backup_export_path(root, at);
        assert!(export.ends_with("exports/backup-20240305-080910.json"));
    }
}
