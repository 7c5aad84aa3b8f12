// Settings store.
// System settings, scheduler status and backup export/import.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveTime};

use crate::api::ApiClient;
use crate::api::types::{BackupInfo, SchedulerStatus, SettingsUpdate, SystemSettings};
use crate::error::{ConsoleError, Result};
use crate::storage::{paths, store};

use super::console::Console;
use super::list::LoadingState;

/// One editable system setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    AutoSignEnabled,
    AutoSignTime,
    HealthCheckEnabled,
    HealthCheckInterval,
    SignRetryEnabled,
    SignMaxRetries,
    SignRetryInterval,
}

impl SettingField {
    pub const ALL: [SettingField; 7] = [
        SettingField::AutoSignEnabled,
        SettingField::AutoSignTime,
        SettingField::HealthCheckEnabled,
        SettingField::HealthCheckInterval,
        SettingField::SignRetryEnabled,
        SettingField::SignMaxRetries,
        SettingField::SignRetryInterval,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SettingField::AutoSignEnabled => "Auto sign",
            SettingField::AutoSignTime => "Auto sign time",
            SettingField::HealthCheckEnabled => "Health checks",
            SettingField::HealthCheckInterval => "Health check interval (hours)",
            SettingField::SignRetryEnabled => "Retry failed signs",
            SettingField::SignMaxRetries => "Max retries",
            SettingField::SignRetryInterval => "Retry interval (minutes)",
        }
    }

    pub fn is_toggle(&self) -> bool {
        matches!(
            self,
            SettingField::AutoSignEnabled
                | SettingField::HealthCheckEnabled
                | SettingField::SignRetryEnabled
        )
    }

    pub fn value(&self, settings: &SystemSettings) -> String {
        let on_off = |b: bool| if b { "on" } else { "off" }.to_string();
        match self {
            SettingField::AutoSignEnabled => on_off(settings.auto_sign_enabled),
            SettingField::AutoSignTime => settings.auto_sign_time.clone(),
            SettingField::HealthCheckEnabled => on_off(settings.health_check_enabled),
            SettingField::HealthCheckInterval => settings.health_check_interval.to_string(),
            SettingField::SignRetryEnabled => on_off(settings.sign_retry_enabled),
            SettingField::SignMaxRetries => settings.sign_max_retries.to_string(),
            SettingField::SignRetryInterval => settings.sign_retry_interval.to_string(),
        }
    }

    /// Update that flips a toggle field.
    pub fn toggled(&self, settings: &SystemSettings) -> Option<SettingsUpdate> {
        let update = match self {
            SettingField::AutoSignEnabled => SettingsUpdate {
                auto_sign_enabled: Some(!settings.auto_sign_enabled),
                ..Default::default()
            },
            SettingField::HealthCheckEnabled => SettingsUpdate {
                health_check_enabled: Some(!settings.health_check_enabled),
                ..Default::default()
            },
            SettingField::SignRetryEnabled => SettingsUpdate {
                sign_retry_enabled: Some(!settings.sign_retry_enabled),
                ..Default::default()
            },
            _ => return None,
        };
        Some(update)
    }

    /// Parse form input for a value field.
    pub fn parse_input(&self, input: &str) -> Result<SettingsUpdate> {
        let input = input.trim();
        let number = |min: u32, max: u32| -> Result<u32> {
            input
                .parse::<u32>()
                .ok()
                .filter(|n| (min..=max).contains(n))
                .ok_or_else(|| {
                    ConsoleError::Other(format!(
                        "{} must be a number from {} to {}",
                        self.label(),
                        min,
                        max
                    ))
                })
        };

        let update = match self {
            SettingField::AutoSignTime => {
                let time = NaiveTime::parse_from_str(input, "%H:%M").map_err(|_| {
                    ConsoleError::Other("Auto sign time must be HH:MM".to_string())
                })?;
                SettingsUpdate {
                    auto_sign_time: Some(time.format("%H:%M").to_string()),
                    ..Default::default()
                }
            }
            SettingField::HealthCheckInterval => SettingsUpdate {
                health_check_interval: Some(number(1, 24)?),
                ..Default::default()
            },
            SettingField::SignMaxRetries => SettingsUpdate {
                sign_max_retries: Some(number(0, 10)?),
                ..Default::default()
            },
            SettingField::SignRetryInterval => SettingsUpdate {
                sign_retry_interval: Some(number(1, 1440)?),
                ..Default::default()
            },
            toggle => {
                return Err(ConsoleError::Other(format!(
                    "{} is toggled, not edited",
                    toggle.label()
                )));
            }
        };
        Ok(update)
    }
}

#[derive(Debug, Default)]
pub struct SettingsStore {
    pub settings: LoadingState<SystemSettings>,
    pub scheduler: Option<SchedulerStatus>,
    pub backup_info: Option<BackupInfo>,
    pub selected: usize,
    pub saving: bool,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_field(&self) -> SettingField {
        SettingField::ALL[self.selected.min(SettingField::ALL.len() - 1)]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1).min(SettingField::ALL.len() - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Load settings, scheduler status and backup counts.
    pub async fn fetch(&mut self, client: &ApiClient, console: &mut Console) -> Result<()> {
        self.settings.begin_refresh();
        match client.get_settings().await {
            Ok(settings) => self.settings = LoadingState::Loaded(settings),
            Err(err) => {
                console.report(&err);
                self.settings.fail(err.user_message());
                return Err(err);
            }
        }
        self.fetch_scheduler(client).await;
        self.fetch_backup_info(client).await;
        Ok(())
    }

    async fn fetch_scheduler(&mut self, client: &ApiClient) {
        match client.scheduler_status().await {
            Ok(status) => self.scheduler = Some(status),
            Err(error) => tracing::warn!(%error, "failed to load scheduler status"),
        }
    }

    async fn fetch_backup_info(&mut self, client: &ApiClient) {
        match client.backup_info().await {
            Ok(info) => self.backup_info = Some(info),
            Err(error) => tracing::warn!(%error, "failed to load backup info"),
        }
    }

    /// Save a partial update, then reload settings and scheduler status.
    pub async fn update(
        &mut self,
        client: &ApiClient,
        console: &mut Console,
        update: &SettingsUpdate,
    ) -> Result<()> {
        self.saving = true;
        let result = console.track(client.update_settings(update).await);
        self.saving = false;
        result?;

        tracing::info!(?update, "settings updated");
        console.success("Settings saved");
        self.fetch(client, console).await
    }

    /// Flip the selected toggle setting. Value fields are left alone.
    pub async fn toggle_selected(&mut self, client: &ApiClient, console: &mut Console) -> Result<()> {
        let field = self.selected_field();
        let update = self.settings.data().and_then(|s| field.toggled(s));
        match update {
            Some(update) => self.update(client, console, &update).await,
            None => Ok(()),
        }
    }

    /// Download a backup into the exports directory and return its path.
    pub async fn export_backup(
        &mut self,
        client: &ApiClient,
        console: &mut Console,
        data_dir: &Path,
        include_logs: bool,
    ) -> Result<PathBuf> {
        let path = paths::backup_export_path(data_dir, Local::now());
        self.export_backup_to(client, console, &path, include_logs)
            .await?;
        Ok(path)
    }

    pub async fn export_backup_to(
        &mut self,
        client: &ApiClient,
        console: &mut Console,
        path: &Path,
        include_logs: bool,
    ) -> Result<()> {
        let bytes = console.track(client.export_backup(include_logs).await)?;
        console.track(store::write_atomic(path, &bytes))?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), include_logs, "backup exported");
        console.success(format!("Backup saved to {}", path.display()));
        Ok(())
    }

    /// Upload a backup file; returns the server's summary.
    pub async fn import_backup(
        &mut self,
        client: &ApiClient,
        console: &mut Console,
        path: &Path,
        overwrite: bool,
    ) -> Result<String> {
        let contents = console.track(std::fs::read(path).map_err(ConsoleError::from))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "backup.json".to_string());

        let message = console.track(client.import_backup(&file_name, contents, overwrite).await)?;
        let message = if message.is_empty() {
            "Backup imported".to_string()
        } else {
            message
        };
        tracing::info!(path = %path.display(), overwrite, "backup imported");
        console.success(message.clone());
        self.fetch_backup_info(client).await;
        Ok(message)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockServer;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_parse_input_validates() {
        let update = SettingField::AutoSignTime.parse_input("7:05").unwrap();
        assert_eq!(update.auto_sign_time.as_deref(), Some("07:05"));
        assert!(SettingField::AutoSignTime.parse_input("25:00").is_err());
        assert!(SettingField::HealthCheckInterval.parse_input("0").is_err());
        assert_eq!(
            SettingField::SignMaxRetries.parse_input(" 5 ").unwrap().sign_max_retries,
            Some(5)
        );
        assert!(SettingField::AutoSignEnabled.parse_input("on").is_err());
    }

    #[test]
    fn test_toggled_flips_flag() {
        let settings = SystemSettings::default();
        let update = SettingField::HealthCheckEnabled.toggled(&settings).unwrap();
        assert_eq!(update.health_check_enabled, Some(false));
        assert!(SettingField::SignMaxRetries.toggled(&settings).is_none());
    }

    #[tokio::test]
    async fn test_update_refetches() {
        let server = MockServer::start().await;
        server.ok("GET", "/settings", json!({"auto_sign_enabled": true}));
        server.ok("GET", "/settings/scheduler", json!({"enabled": true, "next_run": "2024-03-06T08:00:00"}));
        server.ok("GET", "/backup/info", json!({"account_count": 2}));
        server.ok("PUT", "/settings", json!(null));
        let client = server.client();
        let mut console = Console::new();
        let mut store = SettingsStore::new();
        store.fetch(&client, &mut console).await.unwrap();
        assert!(store.settings.data().unwrap().auto_sign_enabled);

        let update = SettingsUpdate {
            auto_sign_enabled: Some(false),
            ..Default::default()
        };
        store.update(&client, &mut console, &update).await.unwrap();
        assert_eq!(
            server.last_request("PUT", "/settings").unwrap().json(),
            json!({"auto_sign_enabled": false})
        );
        assert_eq!(server.count("GET", "/settings"), 2);
        assert_eq!(server.count("GET", "/settings/scheduler"), 2);
        assert_eq!(console.last().unwrap().message, "Settings saved");
    }

    #[tokio::test]
    async fn test_export_writes_file() {
        let server = MockServer::start().await;
        server.on("GET", "/backup/export", 200, json!({"version": "1.0", "accounts": []}));
        let temp_dir = TempDir::new().unwrap();
        let client = server.client();
        let mut console = Console::new();
        let mut store = SettingsStore::new();

        let path = store
            .export_backup(&client, &mut console, temp_dir.path(), true)
            .await
            .unwrap();
        assert!(path.starts_with(temp_dir.path().join("exports")));
        let saved: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(saved["version"], "1.0");
        assert_eq!(
            server.last_request("GET", "/backup/export").unwrap().query.as_deref(),
            Some("include_logs=true")
        );
    }

    #[tokio::test]
    async fn test_import_reads_file() {
        let server = MockServer::start().await;
        server.on(
            "POST",
            "/backup/import",
            200,
            json!({"success": true, "message": "Imported 2 accounts", "data": null}),
        );
        server.ok("GET", "/backup/info", json!({"account_count": 2}));
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("backup.json");
        std::fs::write(&path, br#"{"accounts": []}"#).unwrap();
        let client = server.client();
        let mut console = Console::new();
        let mut store = SettingsStore::new();

        let message = store
            .import_backup(&client, &mut console, &path, false)
            .await
            .unwrap();
        assert_eq!(message, "Imported 2 accounts");
        assert_eq!(store.backup_info.as_ref().unwrap().account_count, 2);

        let missing = temp_dir.path().join("missing.json");
        assert!(store.import_backup(&client, &mut console, &missing, false).await.is_err());
    }
}
