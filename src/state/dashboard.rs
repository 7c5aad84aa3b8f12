// Dashboard store.
// Caches the summary and API endpoint list; persists a snapshot for fast startup.

use std::path::PathBuf;

use crate::api::ApiClient;
use crate::api::types::{ApiEndpoint, DailyTrend, DashboardData};
use crate::error::Result;
use crate::storage::{self, SNAPSHOT_TTL};

use super::console::Console;
use super::list::SelectableList;

/// Trend series split into parallel columns for charting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub dates: Vec<String>,
    pub success: Vec<u64>,
    pub fail: Vec<u64>,
}

#[derive(Debug, Default)]
pub struct DashboardStore {
    pub data: Option<DashboardData>,
    pub endpoints: SelectableList<ApiEndpoint>,
    pub loading: bool,
    pub endpoints_loading: bool,
    /// Set while showing a snapshot that has not been refreshed yet.
    pub stale: bool,
    snapshot_path: Option<PathBuf>,
}

impl DashboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that writes its summary to `snapshot_path` after each fetch.
    pub fn with_snapshot(snapshot_path: PathBuf) -> Self {
        Self {
            snapshot_path: Some(snapshot_path),
            ..Self::default()
        }
    }

    pub fn account_count(&self) -> u64 {
        self.data.as_ref().map_or(0, |d| d.account_count)
    }

    pub fn unhealthy_count(&self) -> u64 {
        self.data.as_ref().map_or(0, |d| d.unhealthy_account_count)
    }

    pub fn today_sign_count(&self) -> u64 {
        self.data.as_ref().map_or(0, |d| d.today_sign_count)
    }

    pub fn today_sign_success(&self) -> u64 {
        self.data.as_ref().map_or(0, |d| d.today_sign_success)
    }

    pub fn success_rate(&self) -> f64 {
        self.data
            .as_ref()
            .and_then(|d| d.success_rate)
            .unwrap_or(0.0)
    }

    pub fn month_reward(&self) -> &str {
        self.data
            .as_ref()
            .and_then(|d| d.month_reward_display.as_deref())
            .unwrap_or("$0.00")
    }

    pub fn total_quota(&self) -> &str {
        self.data
            .as_ref()
            .and_then(|d| d.total_quota_display.as_deref())
            .unwrap_or("$0.00")
    }

    pub fn daily_trend(&self) -> &[DailyTrend] {
        self.data
            .as_ref()
            .map(|d| d.daily_trend.as_slice())
            .unwrap_or_default()
    }

    pub fn has_unhealthy_accounts(&self) -> bool {
        self.unhealthy_count() > 0
    }

    pub fn has_daily_trend(&self) -> bool {
        !self.daily_trend().is_empty()
    }

    pub fn chart_data(&self) -> ChartData {
        let trend = self.daily_trend();
        ChartData {
            dates: trend.iter().map(|d| d.date.clone()).collect(),
            success: trend.iter().map(|d| d.success).collect(),
            fail: trend.iter().map(|d| d.fail).collect(),
        }
    }

    /// Show the last saved summary, if one exists and is recent enough.
    pub fn load_snapshot(&mut self) -> bool {
        let Some(path) = &self.snapshot_path else {
            return false;
        };

        match storage::read_cached::<DashboardData>(path) {
            Ok(Some(cached)) if !cached.is_expired(SNAPSHOT_TTL) => {
                tracing::debug!(cached_at = %cached.cached_at, "dashboard snapshot loaded");
                self.data = Some(cached.data);
                self.stale = true;
                true
            }
            Ok(_) => false,
            Err(error) => {
                tracing::warn!(%error, "ignoring unreadable dashboard snapshot");
                false
            }
        }
    }

    pub async fn fetch_dashboard(&mut self, client: &ApiClient, console: &mut Console) -> Result<()> {
        self.loading = true;
        let result = console.track(client.get_dashboard().await);
        self.loading = false;

        let data = result?;
        let written = self
            .snapshot_path
            .as_ref()
            .map(|path| storage::write_cached(path, &data));
        if let Some(Err(error)) = written {
            tracing::warn!(%error, "failed to write dashboard snapshot");
        }
        self.data = Some(data);
        self.stale = false;
        Ok(())
    }

    pub async fn fetch_endpoints(&mut self, client: &ApiClient, console: &mut Console) -> Result<()> {
        self.endpoints_loading = true;
        self.endpoints.set_loading();
        let result = client.list_api_endpoints().await;
        self.endpoints_loading = false;

        match result {
            Ok(endpoints) => {
                self.endpoints.set_loaded(endpoints);
                Ok(())
            }
            Err(err) => {
                console.report(&err);
                self.endpoints.set_error(err.user_message());
                Err(err)
            }
        }
    }

    /// Sync endpoints from upstream, then re-list them. Returns the server message.
    pub async fn sync_endpoints(&mut self, client: &ApiClient, console: &mut Console) -> Result<String> {
        self.endpoints_loading = true;
        let result = console.track(client.sync_api_endpoints().await);
        self.endpoints_loading = false;

        let message = result?;
        let message = if message.is_empty() {
            "Sync complete".to_string()
        } else {
            message
        };
        console.success(message.clone());
        self.fetch_endpoints(client, console).await?;
        Ok(message)
    }

    pub fn reset(&mut self) {
        let snapshot_path = self.snapshot_path.take();
        *self = Self {
            snapshot_path,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::console::ConsoleLevel;
    use crate::test_support::MockServer;
    use serde_json::json;
    use tempfile::TempDir;

    fn dashboard_json() -> serde_json::Value {
        json!({
            "account_count": 4,
            "active_account_count": 3,
            "unhealthy_account_count": 1,
            "today_sign_count": 3,
            "today_sign_success": 2,
            "success_rate": 66.7,
            "month_reward_display": "$12.50",
            "daily_trend": [
                {"date": "2024-03-04", "success": 3, "fail": 0},
                {"date": "2024-03-05", "success": 2, "fail": 1}
            ],
            "recent_signs": []
        })
    }

    #[test]
    fn test_defaults_without_data() {
        let store = DashboardStore::new();
        assert_eq!(store.month_reward(), "$0.00");
        assert_eq!(store.total_quota(), "$0.00");
        assert_eq!(store.success_rate(), 0.0);
        assert!(!store.has_daily_trend());
        assert_eq!(store.chart_data(), ChartData::default());
    }

    #[tokio::test]
    async fn test_fetch_dashboard_caches_and_snapshots() {
        let server = MockServer::start().await;
        server.ok("GET", "/dashboard", dashboard_json());
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("snapshots").join("dashboard.json");
        let client = server.client();
        let mut console = Console::new();
        let mut store = DashboardStore::with_snapshot(path.clone());

        store.fetch_dashboard(&client, &mut console).await.unwrap();
        assert_eq!(store.account_count(), 4);
        assert!(store.has_unhealthy_accounts());
        assert_eq!(store.month_reward(), "$12.50");
        assert_eq!(store.total_quota(), "$0.00");
        assert_eq!(
            store.chart_data(),
            ChartData {
                dates: vec!["2024-03-04".into(), "2024-03-05".into()],
                success: vec![3, 2],
                fail: vec![0, 1],
            }
        );
        let snapshot = storage::read_cached::<DashboardData>(&path).unwrap().unwrap();
        assert_eq!(snapshot.data.account_count, 4);

        let mut restored = DashboardStore::with_snapshot(path);
        assert!(restored.load_snapshot());
        assert!(restored.stale);
        assert_eq!(restored.today_sign_success(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_previous_data() {
        let server = MockServer::start().await;
        server.on("GET", "/dashboard", 503, json!({"detail": "maintenance"}));
        let client = server.client();
        let mut console = Console::new();
        let mut store = DashboardStore::new();
        store.data = Some(DashboardData {
            account_count: 9,
            ..Default::default()
        });

        assert!(store.fetch_dashboard(&client, &mut console).await.is_err());
        assert_eq!(store.account_count(), 9);
        assert_eq!(console.last().unwrap().level, ConsoleLevel::Error);
    }

    #[tokio::test]
    async fn test_sync_endpoints_default_message() {
        let server = MockServer::start().await;
        server.on(
            "POST",
            "/api-endpoints/sync",
            200,
            json!({"success": true, "message": "", "data": null}),
        );
        server.ok(
            "GET",
            "/api-endpoints",
            json!([{"id": 1, "endpoint_id": 3, "route": "main", "url": "https://api.example.com"}]),
        );
        let client = server.client();
        let mut console = Console::new();
        let mut store = DashboardStore::new();

        let message = store.sync_endpoints(&client, &mut console).await.unwrap();
        assert_eq!(message, "Sync complete");
        assert_eq!(store.endpoints.len(), 1);
        assert!(!store.endpoints_loading);
    }
}
