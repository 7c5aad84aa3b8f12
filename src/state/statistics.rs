// Statistics store: overview plus daily, monthly and per-account breakdowns.

use crate::api::ApiClient;
use crate::api::dashboard::{DAILY_RANGE, MONTHLY_RANGE};
use crate::api::types::{AccountStatistics, DailyStatistics, MonthlyStatistics, StatisticsOverview};
use crate::error::Result;

use super::console::Console;
use super::list::{LoadingState, SelectableList};

const DEFAULT_DAYS: u32 = 30;
const DEFAULT_MONTHS: u32 = 12;
const DAY_STEPS: [u32; 4] = [7, 30, 60, 90];

#[derive(Debug)]
pub struct StatisticsStore {
    pub overview: LoadingState<StatisticsOverview>,
    pub daily: LoadingState<Vec<DailyStatistics>>,
    pub monthly: LoadingState<Vec<MonthlyStatistics>>,
    pub accounts: SelectableList<AccountStatistics>,
    days: u32,
    months: u32,
}

impl Default for StatisticsStore {
    fn default() -> Self {
        Self {
            overview: LoadingState::default(),
            daily: LoadingState::default(),
            monthly: LoadingState::default(),
            accounts: SelectableList::new(),
            days: DEFAULT_DAYS,
            months: DEFAULT_MONTHS,
        }
    }
}

impl StatisticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn months(&self) -> u32 {
        self.months
    }

    pub fn set_days(&mut self, days: u32) {
        self.days = days.clamp(DAILY_RANGE.0, DAILY_RANGE.1);
    }

    pub fn set_months(&mut self, months: u32) {
        self.months = months.clamp(MONTHLY_RANGE.0, MONTHLY_RANGE.1);
    }

    /// Step through the preset daily windows, wrapping around.
    pub fn cycle_days(&mut self) {
        let next = DAY_STEPS
            .iter()
            .copied()
            .find(|&d| d > self.days)
            .unwrap_or(DAY_STEPS[0]);
        self.set_days(next);
    }

    pub async fn fetch_overview(&mut self, client: &ApiClient, console: &mut Console) -> Result<()> {
        self.overview.begin_refresh();
        match client.statistics_overview().await {
            Ok(overview) => {
                self.overview = LoadingState::Loaded(overview);
                Ok(())
            }
            Err(err) => {
                console.report(&err);
                self.overview.fail(err.user_message());
                Err(err)
            }
        }
    }

    pub async fn fetch_daily(&mut self, client: &ApiClient, console: &mut Console) -> Result<()> {
        self.daily.begin_refresh();
        match client.daily_statistics(self.days).await {
            Ok(daily) => {
                self.daily = LoadingState::Loaded(daily);
                Ok(())
            }
            Err(err) => {
                console.report(&err);
                self.daily.fail(err.user_message());
                Err(err)
            }
        }
    }

    pub async fn fetch_monthly(&mut self, client: &ApiClient, console: &mut Console) -> Result<()> {
        self.monthly.begin_refresh();
        match client.monthly_statistics(self.months).await {
            Ok(monthly) => {
                self.monthly = LoadingState::Loaded(monthly);
                Ok(())
            }
            Err(err) => {
                console.report(&err);
                self.monthly.fail(err.user_message());
                Err(err)
            }
        }
    }

    pub async fn fetch_accounts(&mut self, client: &ApiClient, console: &mut Console) -> Result<()> {
        if !self.accounts.data.is_loaded() {
            self.accounts.set_loading();
        }
        match client.account_statistics().await {
            Ok(stats) => {
                self.accounts.set_loaded(stats);
                Ok(())
            }
            Err(err) => {
                console.report(&err);
                self.accounts.set_error(err.user_message());
                Err(err)
            }
        }
    }

    /// Load every section. Sections fail independently; the first error is returned.
    pub async fn fetch_all(&mut self, client: &ApiClient, console: &mut Console) -> Result<()> {
        let overview = self.fetch_overview(client, console).await;
        let daily = self.fetch_daily(client, console).await;
        let monthly = self.fetch_monthly(client, console).await;
        let accounts = self.fetch_accounts(client, console).await;
        overview.and(daily).and(monthly).and(accounts)
    }

    /// Highest daily total, for scaling bar charts.
    pub fn daily_peak(&self) -> u64 {
        self.daily
            .data()
            .and_then(|days| days.iter().map(|d| d.success + d.fail).max())
            .unwrap_or(0)
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

    #[test]
    fn test_windows_are_clamped() {
        let mut store = StatisticsStore::new();
        store.set_days(365);
        assert_eq!(store.days(), 90);
        store.set_months(1);
        assert_eq!(store.months(), 3);

        store.set_days(30);
        store.cycle_days();
        assert_eq!(store.days(), 60);
        store.cycle_days();
        store.cycle_days();
        assert_eq!(store.days(), 7);
    }

    #[tokio::test]
    async fn test_fetch_all_loads_each_section() {
        let server = MockServer::start().await;
        server.ok(
            "GET",
            "/statistics/overview",
            json!({"total_accounts": 3, "month_success_rate": 92.5, "success_rate": 90.0}),
        );
        server.ok(
            "GET",
            "/statistics/daily",
            json!([
                {"date": "2024-03-04", "success": 3, "fail": 0},
                {"date": "2024-03-05", "success": 2, "fail": 2}
            ]),
        );
        server.ok(
            "GET",
            "/statistics/monthly",
            json!([{"month": "2024-03", "success": 40, "fail": 2, "success_rate": 95.2}]),
        );
        server.ok(
            "GET",
            "/statistics/accounts",
            json!([{"account_id": 1, "username": "alice", "total_signs": 10, "success_count": 9,
                    "fail_count": 1, "success_rate": 90.0, "streak_days": 4, "is_active": true,
                    "health_status": "healthy"}]),
        );
        let client = server.client();
        let mut console = Console::new();
        let mut store = StatisticsStore::new();

        store.fetch_all(&client, &mut console).await.unwrap();
        assert_eq!(store.overview.data().unwrap().total_accounts, 3);
        assert_eq!(store.daily_peak(), 4);
        assert_eq!(store.monthly.data().unwrap().len(), 1);
        assert_eq!(store.accounts.items()[0].streak_days, 4);
        assert_eq!(
            server.last_request("GET", "/statistics/daily").unwrap().query.as_deref(),
            Some("days=30")
        );
        assert!(console.is_empty());
    }

    #[tokio::test]
    async fn test_section_failure_does_not_block_others() {
        let server = MockServer::start().await;
        server.ok("GET", "/statistics/overview", json!({"total_accounts": 1}));
        server.ok("GET", "/statistics/daily", json!([]));
        server.ok("GET", "/statistics/accounts", json!([]));
        let client = server.client();
        let mut console = Console::new();
        let mut store = StatisticsStore::new();

        assert!(store.fetch_all(&client, &mut console).await.is_err());
        assert!(store.overview.is_loaded());
        assert!(store.accounts.data.is_loaded());
        assert!(matches!(store.monthly, LoadingState::Error(_)));
        assert_eq!(console.len(), 1);
    }
}
