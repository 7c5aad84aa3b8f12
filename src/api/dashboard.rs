// Dashboard, statistics and API endpoint sync.

use crate::error::Result;

use super::client::ApiClient;
use super::types::{
    AccountStatistics, ApiEndpoint, DailyStatistics, DashboardData, MonthlyStatistics,
    StatisticsOverview,
};

pub const DAILY_RANGE: (u32, u32) = (7, 90);
pub const MONTHLY_RANGE: (u32, u32) = (3, 24);

impl ApiClient {
    pub async fn get_dashboard(&self) -> Result<DashboardData> {
        self.get("/dashboard").await?.into_data("dashboard")
    }

    pub async fn statistics_overview(&self) -> Result<StatisticsOverview> {
        Ok(self.get("/statistics/overview").await?.data_or_default())
    }

    /// Per-day counts for the last `days` days (clamped to 7..=90).
    pub async fn daily_statistics(&self, days: u32) -> Result<Vec<DailyStatistics>> {
        let days = days.clamp(DAILY_RANGE.0, DAILY_RANGE.1);
        Ok(self
            .get_with_params("/statistics/daily", &[("days", days)])
            .await?
            .data_or_default())
    }

    /// Per-month counts for the last `months` months (clamped to 3..=24).
    pub async fn monthly_statistics(&self, months: u32) -> Result<Vec<MonthlyStatistics>> {
        let months = months.clamp(MONTHLY_RANGE.0, MONTHLY_RANGE.1);
        Ok(self
            .get_with_params("/statistics/monthly", &[("months", months)])
            .await?
            .data_or_default())
    }

    pub async fn account_statistics(&self) -> Result<Vec<AccountStatistics>> {
        Ok(self.get("/statistics/accounts").await?.data_or_default())
    }

    pub async fn list_api_endpoints(&self) -> Result<Vec<ApiEndpoint>> {
        Ok(self.get("/api-endpoints").await?.data_or_default())
    }

    pub async fn sync_api_endpoints(&self) -> Result<String> {
        let envelope = self
            .post::<serde::de::IgnoredAny>("/api-endpoints/sync")
            .await?;
        Ok(envelope.message)
    }
}
