// System settings and scheduler endpoints.

use serde::de::IgnoredAny;

use crate::error::Result;

use super::client::ApiClient;
use super::types::{SchedulerStatus, SettingsUpdate, SystemSettings};

impl ApiClient {
    pub async fn get_settings(&self) -> Result<SystemSettings> {
        Ok(self.get("/settings").await?.data_or_default())
    }

    /// Apply a partial update. Absent fields keep their server-side values.
    pub async fn update_settings(&self, update: &SettingsUpdate) -> Result<String> {
        let envelope = self.put_json::<IgnoredAny, _>("/settings", update).await?;
        Ok(envelope.message)
    }

    pub async fn scheduler_status(&self) -> Result<SchedulerStatus> {
        Ok(self.get("/settings/scheduler").await?.data_or_default())
    }
}
