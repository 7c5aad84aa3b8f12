// Notification channel endpoints.

use serde::de::IgnoredAny;

use crate::error::Result;

use super::client::ApiClient;
use super::types::{
    AccountNotify, AccountNotifyConfig, AccountNotifyUpdate, CreateChannel, NotifyChannel,
    UpdateChannel,
};

impl ApiClient {
    /// List channels. Secret config values come back masked.
    pub async fn list_channels(&self) -> Result<Vec<NotifyChannel>> {
        Ok(self.get("/notify/channels").await?.data_or_default())
    }

    pub async fn create_channel(&self, params: &CreateChannel) -> Result<String> {
        let envelope = self
            .post_json::<IgnoredAny, _>("/notify/channels", params)
            .await?;
        Ok(envelope.message)
    }

    pub async fn update_channel(&self, id: u64, params: &UpdateChannel) -> Result<String> {
        let envelope = self
            .put_json::<IgnoredAny, _>(&format!("/notify/channels/{}", id), params)
            .await?;
        Ok(envelope.message)
    }

    pub async fn delete_channel(&self, id: u64) -> Result<String> {
        let envelope = self
            .delete::<IgnoredAny>(&format!("/notify/channels/{}", id))
            .await?;
        Ok(envelope.message)
    }

    /// Send a test message. A delivery failure comes back as `Rejected`.
    pub async fn test_channel(&self, id: u64) -> Result<String> {
        let envelope = self
            .post::<IgnoredAny>(&format!("/notify/channels/{}/test", id))
            .await?;
        Ok(envelope.message)
    }

    pub async fn account_channels(&self, account_id: u64) -> Result<Vec<AccountNotify>> {
        Ok(self
            .get(&format!("/notify/accounts/{}", account_id))
            .await?
            .data_or_default())
    }

    /// Replace the account's routing with `channels`.
    pub async fn update_account_channels(
        &self,
        account_id: u64,
        channels: Vec<AccountNotifyConfig>,
    ) -> Result<String> {
        let body = AccountNotifyUpdate { channels };
        let envelope = self
            .put_json::<IgnoredAny, _>(&format!("/notify/accounts/{}", account_id), &body)
            .await?;
        Ok(envelope.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConsoleError;
    use crate::test_support::MockServer;
    use serde_json::{Map, json};

    #[tokio::test]
    async fn test_failed_test_message_is_rejected() {
        let server = MockServer::start().await;
        server.on(
            "POST",
            "/notify/channels/1/test",
            200,
            json!({"success": false, "message": "Test message failed", "data": null}),
        );

        let err = server.client().test_channel(1).await.unwrap_err();
        assert!(matches!(err, ConsoleError::Rejected(ref m) if m == "Test message failed"));
    }

    #[tokio::test]
    async fn test_account_routing_body() {
        let server = MockServer::start().await;
        server.ok("PUT", "/notify/accounts/8", json!(null));

        let channels = vec![AccountNotifyConfig {
            channel_id: 2,
            is_enabled: true,
            notify_config: Map::new(),
        }];
        server
            .client()
            .update_account_channels(8, channels)
            .await
            .unwrap();

        assert_eq!(
            server.last_request("PUT", "/notify/accounts/8").unwrap().json(),
            json!({"channels": [{"channel_id": 2, "is_enabled": true, "notify_config": {}}]})
        );
    }
}
