// Notification channel store.

use serde_json::{Map, Value};

use crate::api::ApiClient;
use crate::api::types::{
    AccountNotify, AccountNotifyConfig, ChannelType, CreateChannel, NotifyChannel, UpdateChannel,
};
use crate::error::{ConsoleError, Result};

use super::console::Console;
use super::list::SelectableList;

/// Placeholder the server returns for secret config values; sending it back keeps the stored value.
pub const MASKED_SECRET: &str = "******";

/// Config keys each channel type is configured with.
pub fn config_fields(channel_type: ChannelType) -> &'static [&'static str] {
    match channel_type {
        ChannelType::Pushplus => &["token", "topic"],
        ChannelType::WechatMp => &["app_id", "app_secret", "template_id", "openid"],
        ChannelType::WechatWork => &["corp_id", "corp_secret", "agent_id"],
        ChannelType::Dingtalk | ChannelType::Feishu => &["webhook", "secret"],
        ChannelType::Email => &["smtp_host", "smtp_port", "username", "password", "from_name"],
    }
}

/// Keys the server masks in listings.
pub fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.contains("secret") || key.contains("password") || key.contains("token")
}

/// Build a config object from form pairs. Numeric fields are sent as numbers; blanks are dropped.
pub fn config_from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Map<String, Value> {
    pairs
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, value)| {
            let value = value.trim();
            let json = match (key, value.parse::<i64>()) {
                ("smtp_port" | "agent_id", Ok(n)) => Value::from(n),
                _ => Value::from(value),
            };
            (key.to_string(), json)
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct NotifyStore {
    pub channels: SelectableList<NotifyChannel>,
}

impl NotifyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fetch(&mut self, client: &ApiClient, console: &mut Console) -> Result<()> {
        self.channels.set_loading();
        match client.list_channels().await {
            Ok(channels) => {
                self.channels.set_loaded(channels);
                Ok(())
            }
            Err(err) => {
                console.report(&err);
                self.channels.set_error(err.user_message());
                Err(err)
            }
        }
    }

    pub async fn create(
        &mut self,
        client: &ApiClient,
        console: &mut Console,
        params: &CreateChannel,
    ) -> Result<()> {
        console.track(client.create_channel(params).await)?;
        tracing::info!(name = %params.name, channel_type = params.channel_type.as_str(), "channel created");
        console.success(format!("Added channel {}", params.name));
        self.fetch(client, console).await
    }

    pub async fn update(
        &mut self,
        client: &ApiClient,
        console: &mut Console,
        id: u64,
        params: &UpdateChannel,
    ) -> Result<()> {
        console.track(client.update_channel(id, params).await)?;
        tracing::info!(channel_id = id, "channel updated");
        console.success("Channel updated");
        self.fetch(client, console).await
    }

    /// Flip a cached channel's enabled flag.
    pub async fn toggle(&mut self, client: &ApiClient, console: &mut Console, id: u64) -> Result<bool> {
        let current = self
            .channels
            .items()
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.is_enabled)
            .ok_or_else(|| ConsoleError::NotFound(format!("channel {}", id)));
        let enabled = !console.track(current)?;

        let params = UpdateChannel {
            is_enabled: Some(enabled),
            ..Default::default()
        };
        self.update(client, console, id, &params).await?;
        Ok(enabled)
    }

    pub async fn delete(&mut self, client: &ApiClient, console: &mut Console, id: u64) -> Result<()> {
        console.track(client.delete_channel(id).await)?;
        tracing::info!(channel_id = id, "channel deleted");
        console.success("Channel deleted");
        self.fetch(client, console).await
    }

    /// Send a test message and report the server's answer.
    pub async fn test(&self, client: &ApiClient, console: &mut Console, id: u64) -> Result<String> {
        let message = console.track(client.test_channel(id).await)?;
        let message = if message.is_empty() {
            "Test message sent".to_string()
        } else {
            message
        };
        console.success(message.clone());
        Ok(message)
    }

    /// Per-account routing: every enabled channel with the account's flag.
    pub async fn account_channels(
        client: &ApiClient,
        console: &mut Console,
        account_id: u64,
    ) -> Result<Vec<AccountNotify>> {
        console.track(client.account_channels(account_id).await)
    }

    pub async fn update_account_channels(
        client: &ApiClient,
        console: &mut Console,
        account_id: u64,
        channels: Vec<AccountNotifyConfig>,
    ) -> Result<()> {
        console.track(client.update_account_channels(account_id, channels).await)?;
        tracing::info!(account_id, "account notification routing updated");
        console.success("Notification routing updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::console::ConsoleLevel;
    use crate::test_support::MockServer;
    use serde_json::json;

    fn channels_json(enabled: bool) -> Value {
        json!([{
            "id": 1, "type": "dingtalk", "name": "ops",
            "config": {"webhook": "https://oapi.dingtalk.com/robot/send", "secret": MASKED_SECRET},
            "is_enabled": enabled
        }])
    }

    #[test]
    fn test_config_from_pairs() {
        let config = config_from_pairs([
            ("smtp_host", "smtp.example.com"),
            ("smtp_port", "465"),
            ("username", " "),
        ]);
        assert_eq!(
            Value::Object(config),
            json!({"smtp_host": "smtp.example.com", "smtp_port": 465})
        );
        assert!(is_secret_key("corp_secret"));
        assert!(!is_secret_key("webhook"));
        assert_eq!(config_fields(ChannelType::Feishu), &["webhook", "secret"]);
    }

    #[tokio::test]
    async fn test_fetch_caches_channels() {
        let server = MockServer::start().await;
        server.ok("GET", "/notify/channels", channels_json(true));
        let client = server.client();
        let mut console = Console::new();
        let mut store = NotifyStore::new();

        store.fetch(&client, &mut console).await.unwrap();
        let channel = &store.channels.items()[0];
        assert_eq!(channel.name, "ops");
        assert_eq!(channel.config["secret"], MASKED_SECRET);
    }

    #[tokio::test]
    async fn test_toggle_sends_flipped_flag() {
        let server = MockServer::start().await;
        server.ok("GET", "/notify/channels", channels_json(true));
        server.ok("PUT", "/notify/channels/1", json!(null));
        let client = server.client();
        let mut console = Console::new();
        let mut store = NotifyStore::new();
        store.fetch(&client, &mut console).await.unwrap();

        let enabled = store.toggle(&client, &mut console, 1).await.unwrap();
        assert!(!enabled);
        assert_eq!(
            server.last_request("PUT", "/notify/channels/1").unwrap().json(),
            json!({"is_enabled": false})
        );
        assert_eq!(server.count("GET", "/notify/channels"), 2);
    }

    #[tokio::test]
    async fn test_failed_test_is_error() {
        let server = MockServer::start().await;
        server.on(
            "POST",
            "/notify/channels/1/test",
            200,
            json!({"success": false, "message": "webhook returned 403", "data": null}),
        );
        let client = server.client();
        let mut console = Console::new();

        assert!(NotifyStore::new().test(&client, &mut console, 1).await.is_err());
        let last = console.last().unwrap();
        assert_eq!(last.level, ConsoleLevel::Error);
        assert_eq!(last.message, "webhook returned 403");
    }
}
