// Account detail store.
// Live info, sign history, tokens and notification routing for one account.

use crate::api::ApiClient;
use crate::api::types::{AccountInfo, AccountNotify, AccountNotifyConfig, ApiToken, SignLog};
use crate::error::{ConsoleError, Result};

use super::console::Console;
use super::list::{LoadingState, Page, SelectableList, step_selection};
use super::notify::NotifyStore;

pub const HISTORY_PAGE_SIZE: u32 = 10;

#[derive(Debug, Default)]
pub struct AccountDetailStore {
    pub account_id: Option<u64>,
    pub info: LoadingState<AccountInfo>,
    pub history: LoadingState<Page<SignLog>>,
    pub tokens: SelectableList<ApiToken>,
    pub channels: LoadingState<Vec<AccountNotify>>,
    pub channel_state: ratatui::widgets::ListState,
}

impl AccountDetailStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to another account, dropping everything cached for the previous one.
    pub fn open(&mut self, account_id: u64) {
        if self.account_id != Some(account_id) {
            *self = Self {
                account_id: Some(account_id),
                ..Self::default()
            };
        }
    }

    fn current(&self) -> Result<u64> {
        self.account_id
            .ok_or_else(|| ConsoleError::Other("no account selected".into()))
    }

    pub async fn fetch_info(&mut self, client: &ApiClient, console: &mut Console) -> Result<()> {
        let id = self.current()?;
        self.info.begin_refresh();
        match client.get_account_info(id).await {
            Ok(info) => {
                self.info = LoadingState::Loaded(info);
                Ok(())
            }
            Err(err) => {
                console.report(&err);
                self.info = LoadingState::Error(err.user_message());
                Err(err)
            }
        }
    }

    pub async fn fetch_history(
        &mut self,
        client: &ApiClient,
        console: &mut Console,
        page: u32,
    ) -> Result<()> {
        let id = self.current()?;
        self.history.begin_refresh();
        match client.account_sign_logs(id, page, HISTORY_PAGE_SIZE).await {
            Ok(result) => {
                self.history = LoadingState::Loaded(Page::new(
                    result.items,
                    result.total,
                    result.page,
                    result.size,
                ));
                Ok(())
            }
            Err(err) => {
                console.report(&err);
                self.history.fail(err.user_message());
                Err(err)
            }
        }
    }

    pub async fn history_next(&mut self, client: &ApiClient, console: &mut Console) -> Result<()> {
        match self.history.data().and_then(Page::next_page) {
            Some(page) => self.fetch_history(client, console, page).await,
            None => Ok(()),
        }
    }

    pub async fn history_prev(&mut self, client: &ApiClient, console: &mut Console) -> Result<()> {
        match self.history.data().and_then(Page::prev_page) {
            Some(page) => self.fetch_history(client, console, page).await,
            None => Ok(()),
        }
    }

    pub async fn fetch_tokens(&mut self, client: &ApiClient, console: &mut Console) -> Result<()> {
        let id = self.current()?;
        self.tokens.set_loading();
        match client.list_tokens(id).await {
            Ok(tokens) => {
                self.tokens.set_loaded(tokens);
                Ok(())
            }
            Err(err) => {
                console.report(&err);
                self.tokens.set_error(err.user_message());
                Err(err)
            }
        }
    }

    pub async fn fetch_channels(&mut self, client: &ApiClient, console: &mut Console) -> Result<()> {
        let id = self.current()?;
        match NotifyStore::account_channels(client, console, id).await {
            Ok(channels) => {
                let len = channels.len();
                self.channels = LoadingState::Loaded(channels);
                super::list::clamp_selection(&mut self.channel_state, len);
                Ok(())
            }
            Err(err) => {
                self.channels.fail(err.user_message());
                Err(err)
            }
        }
    }

    pub fn select_next_channel(&mut self) {
        let len = self.channels.data().map_or(0, Vec::len);
        step_selection(&mut self.channel_state, len, true);
    }

    pub fn select_prev_channel(&mut self) {
        let len = self.channels.data().map_or(0, Vec::len);
        step_selection(&mut self.channel_state, len, false);
    }

    /// Flip routing for the selected channel and save the whole routing set.
    pub async fn toggle_selected_channel(
        &mut self,
        client: &ApiClient,
        console: &mut Console,
    ) -> Result<()> {
        let id = self.current()?;
        let Some(index) = self.channel_state.selected() else {
            return Ok(());
        };
        let Some(channels) = self.channels.data() else {
            return Ok(());
        };

        let configs: Vec<AccountNotifyConfig> = channels
            .iter()
            .enumerate()
            .map(|(i, c)| AccountNotifyConfig {
                channel_id: c.channel_id,
                is_enabled: if i == index { !c.is_enabled } else { c.is_enabled },
                notify_config: c.notify_config.clone(),
            })
            .collect();

        NotifyStore::update_account_channels(client, console, id, configs).await?;
        self.fetch_channels(client, console).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockServer;
    use serde_json::json;

    #[test]
    fn test_open_resets_for_new_account() {
        let mut store = AccountDetailStore::new();
        store.open(1);
        store.tokens.set_loaded(Vec::new());
        store.open(1);
        assert!(store.tokens.data.is_loaded());
        store.open(2);
        assert!(!store.tokens.data.is_loaded());
        assert_eq!(store.account_id, Some(2));
    }

    #[tokio::test]
    async fn test_history_paging() {
        let server = MockServer::start().await;
        server.ok(
            "GET",
            "/accounts/4/sign-logs",
            json!({
                "items": [{"id": 1, "account_id": 4, "sign_time": "2024-03-05T08:00:00", "success": true}],
                "total": 25, "page": 1, "size": 10
            }),
        );
        let client = server.client();
        let mut console = Console::new();
        let mut store = AccountDetailStore::new();
        store.open(4);

        store.fetch_history(&client, &mut console, 1).await.unwrap();
        let page = store.history.data().unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_pages(), 3);

        store.history_next(&client, &mut console).await.unwrap();
        let request = server.last_request("GET", "/accounts/4/sign-logs").unwrap();
        assert_eq!(request.query.as_deref(), Some("page=2&size=10"));
    }

    #[tokio::test]
    async fn test_toggle_channel_sends_full_routing() {
        let server = MockServer::start().await;
        server.ok(
            "GET",
            "/notify/accounts/4",
            json!([
                {"channel_id": 1, "channel_name": "ops", "channel_type": "feishu", "is_enabled": true, "notify_config": {}},
                {"channel_id": 2, "channel_name": "mail", "channel_type": "email", "is_enabled": false, "notify_config": {"to_email": "a@b.c"}}
            ]),
        );
        server.ok("PUT", "/notify/accounts/4", json!(null));
        let client = server.client();
        let mut console = Console::new();
        let mut store = AccountDetailStore::new();
        store.open(4);

        store.fetch_channels(&client, &mut console).await.unwrap();
        store.select_next_channel();
        store
            .toggle_selected_channel(&client, &mut console)
            .await
            .unwrap();

        assert_eq!(
            server.last_request("PUT", "/notify/accounts/4").unwrap().json(),
            json!({"channels": [
                {"channel_id": 1, "is_enabled": true, "notify_config": {}},
                {"channel_id": 2, "is_enabled": true, "notify_config": {"to_email": "a@b.c"}}
            ]})
        );
    }
}
