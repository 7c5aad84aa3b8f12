// Accounts store.
// Caches accounts and groups, and runs account, sign, health and token actions.

use ratatui::widgets::ListState;

use crate::api::ApiClient;
use crate::api::types::{
    Account, AccountGroup, ApiToken, BatchHealthCheckResult, BatchSignResult, CreateAccount,
    GroupColor, HealthCheckResult, HealthStatus, SignOutcome, TokenParams, UpdateAccount,
};
use crate::error::Result;

use super::console::Console;
use super::feedback::{batch_health_feedback, batch_sign_feedback, health_feedback, sign_feedback};
use super::list::{LoadingState, clamp_selection, step_selection};

#[derive(Debug, Default)]
pub struct AccountStore {
    pub accounts: LoadingState<Vec<Account>>,
    pub groups: Vec<AccountGroup>,
    pub selected_group_id: Option<u64>,
    pub loading: bool,
    pub list_state: ListState,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Account] {
        self.accounts.data().map(Vec::as_slice).unwrap_or_default()
    }

    /// Accounts in the selected group, or all of them when no group is selected.
    pub fn filtered(&self) -> Vec<&Account> {
        self.all()
            .iter()
            .filter(|a| self.selected_group_id.is_none() || a.group_id == self.selected_group_id)
            .collect()
    }

    pub fn healthy(&self) -> Vec<&Account> {
        self.with_health(HealthStatus::Healthy)
    }

    pub fn unhealthy(&self) -> Vec<&Account> {
        self.with_health(HealthStatus::Unhealthy)
    }

    fn with_health(&self, status: HealthStatus) -> Vec<&Account> {
        self.all()
            .iter()
            .filter(|a| a.health_status == status)
            .collect()
    }

    pub fn active(&self) -> Vec<&Account> {
        self.all().iter().filter(|a| a.is_active).collect()
    }

    pub fn count(&self) -> usize {
        self.all().len()
    }

    /// Group filter choices, "All groups" first.
    pub fn group_options(&self) -> Vec<(String, Option<u64>)> {
        std::iter::once(("All groups".to_string(), None))
            .chain(self.groups.iter().map(|g| (g.name.clone(), Some(g.id))))
            .collect()
    }

    pub fn group_color(&self, color: GroupColor) -> &'static str {
        color.hex()
    }

    /// Group an account belongs to, from the embedded record or the cached groups.
    pub fn group_of<'a>(&'a self, account: &'a Account) -> Option<&'a AccountGroup> {
        account.group.as_ref().or_else(|| {
            let id = account.group_id?;
            self.groups.iter().find(|g| g.id == id)
        })
    }

    pub fn selected_group_name(&self) -> &str {
        self.selected_group_id
            .and_then(|id| self.groups.iter().find(|g| g.id == id))
            .map(|g| g.name.as_str())
            .unwrap_or("All groups")
    }

    /// Step through the group filter: all, each group, then all again.
    pub fn cycle_group_filter(&mut self) {
        let options = self.group_options();
        let current = options
            .iter()
            .position(|(_, id)| *id == self.selected_group_id)
            .unwrap_or(0);
        self.selected_group_id = options[(current + 1) % options.len()].1;
        let len = self.filtered().len();
        self.list_state.select(None);
        clamp_selection(&mut self.list_state, len);
    }

    pub fn account_by_id(&self, id: u64) -> Option<&Account> {
        self.all().iter().find(|a| a.id == id)
    }

    pub fn selected_account(&self) -> Option<&Account> {
        let index = self.list_state.selected()?;
        self.filtered().get(index).copied()
    }

    pub fn select_next(&mut self) {
        let len = self.filtered().len();
        step_selection(&mut self.list_state, len, true);
    }

    pub fn select_prev(&mut self) {
        let len = self.filtered().len();
        step_selection(&mut self.list_state, len, false);
    }

    pub async fn fetch_accounts(&mut self, client: &ApiClient, console: &mut Console) -> Result<()> {
        self.loading = true;
        self.accounts.begin_refresh();
        let result = client.list_accounts().await;
        self.loading = false;

        match result {
            Ok(accounts) => {
                tracing::debug!(count = accounts.len(), "accounts loaded");
                self.accounts = LoadingState::Loaded(accounts);
                let len = self.filtered().len();
                clamp_selection(&mut self.list_state, len);
                Ok(())
            }
            Err(err) => {
                console.report(&err);
                self.accounts.fail(err.user_message());
                Err(err)
            }
        }
    }

    /// Load groups. Failure is logged and leaves an empty list without notifying.
    pub async fn fetch_groups(&mut self, client: &ApiClient) -> &[AccountGroup] {
        match client.list_groups().await {
            Ok(groups) => self.groups = groups,
            Err(error) => {
                tracing::warn!(%error, "failed to load groups");
                self.groups = Vec::new();
            }
        }
        if self
            .selected_group_id
            .is_some_and(|id| !self.groups.iter().any(|g| g.id == id))
        {
            self.selected_group_id = None;
        }
        &self.groups
    }

    pub async fn create_account(
        &mut self,
        client: &ApiClient,
        console: &mut Console,
        params: &CreateAccount,
    ) -> Result<Account> {
        let account = console.track(client.create_account(params).await)?;
        tracing::info!(account_id = account.id, "account created");
        console.success(format!("Added account {}", account.label()));
        self.fetch_accounts(client, console).await?;
        Ok(account)
    }

    pub async fn update_account(
        &mut self,
        client: &ApiClient,
        console: &mut Console,
        id: u64,
        params: &UpdateAccount,
    ) -> Result<()> {
        console.track(client.update_account(id, params).await)?;
        tracing::info!(account_id = id, "account updated");
        console.success("Account updated");
        self.fetch_accounts(client, console).await
    }

    pub async fn delete_account(
        &mut self,
        client: &ApiClient,
        console: &mut Console,
        id: u64,
    ) -> Result<()> {
        console.track(client.delete_account(id).await)?;
        tracing::info!(account_id = id, "account deleted");
        console.success("Account deleted");
        self.fetch_accounts(client, console).await
    }

    /// Move an account to the next group in list order. Past the last group it leaves its group.
    pub async fn move_to_next_group(
        &mut self,
        client: &ApiClient,
        console: &mut Console,
        id: u64,
    ) -> Result<()> {
        let current = self
            .account_by_id(id)
            .and_then(|a| a.group_id.or_else(|| a.group.as_ref().map(|g| g.id)));
        let next = match current.and_then(|gid| self.groups.iter().position(|g| g.id == gid)) {
            None => self.groups.first(),
            Some(i) => self.groups.get(i + 1),
        }
        .map(|g| (g.id, g.name.clone()));

        match (next, current) {
            (Some((group_id, name)), _) => {
                console.track(client.add_accounts_to_group(group_id, &[id]).await)?;
                tracing::info!(account_id = id, group_id, "account moved to group");
                console.success(format!("Moved to group {}", name));
            }
            (None, Some(group_id)) => {
                console.track(client.remove_accounts_from_group(group_id, &[id]).await)?;
                tracing::info!(account_id = id, group_id, "account removed from group");
                console.success("Removed from group");
            }
            (None, None) => return Ok(()),
        }

        self.fetch_groups(client).await;
        self.fetch_accounts(client, console).await
    }

    pub async fn sign_account(
        &mut self,
        client: &ApiClient,
        console: &mut Console,
        id: u64,
    ) -> Result<SignOutcome> {
        let outcome = console.track(client.sign_account(id).await)?;
        let (level, message) = sign_feedback(&outcome);
        console.push(level, message);
        self.fetch_accounts(client, console).await?;
        Ok(outcome)
    }

    pub async fn batch_sign(&mut self, client: &ApiClient, console: &mut Console) -> Result<BatchSignResult> {
        let result = console.track(client.batch_sign().await)?;
        let (level, message) = batch_sign_feedback(&result);
        console.push(level, message);
        self.fetch_accounts(client, console).await?;
        Ok(result)
    }

    pub async fn health_check(
        &mut self,
        client: &ApiClient,
        console: &mut Console,
        id: u64,
    ) -> Result<HealthCheckResult> {
        let result = console.track(client.health_check(id).await)?;
        let (level, message) = health_feedback(&result);
        console.push(level, message);
        self.fetch_accounts(client, console).await?;
        Ok(result)
    }

    pub async fn health_check_all(
        &mut self,
        client: &ApiClient,
        console: &mut Console,
    ) -> Result<BatchHealthCheckResult> {
        let result = console.track(client.health_check_all().await)?;
        let (level, message) = batch_health_feedback(&result);
        console.push(level, message);
        self.fetch_accounts(client, console).await?;
        Ok(result)
    }

    pub async fn tokens(
        &self,
        client: &ApiClient,
        console: &mut Console,
        account_id: u64,
    ) -> Result<Vec<ApiToken>> {
        console.track(client.list_tokens(account_id).await)
    }

    /// Sync from the remote service, then list the refreshed tokens.
    pub async fn sync_tokens(
        &self,
        client: &ApiClient,
        console: &mut Console,
        account_id: u64,
    ) -> Result<Vec<ApiToken>> {
        let (message, count) = console.track(client.sync_tokens(account_id).await)?;
        tracing::info!(account_id, count, "tokens synced");
        console.success(if message.is_empty() {
            format!("Synced {} tokens", count)
        } else {
            message
        });
        self.tokens(client, console, account_id).await
    }

    pub async fn create_token(
        &self,
        client: &ApiClient,
        console: &mut Console,
        account_id: u64,
        params: &TokenParams,
    ) -> Result<()> {
        console.track(client.create_token(account_id, params).await)?;
        console.success(format!("Created token {}", params.name));
        Ok(())
    }

    pub async fn update_token(
        &self,
        client: &ApiClient,
        console: &mut Console,
        account_id: u64,
        token_id: u64,
        params: &TokenParams,
    ) -> Result<()> {
        console.track(client.update_token(account_id, token_id, params).await)?;
        console.success(format!("Updated token {}", params.name));
        Ok(())
    }

    pub async fn delete_token(
        &self,
        client: &ApiClient,
        console: &mut Console,
        account_id: u64,
        token_id: u64,
    ) -> Result<()> {
        console.track(client.delete_token(account_id, token_id).await)?;
        console.success("Token deleted");
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::console::ConsoleLevel;
    use crate::test_support::MockServer;
    use serde_json::{Value, json};

    fn accounts_json() -> Value {
        json!([
            {"id": 1, "username": "alice", "is_active": true, "health_status": "healthy", "group_id": 10},
            {"id": 2, "username": "bob", "is_active": false, "health_status": "unhealthy"},
            {"id": 3, "username": "carol", "is_active": true, "health_status": "unknown", "group_id": 10}
        ])
    }

    #[tokio::test]
    async fn test_fetch_accounts_caches_response() {
        let server = MockServer::start().await;
        server.ok("GET", "/accounts", accounts_json());
        let client = server.client();
        let mut console = Console::new();
        let mut store = AccountStore::new();

        store.fetch_accounts(&client, &mut console).await.unwrap();

        let ids: Vec<u64> = store.all().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(!store.loading);
        assert_eq!(store.count(), 3);
        assert_eq!(store.healthy().len(), 1);
        assert_eq!(store.unhealthy().len(), 1);
        assert_eq!(store.active().len(), 2);
        assert_eq!(store.selected_account().map(|a| a.id), Some(1));
        assert!(console.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_records_error() {
        let server = MockServer::start().await;
        server.on("GET", "/accounts", 500, json!({"detail": "database is locked"}));
        let client = server.client();
        let mut console = Console::new();
        let mut store = AccountStore::new();

        assert!(store.fetch_accounts(&client, &mut console).await.is_err());
        let last = console.last().unwrap();
        assert_eq!(last.level, ConsoleLevel::Error);
        assert_eq!(last.message, "database is locked");
        assert!(matches!(store.accounts, LoadingState::Error(_)));
    }

    #[tokio::test]
    async fn test_group_filter_and_options() {
        let server = MockServer::start().await;
        server.ok("GET", "/accounts", accounts_json());
        server.ok(
            "GET",
            "/groups",
            json!([{"id": 10, "name": "main", "color": "blue", "account_count": 2}]),
        );
        let client = server.client();
        let mut console = Console::new();
        let mut store = AccountStore::new();

        store.fetch_accounts(&client, &mut console).await.unwrap();
        store.fetch_groups(&client).await;

        let options = store.group_options();
        assert_eq!(options[0], ("All groups".to_string(), None));
        assert_eq!(options[1], ("main".to_string(), Some(10)));

        store.cycle_group_filter();
        assert_eq!(store.selected_group_id, Some(10));
        let ids: Vec<u64> = store.filtered().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(store.group_color(store.groups[0].color), "#2080f0");

        store.cycle_group_filter();
        assert_eq!(store.selected_group_id, None);
        assert_eq!(store.filtered().len(), 3);
    }

    #[tokio::test]
    async fn test_move_to_next_group() {
        let server = MockServer::start().await;
        server.ok("GET", "/accounts", accounts_json());
        server.ok(
            "GET",
            "/groups",
            json!([
                {"id": 10, "name": "main", "color": "blue"},
                {"id": 11, "name": "spare", "color": "green"}
            ]),
        );
        server.ok("POST", "/groups/11/accounts", json!(null));
        server.ok("DELETE", "/groups/10/accounts", json!(null));
        let client = server.client();
        let mut console = Console::new();
        let mut store = AccountStore::new();
        store.fetch_accounts(&client, &mut console).await.unwrap();
        store.fetch_groups(&client).await;

        store.move_to_next_group(&client, &mut console, 1).await.unwrap();
        assert_eq!(
            server.last_request("POST", "/groups/11/accounts").unwrap().json(),
            json!([1])
        );
        assert_eq!(console.last().unwrap().message, "Moved to group spare");

        store.groups.truncate(1);
        store.move_to_next_group(&client, &mut console, 1).await.unwrap();
        assert_eq!(
            server.last_request("DELETE", "/groups/10/accounts").unwrap().json(),
            json!([1])
        );
        assert_eq!(console.last().unwrap().message, "Removed from group");
    }

    #[tokio::test]
    async fn test_group_failure_is_silent() {
        let server = MockServer::start().await;
        server.on("GET", "/groups", 500, json!({"detail": "boom"}));
        let client = server.client();
        let mut store = AccountStore::new();

        assert!(store.fetch_groups(&client).await.is_empty());
        assert_eq!(store.group_options().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_refetches() {
        let server = MockServer::start().await;
        server.ok("DELETE", "/accounts/2", json!(null));
        server.ok("GET", "/accounts", json!([]));
        let client = server.client();
        let mut console = Console::new();
        let mut store = AccountStore::new();

        store.delete_account(&client, &mut console, 2).await.unwrap();
        assert_eq!(server.count("GET", "/accounts"), 1);
        assert_eq!(console.last().unwrap().level, ConsoleLevel::Success);
        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn test_sign_account_feedback() {
        let server = MockServer::start().await;
        server.ok(
            "POST",
            "/accounts/1/sign",
            json!({"status": "already_signed", "message": "今日已签到", "reward_quota": 0}),
        );
        server.ok("GET", "/accounts", accounts_json());
        let client = server.client();
        let mut console = Console::new();
        let mut store = AccountStore::new();

        store.sign_account(&client, &mut console, 1).await.unwrap();
        let info = console
            .messages()
            .find(|m| m.level == ConsoleLevel::Info)
            .unwrap();
        assert_eq!(info.message, "Already signed today, no new reward");
        assert_eq!(store.count(), 3);
    }

    #[tokio::test]
    async fn test_sync_tokens_relists() {
        let server = MockServer::start().await;
        server.on(
            "POST",
            "/accounts/1/tokens/sync",
            200,
            json!({"success": true, "message": "", "data": {"count": 1}}),
        );
        server.ok(
            "GET",
            "/accounts/1/tokens",
            json!([{"id": 5, "token_id": 99, "key": "abc", "name": "default", "expired_time": -1}]),
        );
        let client = server.client();
        let mut console = Console::new();
        let store = AccountStore::new();

        let tokens = store.sync_tokens(&client, &mut console, 1).await.unwrap();
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].never_expires());
        assert_eq!(console.last().unwrap().message, "Synced 1 tokens");
    }
}
