// Audit log store.

use crate::api::ApiClient;
use crate::api::types::{AuditActionOption, AuditLog, AuditQuery};
use crate::error::Result;

use super::console::Console;
use super::list::{LoadingState, Page};

#[derive(Debug, Default)]
pub struct AuditStore {
    pub logs: LoadingState<Page<AuditLog>>,
    pub actions: Vec<AuditActionOption>,
    pub query: AuditQuery,
}

impl AuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fetch(&mut self, client: &ApiClient, console: &mut Console) -> Result<()> {
        self.logs.begin_refresh();
        match client.list_audit_logs(&self.query).await {
            Ok(result) => {
                self.query.page = result.page.max(1);
                self.logs = LoadingState::Loaded(Page::new(
                    result.items,
                    result.total,
                    result.page,
                    result.size,
                ));
                Ok(())
            }
            Err(err) => {
                console.report(&err);
                self.logs.fail(err.user_message());
                Err(err)
            }
        }
    }

    /// Load the action filter options once. Failures only disable the filter.
    pub async fn fetch_actions(&mut self, client: &ApiClient) {
        if !self.actions.is_empty() {
            return;
        }
        match client.audit_actions().await {
            Ok(actions) => self.actions = actions,
            Err(error) => tracing::warn!(%error, "failed to load audit action types"),
        }
    }

    pub async fn next_page(&mut self, client: &ApiClient, console: &mut Console) -> Result<()> {
        match self.logs.data().and_then(Page::next_page) {
            Some(page) => {
                self.query.page = page;
                self.fetch(client, console).await
            }
            None => Ok(()),
        }
    }

    pub async fn prev_page(&mut self, client: &ApiClient, console: &mut Console) -> Result<()> {
        match self.logs.data().and_then(Page::prev_page) {
            Some(page) => {
                self.query.page = page;
                self.fetch(client, console).await
            }
            None => Ok(()),
        }
    }

    /// Step the action filter through "all" and each known action type.
    pub fn cycle_action_filter(&mut self) {
        let position = self
            .query
            .action
            .as_ref()
            .and_then(|current| self.actions.iter().position(|a| &a.value == current));
        let next = match position {
            None => 0,
            Some(i) => i + 1,
        };
        self.query.action = self.actions.get(next).map(|a| a.value.clone());
        self.query.page = 1;
    }

    pub fn action_filter_label(&self) -> &str {
        match &self.query.action {
            None => "all actions",
            Some(value) => self
                .actions
                .iter()
                .find(|a| &a.value == value)
                .map_or(value.as_str(), |a| a.label.as_str()),
        }
    }

    pub fn set_keyword(&mut self, keyword: &str) {
        let keyword = keyword.trim();
        self.query.keyword = (!keyword.is_empty()).then(|| keyword.to_string());
        self.query.page = 1;
    }

    pub fn selected_log(&self) -> Option<&AuditLog> {
        self.logs.data().and_then(Page::selected_item)
    }

    pub fn select_next(&mut self) {
        if let Some(page) = self.logs.data_mut() {
            page.select_next();
        }
    }

    pub fn select_prev(&mut self) {
        if let Some(page) = self.logs.data_mut() {
            page.select_prev();
        }
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

    fn actions() -> Vec<AuditActionOption> {
        serde_json::from_value(json!([
            {"value": "login", "label": "Login"},
            {"value": "sign", "label": "Sign"}
        ]))
        .unwrap()
    }

    #[test]
    fn test_cycle_action_filter() {
        let mut store = AuditStore::new();
        store.cycle_action_filter();
        assert_eq!(store.query.action, None);

        store.actions = actions();
        store.cycle_action_filter();
        assert_eq!(store.query.action.as_deref(), Some("login"));
        assert_eq!(store.action_filter_label(), "Login");
        store.cycle_action_filter();
        assert_eq!(store.query.action.as_deref(), Some("sign"));
        store.cycle_action_filter();
        assert_eq!(store.action_filter_label(), "all actions");
    }

    #[test]
    fn test_blank_keyword_clears_filter() {
        let mut store = AuditStore::new();
        store.set_keyword(" alice ");
        assert_eq!(store.query.keyword.as_deref(), Some("alice"));
        store.set_keyword("   ");
        assert_eq!(store.query.keyword, None);
    }

    #[tokio::test]
    async fn test_fetch_sends_filters() {
        let server = MockServer::start().await;
        server.ok(
            "GET",
            "/audit/logs",
            json!({
                "items": [{"id": 7, "action": "login", "username": "admin", "ip_address": "10.0.0.2"}],
                "total": 1, "page": 1, "size": 20, "pages": 1
            }),
        );
        server.ok("GET", "/audit/actions", json!([{"value": "login", "label": "Login"}]));
        let client = server.client();
        let mut console = Console::new();
        let mut store = AuditStore::new();

        store.fetch_actions(&client).await;
        store.fetch_actions(&client).await;
        assert_eq!(server.count("GET", "/audit/actions"), 1);

        store.cycle_action_filter();
        store.set_keyword("admin");
        store.fetch(&client, &mut console).await.unwrap();
        assert_eq!(store.selected_log().unwrap().id, 7);
        assert_eq!(
            server.last_request("GET", "/audit/logs").unwrap().query.as_deref(),
            Some("page=1&size=20&action=login&keyword=admin")
        );
    }
}
