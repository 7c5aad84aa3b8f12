// Global sign log listing with server-side filters.

use crate::api::ApiClient;
use crate::api::types::{SignLog, SignLogQuery};
use crate::error::Result;

use super::console::Console;
use super::list::{LoadingState, Page};

#[derive(Debug, Default)]
pub struct SignLogStore {
    pub logs: LoadingState<Page<SignLog>>,
    pub query: SignLogQuery,
    pub success_count: u64,
    pub fail_count: u64,
}

impl SignLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fetch(&mut self, client: &ApiClient, console: &mut Console) -> Result<()> {
        self.logs.begin_refresh();
        match client.list_sign_logs(&self.query).await {
            Ok(result) => {
                self.success_count = result.success_count.unwrap_or_else(|| {
                    result.items.iter().filter(|log| log.success).count() as u64
                });
                self.fail_count = result.fail_count.unwrap_or_else(|| {
                    result.items.iter().filter(|log| !log.success).count() as u64
                });
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

    /// All -> successes only -> failures only -> all. Returns to the first page.
    pub fn cycle_success_filter(&mut self) {
        self.query.success = match self.query.success {
            None => Some(true),
            Some(true) => Some(false),
            Some(false) => None,
        };
        self.query.page = 1;
    }

    pub fn set_account_filter(&mut self, account_id: Option<u64>) {
        self.query.account_id = account_id;
        self.query.page = 1;
    }

    /// Dates are `YYYY-MM-DD`; blank bounds are dropped.
    pub fn set_date_range(&mut self, start: Option<String>, end: Option<String>) {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        self.query.start_date = non_blank(start);
        self.query.end_date = non_blank(end);
        self.query.page = 1;
    }

    pub fn success_filter_label(&self) -> &'static str {
        match self.query.success {
            None => "all",
            Some(true) => "success",
            Some(false) => "failed",
        }
    }

    pub fn selected_log(&self) -> Option<&SignLog> {
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

    #[test]
    fn test_cycle_success_filter() {
        let mut store = SignLogStore::new();
        store.query.page = 3;
        store.cycle_success_filter();
        assert_eq!(store.query.success, Some(true));
        assert_eq!(store.query.page, 1);
        store.cycle_success_filter();
        assert_eq!(store.success_filter_label(), "failed");
        store.cycle_success_filter();
        assert_eq!(store.query.success, None);
    }

    #[test]
    fn test_blank_dates_are_dropped() {
        let mut store = SignLogStore::new();
        store.set_date_range(Some("2024-03-01".into()), Some("  ".into()));
        assert_eq!(store.query.start_date.as_deref(), Some("2024-03-01"));
        assert_eq!(store.query.end_date, None);
    }

    #[tokio::test]
    async fn test_fetch_and_page_forward() {
        let server = MockServer::start().await;
        server.ok(
            "GET",
            "/sign-logs",
            json!({
                "items": [
                    {"id": 2, "account_id": 1, "sign_time": "2024-03-05T08:00:00", "success": true},
                    {"id": 1, "account_id": 1, "sign_time": "2024-03-04T08:00:00", "success": false}
                ],
                "total": 45, "page": 1, "size": 20
            }),
        );
        let client = server.client();
        let mut console = Console::new();
        let mut store = SignLogStore::new();
        store.set_account_filter(Some(1));

        store.fetch(&client, &mut console).await.unwrap();
        assert_eq!(store.success_count, 1);
        assert_eq!(store.fail_count, 1);
        assert_eq!(store.logs.data().unwrap().total_pages(), 3);
        assert_eq!(store.selected_log().unwrap().id, 2);

        store.next_page(&client, &mut console).await.unwrap();
        let request = server.last_request("GET", "/sign-logs").unwrap();
        assert_eq!(request.query.as_deref(), Some("page=2&size=20&account_id=1"));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_page() {
        let server = MockServer::start().await;
        server.ok(
            "GET",
            "/sign-logs",
            json!({"items": [], "total": 0, "page": 1, "size": 20, "success_count": 0, "fail_count": 0}),
        );
        let client = server.client();
        let mut console = Console::new();
        let mut store = SignLogStore::new();
        store.fetch(&client, &mut console).await.unwrap();

        server.on("GET", "/sign-logs", 500, json!({"detail": "database locked"}));
        assert!(store.fetch(&client, &mut console).await.is_err());
        assert!(store.logs.data().is_some());
        assert_eq!(console.last().unwrap().message, "database locked");
    }
}
