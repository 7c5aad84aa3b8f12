// Account, token and health-check endpoints.

use serde::de::IgnoredAny;

use crate::error::Result;

use super::client::ApiClient;
use super::types::{
    Account, AccountInfo, ApiToken, BatchHealthCheckResult, CreateAccount, HealthCheckResult,
    SyncCount, TokenParams, UpdateAccount,
};

impl ApiClient {
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.get("/accounts").await?.data_or_default())
    }

    /// Register an account from a session cookie and remote user id.
    pub async fn create_account(&self, params: &CreateAccount) -> Result<Account> {
        self.post_json("/accounts", params)
            .await?
            .into_data("created account")
    }

    pub async fn get_account(&self, id: u64) -> Result<Account> {
        self.get(&format!("/accounts/{}", id))
            .await?
            .into_data("account")
    }

    pub async fn update_account(&self, id: u64, params: &UpdateAccount) -> Result<String> {
        let envelope = self
            .put_json::<IgnoredAny, _>(&format!("/accounts/{}", id), params)
            .await?;
        Ok(envelope.message)
    }

    pub async fn delete_account(&self, id: u64) -> Result<String> {
        let envelope = self
            .delete::<IgnoredAny>(&format!("/accounts/{}", id))
            .await?;
        Ok(envelope.message)
    }

    /// Live details fetched by the server from the third-party service.
    pub async fn get_account_info(&self, id: u64) -> Result<AccountInfo> {
        self.get(&format!("/accounts/{}/info", id))
            .await?
            .into_data("account info")
    }

    pub async fn health_check(&self, id: u64) -> Result<HealthCheckResult> {
        self.post(&format!("/accounts/{}/health-check", id))
            .await?
            .into_data("health check")
    }

    pub async fn health_check_all(&self) -> Result<BatchHealthCheckResult> {
        self.post("/accounts/health-check")
            .await?
            .into_data("health check")
    }

    pub async fn list_tokens(&self, account_id: u64) -> Result<Vec<ApiToken>> {
        Ok(self
            .get(&format!("/accounts/{}/tokens", account_id))
            .await?
            .data_or_default())
    }

    /// Pull tokens from the third-party service. Returns the message and count.
    pub async fn sync_tokens(&self, account_id: u64) -> Result<(String, u64)> {
        let envelope = self
            .post::<SyncCount>(&format!("/accounts/{}/tokens/sync", account_id))
            .await?;
        let message = envelope.message.clone();
        Ok((message, envelope.data_or_default().count))
    }

    pub async fn create_token(&self, account_id: u64, params: &TokenParams) -> Result<String> {
        let envelope = self
            .post_json::<IgnoredAny, _>(&format!("/accounts/{}/tokens", account_id), params)
            .await?;
        Ok(envelope.message)
    }

    pub async fn update_token(
        &self,
        account_id: u64,
        token_id: u64,
        params: &TokenParams,
    ) -> Result<String> {
        let envelope = self
            .put_json::<IgnoredAny, _>(
                &format!("/accounts/{}/tokens/{}", account_id, token_id),
                params,
            )
            .await?;
        Ok(envelope.message)
    }

    pub async fn delete_token(&self, account_id: u64, token_id: u64) -> Result<String> {
        let envelope = self
            .delete::<IgnoredAny>(&format!("/accounts/{}/tokens/{}", account_id, token_id))
            .await?;
        Ok(envelope.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockServer;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_account_body() {
        let server = MockServer::start().await;
        server.ok(
            "POST",
            "/accounts",
            json!({"id": 4, "username": "bob", "is_active": true}),
        );

        let params = CreateAccount {
            session_cookie: "MTcx...".into(),
            user_id: "8812".into(),
            group_id: None,
        };
        let account = server.client().create_account(&params).await.unwrap();
        assert_eq!(account.id, 4);

        let request = server.last_request("POST", "/accounts").unwrap();
        assert_eq!(
            request.json(),
            json!({"session_cookie": "MTcx...", "user_id": "8812"})
        );
    }

    #[tokio::test]
    async fn test_sync_tokens_reads_count() {
        let server = MockServer::start().await;
        server.on(
            "POST",
            "/accounts/4/tokens/sync",
            200,
            json!({"success": true, "message": "Synced 3 tokens", "data": {"count": 3}}),
        );

        let (message, count) = server.client().sync_tokens(4).await.unwrap();
        assert_eq!(message, "Synced 3 tokens");
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_token_update_path() {
        let server = MockServer::start().await;
        server.ok("PUT", "/accounts/4/tokens/17", json!(null));

        let params = TokenParams {
            name: "ci".into(),
            ..Default::default()
        };
        server.client().update_token(4, 17, &params).await.unwrap();

        let body = server.last_request("PUT", "/accounts/4/tokens/17").unwrap().json();
        assert_eq!(body["name"], "ci");
        assert_eq!(body["expired_time"], -1);
        assert_eq!(body["unlimited_quota"], true);
    }
}
