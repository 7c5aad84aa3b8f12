// Sign action and sign log endpoints.

use crate::error::Result;

use super::client::ApiClient;
use super::types::{BatchSignResult, SignLogPage, SignLogQuery, SignOutcome};

impl ApiClient {
    /// Sign one account. The server records the attempt regardless of outcome.
    pub async fn sign_account(&self, account_id: u64) -> Result<SignOutcome> {
        let envelope = self
            .post::<SignOutcome>(&format!("/accounts/{}/sign", account_id))
            .await?;
        let message = envelope.message.clone();
        let mut outcome = envelope.into_data("sign result")?;
        if outcome.message.is_empty() {
            outcome.message = message;
        }
        Ok(outcome)
    }

    /// Sign every active account.
    pub async fn batch_sign(&self) -> Result<BatchSignResult> {
        self.post("/sign/batch").await?.into_data("batch sign result")
    }

    pub async fn list_sign_logs(&self, query: &SignLogQuery) -> Result<SignLogPage> {
        Ok(self.get_with_params("/sign-logs", query).await?.data_or_default())
    }

    pub async fn account_sign_logs(&self, account_id: u64, page: u32, size: u32) -> Result<SignLogPage> {
        let params = [("page", page), ("size", size)];
        Ok(self
            .get_with_params(&format!("/accounts/{}/sign-logs", account_id), &params)
            .await?
            .data_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::SignStatus;
    use crate::test_support::MockServer;
    use serde_json::json;

    #[tokio::test]
    async fn test_sign_falls_back_to_envelope_message() {
        let server = MockServer::start().await;
        server.on(
            "POST",
            "/accounts/3/sign",
            200,
            json!({"success": true, "message": "Signed", "data": {"reward_quota": 250000, "reward_display": "$0.50"}}),
        );

        let outcome = server.client().sign_account(3).await.unwrap();
        assert_eq!(outcome.message, "Signed");
        assert_eq!(outcome.effective_status(), SignStatus::Success);
    }

    #[tokio::test]
    async fn test_sign_log_query_string() {
        let server = MockServer::start().await;
        server.ok(
            "GET",
            "/sign-logs",
            json!({"items": [], "total": 0, "page": 2, "size": 20}),
        );

        let query = SignLogQuery {
            page: 2,
            account_id: Some(5),
            success: Some(true),
            ..Default::default()
        };
        let page = server.client().list_sign_logs(&query).await.unwrap();
        assert_eq!(page.page, 2);

        let request = server.last_request("GET", "/sign-logs").unwrap();
        assert_eq!(
            request.query.as_deref(),
            Some("page=2&size=20&account_id=5&success=true")
        );
    }
}
