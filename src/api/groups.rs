// Account group endpoints.

use serde::de::IgnoredAny;

use crate::error::Result;

use super::client::ApiClient;
use super::types::{AccountGroup, GroupParams};

impl ApiClient {
    pub async fn list_groups(&self) -> Result<Vec<AccountGroup>> {
        Ok(self.get("/groups").await?.data_or_default())
    }

    pub async fn create_group(&self, params: &GroupParams) -> Result<AccountGroup> {
        self.post_json("/groups", params)
            .await?
            .into_data("created group")
    }

    pub async fn update_group(&self, id: u64, params: &GroupParams) -> Result<String> {
        let envelope = self
            .put_json::<IgnoredAny, _>(&format!("/groups/{}", id), params)
            .await?;
        Ok(envelope.message)
    }

    pub async fn delete_group(&self, id: u64) -> Result<String> {
        let envelope = self.delete::<IgnoredAny>(&format!("/groups/{}", id)).await?;
        Ok(envelope.message)
    }

    pub async fn add_accounts_to_group(&self, id: u64, account_ids: &[u64]) -> Result<String> {
        let envelope = self
            .post_json::<IgnoredAny, _>(&format!("/groups/{}/accounts", id), account_ids)
            .await?;
        Ok(envelope.message)
    }

    pub async fn remove_accounts_from_group(&self, id: u64, account_ids: &[u64]) -> Result<String> {
        let envelope = self
            .delete_json::<IgnoredAny, _>(&format!("/groups/{}/accounts", id), account_ids)
            .await?;
        Ok(envelope.message)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::MockServer;
    use serde_json::json;

    #[tokio::test]
    async fn test_group_membership_bodies() {
        let server = MockServer::start().await;
        server.on(
            "POST",
            "/groups/2/accounts",
            200,
            json!({"success": true, "message": "Added 2 accounts", "data": null}),
        );
        server.ok("DELETE", "/groups/2/accounts", json!(null));

        let client = server.client();
        let message = client.add_accounts_to_group(2, &[5, 6]).await.unwrap();
        assert_eq!(message, "Added 2 accounts");
        client.remove_accounts_from_group(2, &[6]).await.unwrap();

        assert_eq!(
            server.last_request("POST", "/groups/2/accounts").unwrap().json(),
            json!([5, 6])
        );
        assert_eq!(
            server.last_request("DELETE", "/groups/2/accounts").unwrap().json(),
            json!([6])
        );
    }
}
