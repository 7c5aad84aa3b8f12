// Authentication endpoints.

use crate::error::Result;

use super::client::ApiClient;
use super::types::{ChangePassword, LoginParams, LoginResult, User};

impl ApiClient {
    /// Exchange credentials for a bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult> {
        let params = LoginParams {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.post_json("/auth/login", &params)
            .await?
            .into_data("login")
    }

    pub async fn current_user(&self) -> Result<User> {
        self.get("/auth/me").await?.into_data("current user")
    }

    /// Change the operator password. Returns the server message.
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<String> {
        let body = ChangePassword {
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
        };
        let envelope = self
            .put_json::<serde::de::IgnoredAny, _>("/auth/password", &body)
            .await?;
        Ok(envelope.message)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::MockServer;
    use serde_json::json;

    #[tokio::test]
    async fn test_login_posts_credentials() {
        let server = MockServer::start().await;
        server.ok(
            "POST",
            "/auth/login",
            json!({"access_token": "jwt-abc", "token_type": "bearer"}),
        );

        let result = server.client().login("admin", "hunter2").await.unwrap();
        assert_eq!(result.access_token, "jwt-abc");

        let request = server.last_request("POST", "/auth/login").unwrap();
        assert_eq!(
            request.json(),
            json!({"username": "admin", "password": "hunter2"})
        );
    }

    #[tokio::test]
    async fn test_change_password_returns_message() {
        let server = MockServer::start().await;
        server.on(
            "PUT",
            "/auth/password",
            200,
            json!({"success": true, "message": "Password changed", "data": null}),
        );

        let message = server
            .client()
            .change_password("old", "new-secret")
            .await
            .unwrap();
        assert_eq!(message, "Password changed");
    }
}
