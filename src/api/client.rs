// Automation server HTTP client.
// Handles bearer authentication, envelope decoding and error mapping.

use reqwest::{
    Client, RequestBuilder, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
    multipart,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, Result};

use super::types::ApiEnvelope;

const CLIENT_USER_AGENT: &str = concat!("signdesk/", env!("CARGO_PKG_VERSION"));

/// REST client for the automation server.
pub struct ApiClient {
    client: Client,
    base: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for the configured server. No credential is attached yet.
    pub fn new(config: &ConsoleConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base: config.api_base.clone(),
            token: None,
        })
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|t| !t.trim().is_empty());
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// GET an endpoint and decode its envelope.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<ApiEnvelope<T>> {
        let request = self.request(reqwest::Method::GET, endpoint);
        self.send(request).await
    }

    /// GET with query parameters.
    pub async fn get_with_params<T, P>(&self, endpoint: &str, params: &P) -> Result<ApiEnvelope<T>>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let request = self.request(reqwest::Method::GET, endpoint).query(params);
        self.send(request).await
    }

    /// POST without a body.
    pub async fn post<T: DeserializeOwned>(&self, endpoint: &str) -> Result<ApiEnvelope<T>> {
        let request = self.request(reqwest::Method::POST, endpoint);
        self.send(request).await
    }

    pub async fn post_json<T, B>(&self, endpoint: &str, body: &B) -> Result<ApiEnvelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(reqwest::Method::POST, endpoint).json(body);
        self.send(request).await
    }

    pub async fn put_json<T, B>(&self, endpoint: &str, body: &B) -> Result<ApiEnvelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(reqwest::Method::PUT, endpoint).json(body);
        self.send(request).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<ApiEnvelope<T>> {
        let request = self.request(reqwest::Method::DELETE, endpoint);
        self.send(request).await
    }

    /// DELETE carrying a JSON body (group membership removal).
    pub async fn delete_json<T, B>(&self, endpoint: &str, body: &B) -> Result<ApiEnvelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(reqwest::Method::DELETE, endpoint).json(body);
        self.send(request).await
    }

    /// GET a raw (non-envelope) body, e.g. a backup download.
    pub async fn get_bytes<P: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        params: &P,
    ) -> Result<Vec<u8>> {
        let request = self.request(reqwest::Method::GET, endpoint).query(params);
        let response = self.check_response(request.send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Upload a file as the multipart field `file`.
    pub async fn post_multipart<T, P>(
        &self,
        endpoint: &str,
        params: &P,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<ApiEnvelope<T>>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let part = multipart::Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("application/json")?;
        let form = multipart::Form::new().part("file", part);
        let request = self
            .request(reqwest::Method::POST, endpoint)
            .query(params)
            .multipart(form);
        self.send(request).await
    }

    fn request(&self, method: reqwest::Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base, endpoint);
        tracing::debug!(%method, %url, "api request");

        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<ApiEnvelope<T>> {
        let response = self.check_response(request.send().await?).await?;
        let bytes = response.bytes().await?;
        let envelope: ApiEnvelope<T> = serde_json::from_slice(&bytes)?;

        if !envelope.success {
            return Err(ConsoleError::Rejected(envelope.message));
        }
        Ok(envelope)
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let path = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        let detail = error_detail(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
        tracing::warn!(%status, %path, %detail, "api request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED => ConsoleError::Unauthorized(detail),
            StatusCode::NOT_FOUND => ConsoleError::NotFound(detail),
            status => ConsoleError::Api { status, detail },
        })
    }
}

impl<T> ApiEnvelope<T> {
    /// Payload of a successful response; absent data is an error.
    pub fn into_data(self, what: &str) -> Result<T> {
        self.data
            .ok_or_else(|| ConsoleError::MissingData(what.to_string()))
    }

    pub fn data_or_default(self) -> T
    where
        T: Default,
    {
        self.data.unwrap_or_default()
    }
}

/// Extract the human-readable detail from an error body.
///
/// Accepts `{"detail": "..."}`, FastAPI validation lists
/// (`{"detail": [{"msg": "..."}]}`) and `{"message": "..."}`.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    match value.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => return Some(detail.clone()),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if !messages.is_empty() {
                return Some(messages.join("; "));
            }
        }
        _ => {}
    }

    value
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockServer;
    use serde_json::json;

    #[test]
    fn test_error_detail_shapes() {
        assert_eq!(
            error_detail(r#"{"detail":"Incorrect username or password"}"#).as_deref(),
            Some("Incorrect username or password")
        );
        assert_eq!(
            error_detail(
                r#"{"detail":[{"loc":["body","name"],"msg":"field required"},{"msg":"too short"}]}"#
            )
            .as_deref(),
            Some("field required; too short")
        );
        assert_eq!(
            error_detail(r#"{"success":false,"message":"boom"}"#).as_deref(),
            Some("boom")
        );
        assert_eq!(error_detail("<html>bad gateway</html>"), None);
    }

    #[tokio::test]
    async fn test_bearer_token_is_attached() {
        let server = MockServer::start().await;
        server.ok("GET", "/auth/me", json!({"id": 1, "username": "admin"}));

        let mut client = server.client();
        client.set_token(Some("secret".into()));
        let envelope: ApiEnvelope<Value> = client.get("/auth/me").await.unwrap();
        assert!(envelope.success);

        let request = server.last_request("GET", "/auth/me").unwrap();
        assert_eq!(request.authorization.as_deref(), Some("Bearer secret"));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        server.on("GET", "/accounts", 401, json!({"detail": "Token expired"}));
        server.on("GET", "/accounts/9", 404, json!({"detail": "Account not found"}));
        server.on("PUT", "/settings", 422, json!({"detail": [{"msg": "bad time"}]}));
        server.on(
            "POST",
            "/sign/batch",
            200,
            json!({"success": false, "message": "No active accounts", "data": null}),
        );

        let client = server.client();
        let err = client.get::<Value>("/accounts").await.unwrap_err();
        assert!(matches!(err, ConsoleError::Unauthorized(ref d) if d == "Token expired"));

        let err = client.get::<Value>("/accounts/9").await.unwrap_err();
        assert!(matches!(err, ConsoleError::NotFound(ref d) if d == "Account not found"));

        let err = client
            .put_json::<Value, _>("/settings", &json!({}))
            .await
            .unwrap_err();
        assert!(
            matches!(err, ConsoleError::Api { status, ref detail } if status == StatusCode::UNPROCESSABLE_ENTITY && detail == "bad time")
        );

        let err = client.post::<Value>("/sign/batch").await.unwrap_err();
        assert_eq!(err.user_message(), "No active accounts");
    }

    #[tokio::test]
    async fn test_envelope_helpers() {
        let server = MockServer::start().await;
        server.ok("DELETE", "/accounts/3", Value::Null);

        let client = server.client();
        let envelope: ApiEnvelope<Vec<u64>> = client.delete("/accounts/3").await.unwrap();
        assert_eq!(envelope.message, "ok");
        assert!(envelope.clone().data_or_default().is_empty());
        assert!(matches!(
            envelope.into_data("accounts"),
            Err(ConsoleError::MissingData(_))
        ));
    }
}
