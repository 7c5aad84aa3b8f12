// Backup export and import endpoints.

use serde::de::IgnoredAny;

use crate::error::Result;

use super::client::ApiClient;
use super::types::BackupInfo;

impl ApiClient {
    /// Download a full backup as raw JSON bytes.
    pub async fn export_backup(&self, include_logs: bool) -> Result<Vec<u8>> {
        self.get_bytes("/backup/export", &[("include_logs", include_logs)])
            .await
    }

    /// Upload a backup file. With `overwrite`, existing records are replaced.
    pub async fn import_backup(
        &self,
        file_name: &str,
        contents: Vec<u8>,
        overwrite: bool,
    ) -> Result<String> {
        let envelope = self
            .post_multipart::<IgnoredAny, _>(
                "/backup/import",
                &[("overwrite", overwrite)],
                file_name,
                contents,
            )
            .await?;
        Ok(envelope.message)
    }

    pub async fn backup_info(&self) -> Result<BackupInfo> {
        Ok(self.get("/backup/info").await?.data_or_default())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::MockServer;
    use serde_json::json;

    #[tokio::test]
    async fn test_export_returns_raw_body() {
        let server = MockServer::start().await;
        server.on("GET", "/backup/export", 200, json!({"version": "1.0", "accounts": []}));

        let bytes = server.client().export_backup(true).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["version"], "1.0");
        assert_eq!(
            server.last_request("GET", "/backup/export").unwrap().query.as_deref(),
            Some("include_logs=true")
        );
    }

    #[tokio::test]
    async fn test_import_uploads_file_field() {
        let server = MockServer::start().await;
        server.on(
            "POST",
            "/backup/import",
            200,
            json!({"success": true, "message": "Imported 2 accounts", "data": null}),
        );

        let message = server
            .client()
            .import_backup("backup.json", br#"{"accounts":[]}"#.to_vec(), false)
            .await
            .unwrap();
        assert_eq!(message, "Imported 2 accounts");

        let request = server.last_request("POST", "/backup/import").unwrap();
        assert_eq!(request.query.as_deref(), Some("overwrite=false"));
        let body = request.body_text();
        assert!(body.contains("name=\"file\""));
        assert!(body.contains("filename=\"backup.json\""));
        assert!(body.contains(r#"{"accounts":[]}"#));
    }
}
