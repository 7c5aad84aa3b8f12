// Audit log endpoints.

use crate::error::Result;

use super::client::ApiClient;
use super::types::{AuditActionOption, AuditPage, AuditQuery};

impl ApiClient {
    pub async fn list_audit_logs(&self, query: &AuditQuery) -> Result<AuditPage> {
        Ok(self
            .get_with_params("/audit/logs", query)
            .await?
            .data_or_default())
    }

    pub async fn audit_actions(&self) -> Result<Vec<AuditActionOption>> {
        Ok(self.get("/audit/actions").await?.data_or_default())
    }
}
