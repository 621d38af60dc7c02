use crate::config::ReportStyle;
use crate::domain::model::ControlRecord;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Destination for finished documents; `write_file` returns where it landed.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Read-only settings consumed by the fetcher and renderer.
pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn bearer_token(&self) -> Option<&str>;
    fn page_size(&self) -> usize;
    fn request_timeout(&self) -> Duration;
    fn verify_tls(&self) -> bool;
    fn report_style(&self) -> ReportStyle;
}

/// Anything able to produce every control record for an organization.
#[async_trait]
pub trait ControlSource: Send + Sync {
    async fn fetch_controls(&self, org_id: &str) -> Result<Vec<ControlRecord>>;
}
