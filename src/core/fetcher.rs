use crate::domain::model::{ControlPage, ControlRecord};
use crate::domain::ports::{ConfigProvider, ControlSource};
use crate::utils::error::{ReportError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::json;

/// Pages through the control-implementations endpoint for one organization.
pub struct ControlFetcher<C: ConfigProvider> {
    config: C,
    client: Client,
}

impl<C: ConfigProvider> ControlFetcher<C> {
    pub fn new(config: C) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .danger_accept_invalid_certs(!config.verify_tls())
            .build()?;
        Ok(Self { config, client })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.config.bearer_token() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
                ReportError::InvalidConfigValueError {
                    field: "token".to_string(),
                    value: "<redacted>".to_string(),
                    reason: format!("Token is not a valid header value: {}", e),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    async fn fetch_page(
        &self,
        org_id: &str,
        page: usize,
        headers: &HeaderMap,
    ) -> Result<ControlPage> {
        let filter = json!({
            "filters": [
                {
                    "field": "organizationId",
                    "operator": "EQUAL_TO",
                    "value": org_id
                }
            ]
        });
        let size = self.config.page_size();

        tracing::debug!(
            "Requesting page {} (size {}) from {}",
            page,
            size,
            self.config.base_url()
        );
        let response = self
            .client
            .post(self.config.base_url())
            .query(&[("page", page), ("size", size)])
            .headers(headers.clone())
            .json(&filter)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Page {} response status: {}", page, status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::UpstreamStatus {
                status: status.as_u16(),
                page,
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait::async_trait]
impl<C: ConfigProvider> ControlSource for ControlFetcher<C> {
    async fn fetch_controls(&self, org_id: &str) -> Result<Vec<ControlRecord>> {
        let headers = self.headers()?;
        let mut controls = Vec::new();
        let mut page = 0usize;

        loop {
            let response = self.fetch_page(org_id, page, &headers).await?;
            let total_pages = response.total_pages();
            let records = response.into_records();
            tracing::debug!(
                "Page {} of {} returned {} controls",
                page + 1,
                total_pages,
                records.len()
            );
            controls.extend(records);

            page += 1;
            if page as u64 >= total_pages {
                break;
            }
        }

        tracing::info!(
            "Fetched {} controls for organization {} across {} pages",
            controls.len(),
            org_id,
            page
        );
        Ok(controls)
    }
}
