use crate::config::ReportStyle;
use crate::core::render::render_report;
use crate::core::summary::build_report;
use crate::domain::model::RenderedReport;
use crate::domain::ports::ControlSource;
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::validate_non_empty_string;

/// Download name for an organization's report; anything outside `[A-Za-z0-9._-]` becomes `_`.
pub fn report_filename(org_id: &str) -> String {
    let safe: String = org_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("controls_{}.pdf", safe)
}

/// Fetch, aggregate and render: one report per call, no state kept between calls.
pub struct ReportEngine<S: ControlSource> {
    source: S,
    style: ReportStyle,
}

impl<S: ControlSource> ReportEngine<S> {
    pub fn new(source: S, style: ReportStyle) -> Self {
        Self { source, style }
    }

    pub async fn generate(&self, org_id: &str) -> Result<RenderedReport> {
        validate_non_empty_string("org_id", org_id).map_err(|_| ReportError::ValidationError {
            message: "Missing org_id".to_string(),
        })?;

        tracing::info!("Generating {:?} report for organization {}", self.style, org_id);

        let records = self.source.fetch_controls(org_id).await?;
        let report = build_report(records);
        let bytes = render_report(&report, self.style)?;

        tracing::info!(
            "Report for {} ready: {} controls, {} bytes",
            org_id,
            report.controls.len(),
            bytes.len()
        );

        Ok(RenderedReport {
            org_id: org_id.to_string(),
            filename: report_filename(org_id),
            bytes,
            control_count: report.controls.len(),
        })
    }
}
